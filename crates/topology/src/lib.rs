//! Service topology of a Fabric stack.
//!
//! Turns a [`Stack`] into the ordered list of [`ServiceDefinition`]s needed to
//! run it: the membership authority, the ordering node, the peer node, and one
//! connector per member. Generation is pure and deterministic; every host path
//! a service binds comes from [`fabnet_layout`], the same contract the
//! provisioners write to.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod builder;
mod connector;
mod error;
mod options;
mod service;
mod stack;

pub use builder::{
    AUTHORITY_SERVICE, INFRASTRUCTURE_SERVICES, TopologyBuilder, build_topology,
    build_topology_with,
};
pub use connector::{
    ConnectorConfig, ConnectorContext, ConnectorFactory, DEFAULT_FABCONNECT_BASE_PORT,
    DEFAULT_FABCONNECT_IMAGE, FabconnectConnector, UnconfiguredConnector,
};
pub use error::{Error, Result};
pub use options::{Images, TopologyOptions};
pub use service::{PortBinding, Service, ServiceDefinition, VolumeBinding};
pub use stack::{Member, Stack};
