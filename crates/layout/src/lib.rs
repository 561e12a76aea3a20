//! On-disk layout shared by the provisioners and the topology builder.
//!
//! The identity-generation and genesis tools write their output under
//! `<stacks_root>/<stack>/blockchain/`, and the generated services bind exactly
//! those paths. Every path on either side of that contract is derived here:
//!
//! ```text
//! <stacks_root>/<stack>/blockchain/
//!     genesis_block.pb
//!     cryptogen.yaml
//!     cryptogen/ordererOrganizations/example.com/orderers/orderer.example.com/{msp,tls}
//!     cryptogen/peerOrganizations/org1.example.com/peers/peer0.org1.example.com/{msp,tls}
//! ```
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;
mod identity;
mod template;

pub use error::{Error, Result};
pub use identity::{NodeIdentity, ORDERER, OrganizationKind, PEER0_ORG1};
pub use template::{CryptogenTemplate, NodeSpec, OrganizationSpec, UserCount};

use std::path::{Path, PathBuf};

/// Default root under which every stack gets its own directory.
pub const DEFAULT_STACKS_ROOT: &str = "/tmp/fabnet/stacks";

/// Directory under the stack directory holding all ledger material.
pub const BLOCKCHAIN_DIR: &str = "blockchain";

/// Directory under [`BLOCKCHAIN_DIR`] the identity-generation tool writes to.
pub const CRYPTOGEN_DIR: &str = "cryptogen";

/// Template file name under [`BLOCKCHAIN_DIR`].
pub const CRYPTOGEN_TEMPLATE_FILE: &str = "cryptogen.yaml";

/// Genesis artifact file name under [`BLOCKCHAIN_DIR`].
pub const GENESIS_BLOCK_FILE: &str = "genesis_block.pb";

const MSP_DIR: &str = "msp";
const TLS_DIR: &str = "tls";

/// Paths of a single stack.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StackLayout {
    stack_dir: PathBuf,
}

impl StackLayout {
    /// Creates the layout for `stack_name` under `stacks_root`.
    #[must_use]
    pub fn new(stacks_root: impl AsRef<Path>, stack_name: &str) -> Self {
        Self {
            stack_dir: stacks_root.as_ref().join(stack_name),
        }
    }

    /// Working directory of the stack.
    #[must_use]
    pub fn stack_dir(&self) -> &Path {
        &self.stack_dir
    }

    /// Directory holding all provisioned ledger material.
    #[must_use]
    pub fn blockchain_dir(&self) -> PathBuf {
        self.stack_dir.join(BLOCKCHAIN_DIR)
    }

    /// Genesis artifact written by the genesis provisioner.
    #[must_use]
    pub fn genesis_block_path(&self) -> PathBuf {
        self.blockchain_dir().join(GENESIS_BLOCK_FILE)
    }

    /// Output directory of the identity-generation tool.
    #[must_use]
    pub fn cryptogen_dir(&self) -> PathBuf {
        self.blockchain_dir().join(CRYPTOGEN_DIR)
    }

    /// Template fed to the identity-generation tool.
    #[must_use]
    pub fn cryptogen_template_path(&self) -> PathBuf {
        self.blockchain_dir().join(CRYPTOGEN_TEMPLATE_FILE)
    }

    /// Directory holding the material of a single node.
    #[must_use]
    pub fn node_dir(&self, identity: &NodeIdentity) -> PathBuf {
        node_dir(&self.stack_dir, identity)
    }

    /// MSP directory of a node.
    #[must_use]
    pub fn node_msp_dir(&self, identity: &NodeIdentity) -> PathBuf {
        organization_msp_path(&self.stack_dir, identity)
    }

    /// TLS directory of a node.
    #[must_use]
    pub fn node_tls_dir(&self, identity: &NodeIdentity) -> PathBuf {
        organization_tls_path(&self.stack_dir, identity)
    }
}

fn node_dir(stack_dir: &Path, identity: &NodeIdentity) -> PathBuf {
    stack_dir
        .join(BLOCKCHAIN_DIR)
        .join(CRYPTOGEN_DIR)
        .join(identity.kind.organizations_dir())
        .join(identity.domain)
        .join(identity.kind.nodes_dir())
        .join(identity.fqdn())
}

/// MSP directory of `identity` under `stack_dir`.
#[must_use]
pub fn organization_msp_path(stack_dir: &Path, identity: &NodeIdentity) -> PathBuf {
    node_dir(stack_dir, identity).join(MSP_DIR)
}

/// TLS directory of `identity` under `stack_dir`.
#[must_use]
pub fn organization_tls_path(stack_dir: &Path, identity: &NodeIdentity) -> PathBuf {
    node_dir(stack_dir, identity).join(TLS_DIR)
}

/// Service name of the connector serving `member_id`.
#[must_use]
pub fn connector_service_name(member_id: &str) -> String {
    format!("fabconnect_{member_id}")
}

/// Named volume holding the connector's transaction receipts.
#[must_use]
pub fn connector_receipts_volume(member_id: &str) -> String {
    format!("fabconnect_receipts_{member_id}")
}

/// Named volume holding the connector's event stream state.
#[must_use]
pub fn connector_events_volume(member_id: &str) -> String {
    format!("fabconnect_events_{member_id}")
}
