//! Images and paths a topology is generated with.

use std::path::PathBuf;

use fabnet_layout::DEFAULT_STACKS_ROOT;
use serde::{Deserialize, Serialize};

/// Images the infrastructure services run.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Images {
    /// Membership authority image.
    pub ca: String,

    /// Ordering node image.
    pub orderer: String,

    /// Peer node image.
    pub peer: String,
}

impl Default for Images {
    fn default() -> Self {
        Self {
            ca: "hyperledger/fabric-ca:latest".to_string(),
            orderer: "hyperledger/fabric-orderer:latest".to_string(),
            peer: "hyperledger/fabric-peer:latest".to_string(),
        }
    }
}

/// Options for generating a topology.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TopologyOptions {
    /// Directory holding one working directory per stack.
    pub stacks_root: PathBuf,

    /// Infrastructure images.
    #[serde(default)]
    pub images: Images,
}

impl TopologyOptions {
    /// Options with default images rooted at `stacks_root`.
    pub fn new(stacks_root: impl Into<PathBuf>) -> Self {
        Self {
            stacks_root: stacks_root.into(),
            images: Images::default(),
        }
    }
}

impl Default for TopologyOptions {
    fn default() -> Self {
        Self::new(DEFAULT_STACKS_ROOT)
    }
}
