//! Template consumed by the cryptogen identity-generation tool.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::identity::{NodeIdentity, ORDERER, OrganizationKind, PEER0_ORG1};

/// Root of a cryptogen template.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CryptogenTemplate {
    /// Ordering organizations.
    #[serde(default)]
    pub orderer_orgs: Vec<OrganizationSpec>,

    /// Peer organizations.
    #[serde(default)]
    pub peer_orgs: Vec<OrganizationSpec>,
}

/// One organization to generate identities for.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrganizationSpec {
    /// Organization name.
    pub name: String,

    /// Organization domain; node directories are named `hostname.domain`.
    pub domain: String,

    /// Whether node organizational units are enabled.
    #[serde(rename = "EnableNodeOUs")]
    pub enable_node_ous: bool,

    /// Explicitly named nodes.
    #[serde(default)]
    pub specs: Vec<NodeSpec>,

    /// Additional user identities besides the admin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<UserCount>,
}

/// A single explicitly named node.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NodeSpec {
    /// Node hostname, without the domain.
    pub hostname: String,
}

/// Number of user identities to generate.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserCount {
    /// Count.
    pub count: u32,
}

impl CryptogenTemplate {
    /// Template for the fixed network: one ordering node and one peer.
    ///
    /// Built from the same identities the topology binds, so the generated tree
    /// always contains the directories the services mount.
    #[must_use]
    pub fn for_network() -> Self {
        let mut template = Self::default();
        template.add_node(&ORDERER);
        template.add_node(&PEER0_ORG1);
        template
    }

    /// Adds a node, creating its organization entry if needed.
    pub fn add_node(&mut self, identity: &NodeIdentity) {
        let orgs = match identity.kind {
            OrganizationKind::Orderer => &mut self.orderer_orgs,
            OrganizationKind::Peer => &mut self.peer_orgs,
        };

        let spec = NodeSpec {
            hostname: identity.hostname.to_string(),
        };

        if let Some(org) = orgs.iter_mut().find(|org| org.domain == identity.domain) {
            if !org.specs.contains(&spec) {
                org.specs.push(spec);
            }
            return;
        }

        orgs.push(OrganizationSpec {
            name: identity.organization.to_string(),
            domain: identity.domain.to_string(),
            enable_node_ous: true,
            specs: vec![spec],
            users: match identity.kind {
                OrganizationKind::Orderer => None,
                OrganizationKind::Peer => Some(UserCount { count: 1 }),
            },
        });
    }

    /// Serializes the template to YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(Error::Yaml)
    }

    /// Parses a template from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a valid template.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::Yaml)
    }
}
