//! Fixed node identities produced by the identity-generation tool.

/// Which kind of organization a node belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum OrganizationKind {
    /// Ordering service organization.
    Orderer,

    /// Peer organization.
    Peer,
}

impl OrganizationKind {
    /// Directory holding all organizations of this kind.
    #[must_use]
    pub const fn organizations_dir(self) -> &'static str {
        match self {
            Self::Orderer => "ordererOrganizations",
            Self::Peer => "peerOrganizations",
        }
    }

    /// Directory holding the nodes of a single organization.
    #[must_use]
    pub const fn nodes_dir(self) -> &'static str {
        match self {
            Self::Orderer => "orderers",
            Self::Peer => "peers",
        }
    }
}

/// A node whose MSP and TLS material is generated by cryptogen.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct NodeIdentity {
    /// Organization kind.
    pub kind: OrganizationKind,

    /// Organization name as written in the cryptogen template.
    pub organization: &'static str,

    /// Organization domain.
    pub domain: &'static str,

    /// Node hostname, without the domain.
    pub hostname: &'static str,

    /// MSP identifier the node presents to the network.
    pub msp_id: &'static str,
}

impl NodeIdentity {
    /// Fully qualified node name, `hostname.domain`.
    ///
    /// This is also the container hostname and the service name used for the node.
    #[must_use]
    pub fn fqdn(&self) -> String {
        format!("{}.{}", self.hostname, self.domain)
    }
}

/// The single ordering node.
pub const ORDERER: NodeIdentity = NodeIdentity {
    kind: OrganizationKind::Orderer,
    organization: "Orderer",
    domain: "example.com",
    hostname: "orderer",
    msp_id: "OrdererMSP",
};

/// The single peer of the default organization.
pub const PEER0_ORG1: NodeIdentity = NodeIdentity {
    kind: OrganizationKind::Peer,
    organization: "Org1",
    domain: "org1.example.com",
    hostname: "peer0",
    msp_id: "Org1MSP",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fqdn() {
        assert_eq!(ORDERER.fqdn(), "orderer.example.com");
        assert_eq!(PEER0_ORG1.fqdn(), "peer0.org1.example.com");
    }

    #[test]
    fn test_organization_dirs() {
        assert_eq!(ORDERER.kind.organizations_dir(), "ordererOrganizations");
        assert_eq!(ORDERER.kind.nodes_dir(), "orderers");
        assert_eq!(PEER0_ORG1.kind.organizations_dir(), "peerOrganizations");
        assert_eq!(PEER0_ORG1.kind.nodes_dir(), "peers");
    }
}
