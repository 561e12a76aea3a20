//! Ordered synthesis of the service definitions of a stack.

use std::collections::BTreeMap;

use fabnet_layout::{ORDERER, PEER0_ORG1, StackLayout, connector_service_name};
use tracing::debug;

use crate::connector::{ConnectorContext, ConnectorFactory, UnconfiguredConnector};
use crate::options::TopologyOptions;
use crate::service::{PortBinding, Service, ServiceDefinition, VolumeBinding};
use crate::stack::{Member, Stack};

/// Service name of the membership authority.
pub const AUTHORITY_SERVICE: &str = "ca_org1";

/// Number of services emitted regardless of membership.
pub const INFRASTRUCTURE_SERVICES: usize = 3;

const CA_PORT: u16 = 7054;
const CA_OPERATIONS_PORT: u16 = 17054;
const ORDERER_PORT: u16 = 7050;
const ORDERER_ADMIN_PORT: u16 = 7053;
const ORDERER_OPERATIONS_PORT: u16 = 17050;
const PEER_PORT: u16 = 7051;
const PEER_CHAINCODE_PORT: u16 = 7052;
const PEER_OPERATIONS_PORT: u16 = 17051;

const ORDERER_HOME: &str = "/var/hyperledger/orderer";
const PEER_HOME: &str = "/etc/hyperledger/fabric";

fn environment<const N: usize>(pairs: [(&str, String); N]) -> BTreeMap<String, String> {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

fn authority_service(options: &TopologyOptions) -> ServiceDefinition {
    ServiceDefinition {
        service_name: AUTHORITY_SERVICE.to_string(),
        service: Some(Service {
            image: options.images.ca.clone(),
            environment: environment([
                ("FABRIC_CA_HOME", "/etc/hyperledger/fabric-ca-server".to_string()),
                ("FABRIC_CA_SERVER_CA_NAME", "ca-org1".to_string()),
                ("FABRIC_CA_SERVER_TLS_ENABLED", "true".to_string()),
                ("FABRIC_CA_SERVER_PORT", CA_PORT.to_string()),
                (
                    "FABRIC_CA_SERVER_OPERATIONS_LISTENADDRESS",
                    format!("0.0.0.0:{CA_OPERATIONS_PORT}"),
                ),
            ]),
            // TODO: offset published ports per stack so stacks can share a host
            ports: vec![
                PortBinding::same(CA_PORT),
                PortBinding::same(CA_OPERATIONS_PORT),
            ],
            command: Some("sh -c 'fabric-ca-server start -b admin:adminpw -d'".to_string()),
            ..Service::default()
        }),
        volume_names: Vec::new(),
    }
}

fn orderer_service(layout: &StackLayout, options: &TopologyOptions) -> ServiceDefinition {
    let name = ORDERER.fqdn();
    let server_cert = format!("{ORDERER_HOME}/tls/server.crt");
    let server_key = format!("{ORDERER_HOME}/tls/server.key");
    let root_cas = format!("[{ORDERER_HOME}/tls/ca.crt]");

    ServiceDefinition {
        service_name: name.clone(),
        service: Some(Service {
            image: options.images.orderer.clone(),
            environment: environment([
                ("FABRIC_LOGGING_SPEC", "INFO".to_string()),
                ("ORDERER_GENERAL_LISTENADDRESS", "0.0.0.0".to_string()),
                ("ORDERER_GENERAL_LISTENPORT", ORDERER_PORT.to_string()),
                ("ORDERER_GENERAL_LOCALMSPID", ORDERER.msp_id.to_string()),
                ("ORDERER_GENERAL_LOCALMSPDIR", format!("{ORDERER_HOME}/msp")),
                ("ORDERER_GENERAL_TLS_ENABLED", "true".to_string()),
                ("ORDERER_GENERAL_TLS_PRIVATEKEY", server_key.clone()),
                ("ORDERER_GENERAL_TLS_CERTIFICATE", server_cert.clone()),
                ("ORDERER_GENERAL_TLS_ROOTCAS", root_cas.clone()),
                ("ORDERER_KAFKA_TOPIC_REPLICATIONFACTOR", "1".to_string()),
                ("ORDERER_KAFKA_VERBOSE", "true".to_string()),
                ("ORDERER_GENERAL_CLUSTER_CLIENTCERTIFICATE", server_cert.clone()),
                ("ORDERER_GENERAL_CLUSTER_CLIENTPRIVATEKEY", server_key.clone()),
                ("ORDERER_GENERAL_CLUSTER_ROOTCAS", root_cas.clone()),
                ("ORDERER_GENERAL_BOOTSTRAPMETHOD", "none".to_string()),
                ("ORDERER_CHANNELPARTICIPATION_ENABLED", "true".to_string()),
                ("ORDERER_ADMIN_TLS_ENABLED", "true".to_string()),
                ("ORDERER_ADMIN_TLS_CERTIFICATE", server_cert),
                ("ORDERER_ADMIN_TLS_PRIVATEKEY", server_key),
                ("ORDERER_ADMIN_TLS_ROOTCAS", root_cas.clone()),
                ("ORDERER_ADMIN_TLS_CLIENTROOTCAS", root_cas),
                (
                    "ORDERER_ADMIN_LISTENADDRESS",
                    format!("0.0.0.0:{ORDERER_ADMIN_PORT}"),
                ),
                (
                    "ORDERER_OPERATIONS_LISTENADDRESS",
                    format!("0.0.0.0:{ORDERER_OPERATIONS_PORT}"),
                ),
            ]),
            // Known defect kept as deployed: these are the authority's ports, not
            // the orderer's listen/admin/operations ports.
            ports: vec![
                PortBinding::same(CA_PORT),
                PortBinding::same(CA_OPERATIONS_PORT),
            ],
            volumes: vec![
                VolumeBinding::read_only(
                    layout.genesis_block_path(),
                    format!("{ORDERER_HOME}/orderer.genesis.block"),
                ),
                VolumeBinding::read_only(
                    layout.node_msp_dir(&ORDERER),
                    format!("{ORDERER_HOME}/msp"),
                ),
                VolumeBinding::read_only(
                    layout.node_tls_dir(&ORDERER),
                    format!("{ORDERER_HOME}/tls"),
                ),
                VolumeBinding::named(name.clone(), "/var/hyperledger/production/orderer"),
            ],
            working_dir: Some("/opt/gopath/src/github.com/hyperledger/fabric".to_string()),
            command: Some("orderer".to_string()),
            depends_on: Vec::new(),
        }),
        volume_names: vec![name],
    }
}

fn peer_service(layout: &StackLayout, options: &TopologyOptions) -> ServiceDefinition {
    let name = PEER0_ORG1.fqdn();
    let address = format!("{name}:{PEER_PORT}");

    ServiceDefinition {
        service_name: name.clone(),
        service: Some(Service {
            image: options.images.peer.clone(),
            environment: environment([
                ("CORE_VM_ENDPOINT", "unix:///host/var/run/docker.sock".to_string()),
                ("CORE_VM_DOCKER_HOSTCONFIG_NETWORKMODE", "fabric_test".to_string()),
                ("FABRIC_LOGGING_SPEC", "INFO".to_string()),
                ("CORE_PEER_TLS_ENABLED", "true".to_string()),
                ("CORE_PEER_PROFILE_ENABLED", "false".to_string()),
                ("CORE_PEER_TLS_CERT_FILE", format!("{PEER_HOME}/tls/server.crt")),
                ("CORE_PEER_TLS_KEY_FILE", format!("{PEER_HOME}/tls/server.key")),
                ("CORE_PEER_TLS_ROOTCERT_FILE", format!("{PEER_HOME}/tls/ca.crt")),
                ("CORE_PEER_ID", name.clone()),
                ("CORE_PEER_ADDRESS", address.clone()),
                ("CORE_PEER_LISTENADDRESS", format!("0.0.0.0:{PEER_PORT}")),
                (
                    "CORE_PEER_CHAINCODEADDRESS",
                    format!("{name}:{PEER_CHAINCODE_PORT}"),
                ),
                (
                    "CORE_PEER_CHAINCODELISTENADDRESS",
                    format!("0.0.0.0:{PEER_CHAINCODE_PORT}"),
                ),
                // the only peer bootstraps gossip from itself
                ("CORE_PEER_GOSSIP_BOOTSTRAP", address.clone()),
                ("CORE_PEER_GOSSIP_EXTERNALENDPOINT", address),
                ("CORE_PEER_LOCALMSPID", PEER0_ORG1.msp_id.to_string()),
                (
                    "CORE_OPERATIONS_LISTENADDRESS",
                    format!("0.0.0.0:{PEER_OPERATIONS_PORT}"),
                ),
            ]),
            volumes: vec![
                VolumeBinding::read_only(
                    layout.node_msp_dir(&PEER0_ORG1),
                    format!("{PEER_HOME}/msp"),
                ),
                VolumeBinding::read_only(
                    layout.node_tls_dir(&PEER0_ORG1),
                    format!("{PEER_HOME}/tls"),
                ),
                VolumeBinding::named(name.clone(), "/var/hyperledger/production"),
            ],
            ..Service::default()
        }),
        volume_names: vec![name],
    }
}

/// Accumulates service definitions in deployment order.
///
/// Infrastructure services come first, then one connector per member in
/// join order.
#[derive(Debug)]
pub struct TopologyBuilder<'a> {
    layout: StackLayout,
    options: &'a TopologyOptions,
    definitions: Vec<ServiceDefinition>,
}

impl<'a> TopologyBuilder<'a> {
    /// Starts an empty topology for the stack named `stack_name`.
    #[must_use]
    pub fn new(stack_name: &str, options: &'a TopologyOptions) -> Self {
        Self {
            layout: StackLayout::new(&options.stacks_root, stack_name),
            options,
            definitions: Vec::new(),
        }
    }

    /// Layout the builder binds paths from.
    #[must_use]
    pub const fn layout(&self) -> &StackLayout {
        &self.layout
    }

    /// Appends the authority, ordering node and peer node.
    #[must_use]
    pub fn push_infrastructure(mut self) -> Self {
        self.definitions.push(authority_service(self.options));
        self.definitions.push(orderer_service(&self.layout, self.options));
        self.definitions.push(peer_service(&self.layout, self.options));
        self
    }

    /// Appends one connector per member, configured by `factory`.
    #[must_use]
    pub fn push_members<F>(mut self, members: &[Member], factory: &F) -> Self
    where
        F: ConnectorFactory + ?Sized,
    {
        for (index, member) in members.iter().enumerate() {
            debug_assert!(!member.id.is_empty(), "member identifiers must be non-empty");

            let service_name = connector_service_name(&member.id);
            let config = factory.connector(&ConnectorContext {
                layout: &self.layout,
                member,
                index,
                service_name: &service_name,
            });

            self.definitions.push(ServiceDefinition {
                service_name,
                service: config.service,
                volume_names: config.volume_names,
            });
        }
        self
    }

    /// Finishes the topology.
    #[must_use]
    pub fn build(self) -> Vec<ServiceDefinition> {
        self.definitions
    }
}

/// Builds the topology of `stack` with name-only connectors.
#[must_use]
pub fn build_topology(stack: &Stack, options: &TopologyOptions) -> Vec<ServiceDefinition> {
    build_topology_with(stack, options, &UnconfiguredConnector)
}

/// Builds the topology of `stack`, configuring connectors with `factory`.
///
/// The result always holds [`INFRASTRUCTURE_SERVICES`] definitions followed by
/// one per member.
#[must_use]
pub fn build_topology_with<F>(
    stack: &Stack,
    options: &TopologyOptions,
    factory: &F,
) -> Vec<ServiceDefinition>
where
    F: ConnectorFactory + ?Sized,
{
    let definitions = TopologyBuilder::new(&stack.name, options)
        .push_infrastructure()
        .push_members(&stack.members, factory)
        .build();

    debug!(
        "built {} service definitions for stack {}",
        definitions.len(),
        stack.name
    );

    definitions
}
