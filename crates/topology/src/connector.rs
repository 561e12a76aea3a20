//! Per-member connector services.
//!
//! The builder owns each connector's service name so names stay stable as
//! members are added; a [`ConnectorFactory`] only decides how the container runs.

use fabnet_layout::{
    ORDERER, PEER0_ORG1, StackLayout, connector_events_volume, connector_receipts_volume,
};

use crate::service::{PortBinding, Service, VolumeBinding};
use crate::stack::Member;

/// What a factory is told about the connector it configures.
#[derive(Clone, Copy, Debug)]
pub struct ConnectorContext<'a> {
    /// Layout of the stack being generated.
    pub layout: &'a StackLayout,

    /// Member the connector serves.
    pub member: &'a Member,

    /// Position of the member in join order.
    pub index: usize,

    /// Service name already assigned to the connector.
    pub service_name: &'a str,
}

/// Configuration a factory supplies for one connector.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ConnectorConfig {
    /// Container configuration, `None` if left to a later stage.
    pub service: Option<Service>,

    /// Named volumes the configuration mounts.
    pub volume_names: Vec<String>,
}

/// Supplies the container configuration of each member's connector.
pub trait ConnectorFactory {
    /// Configures the connector described by `context`.
    fn connector(&self, context: &ConnectorContext<'_>) -> ConnectorConfig;
}

/// Leaves connectors unconfigured; each is emitted with its name only.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnconfiguredConnector;

impl ConnectorFactory for UnconfiguredConnector {
    fn connector(&self, _context: &ConnectorContext<'_>) -> ConnectorConfig {
        ConnectorConfig::default()
    }
}

/// Default fabconnect image.
pub const DEFAULT_FABCONNECT_IMAGE: &str = "ghcr.io/hyperledger/firefly-fabconnect:latest";

/// Host port published by the first member's connector.
pub const DEFAULT_FABCONNECT_BASE_PORT: u16 = 5102;

const FABCONNECT_PORT: u16 = 3000;

/// Runs a fabconnect gateway per member.
///
/// Member `i` publishes on `base_port + i`, and keeps its receipts and event
/// streams in its own named volumes. Members whose port would fall past
/// `u16::MAX` publish nothing rather than share a host port.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FabconnectConnector {
    /// Image reference.
    pub image: String,

    /// Host port of the first member.
    pub base_port: u16,
}

impl Default for FabconnectConnector {
    fn default() -> Self {
        Self {
            image: DEFAULT_FABCONNECT_IMAGE.to_string(),
            base_port: DEFAULT_FABCONNECT_BASE_PORT,
        }
    }
}

impl ConnectorFactory for FabconnectConnector {
    fn connector(&self, context: &ConnectorContext<'_>) -> ConnectorConfig {
        let member_id = context.member.id.as_str();
        let receipts = connector_receipts_volume(member_id);
        let events = connector_events_volume(member_id);

        let ports = u16::try_from(context.index)
            .ok()
            .and_then(|offset| self.base_port.checked_add(offset))
            .map(|host| PortBinding {
                host,
                container: FABCONNECT_PORT,
            })
            .into_iter()
            .collect();

        let service = Service {
            image: self.image.clone(),
            ports,
            volumes: vec![
                VolumeBinding::read_only(
                    context.layout.cryptogen_dir(),
                    "/etc/firefly/organizations",
                ),
                VolumeBinding::named(receipts.clone(), "/fabconnect/receipts"),
                VolumeBinding::named(events.clone(), "/fabconnect/events"),
            ],
            depends_on: vec![PEER0_ORG1.fqdn(), ORDERER.fqdn()],
            ..Service::default()
        };

        ConnectorConfig {
            service: Some(service),
            volume_names: vec![receipts, events],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn context<'a>(
        layout: &'a StackLayout,
        member: &'a Member,
        index: usize,
    ) -> ConnectorContext<'a> {
        ConnectorContext {
            layout,
            member,
            index,
            service_name: "fabconnect_a",
        }
    }

    #[test]
    fn test_unconfigured_connector_is_empty() {
        let layout = StackLayout::new("/stacks", "dev");
        let member = Member::new("a");

        let config = UnconfiguredConnector.connector(&context(&layout, &member, 0));

        assert_eq!(config, ConnectorConfig::default());
    }

    #[test]
    fn test_fabconnect_connector() {
        let layout = StackLayout::new("/stacks", "dev");
        let member = Member::new("a");

        let config = FabconnectConnector::default().connector(&context(&layout, &member, 2));
        let service = config.service.expect("fabconnect is configured");

        assert_eq!(service.image, DEFAULT_FABCONNECT_IMAGE);
        assert_eq!(
            service.ports,
            vec![PortBinding {
                host: 5104,
                container: 3000
            }]
        );
        assert_eq!(
            service.volumes[0].to_string(),
            "/stacks/dev/blockchain/cryptogen:/etc/firefly/organizations:ro"
        );
        assert_eq!(
            config.volume_names,
            vec!["fabconnect_receipts_a", "fabconnect_events_a"]
        );
        assert_eq!(
            service.named_volumes().collect::<Vec<_>>(),
            vec!["fabconnect_receipts_a", "fabconnect_events_a"]
        );
        assert_eq!(
            service.depends_on,
            vec!["peer0.org1.example.com", "orderer.example.com"]
        );
    }

    #[test]
    fn test_fabconnect_ports_never_collide() {
        let layout = StackLayout::new("/stacks", "dev");
        let members = [Member::new("a"), Member::new("b"), Member::new("c")];
        let factory = FabconnectConnector {
            base_port: u16::MAX - 1,
            ..FabconnectConnector::default()
        };

        let ports: Vec<Vec<PortBinding>> = members
            .iter()
            .enumerate()
            .map(|(index, member)| {
                let config = factory.connector(&context(&layout, member, index));
                config.service.expect("fabconnect is configured").ports
            })
            .collect();

        assert_eq!(
            ports,
            vec![
                vec![PortBinding {
                    host: u16::MAX - 1,
                    container: 3000
                }],
                vec![PortBinding {
                    host: u16::MAX,
                    container: 3000
                }],
                vec![],
            ]
        );

        let hosts: Vec<u16> = ports.iter().flatten().map(|port| port.host).collect();
        let unique: std::collections::HashSet<_> = hosts.iter().collect();
        assert_eq!(unique.len(), hosts.len());
    }
}
