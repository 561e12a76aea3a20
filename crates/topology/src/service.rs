//! Service definitions handed to the compose renderer.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A published port, `host:container`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(into = "String", try_from = "String")]
pub struct PortBinding {
    /// Port published on the host.
    pub host: u16,

    /// Port inside the container.
    pub container: u16,
}

impl PortBinding {
    /// Publishes `port` on the same host port.
    #[must_use]
    pub const fn same(port: u16) -> Self {
        Self {
            host: port,
            container: port,
        }
    }
}

impl fmt::Display for PortBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.container)
    }
}

impl FromStr for PortBinding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidPortBinding(s.to_string());

        let (host, container) = s.split_once(':').ok_or_else(invalid)?;

        Ok(Self {
            host: host.parse().map_err(|_| invalid())?,
            container: container.parse().map_err(|_| invalid())?,
        })
    }
}

impl From<PortBinding> for String {
    fn from(binding: PortBinding) -> Self {
        binding.to_string()
    }
}

impl TryFrom<String> for PortBinding {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// A volume mounted into a service.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(into = "String", try_from = "String")]
pub enum VolumeBinding {
    /// Host path bind, used for provisioned material.
    Bind {
        /// Path on the host.
        host_path: PathBuf,

        /// Path inside the container.
        container_path: String,

        /// Whether the container may only read the mount.
        read_only: bool,
    },

    /// Named persistent volume, used for runtime state.
    Named {
        /// Volume name; must be listed in the owning definition's volume names.
        name: String,

        /// Path inside the container.
        container_path: String,
    },
}

impl VolumeBinding {
    /// Read-only bind of `host_path` at `container_path`.
    pub fn read_only(host_path: impl Into<PathBuf>, container_path: impl Into<String>) -> Self {
        Self::Bind {
            host_path: host_path.into(),
            container_path: container_path.into(),
            read_only: true,
        }
    }

    /// Named volume `name` at `container_path`.
    pub fn named(name: impl Into<String>, container_path: impl Into<String>) -> Self {
        Self::Named {
            name: name.into(),
            container_path: container_path.into(),
        }
    }

    /// Path inside the container.
    #[must_use]
    pub fn container_path(&self) -> &str {
        match self {
            Self::Bind { container_path, .. } | Self::Named { container_path, .. } => {
                container_path
            }
        }
    }
}

// named volumes cannot contain a separator, so any path-like source is a bind
fn is_host_path(source: &str) -> bool {
    source.contains('/') || source.starts_with('.') || source.starts_with('~')
}

impl fmt::Display for VolumeBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bind {
                host_path,
                container_path,
                read_only,
            } => {
                write!(f, "{}:{container_path}", host_path.display())?;
                if *read_only {
                    write!(f, ":ro")?;
                }
                Ok(())
            }
            Self::Named {
                name,
                container_path,
            } => write!(f, "{name}:{container_path}"),
        }
    }
}

impl FromStr for VolumeBinding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidVolumeBinding(s.to_string());

        let mut parts = s.split(':');
        let source = parts.next().filter(|p| !p.is_empty()).ok_or_else(invalid)?;
        let target = parts
            .next()
            .filter(|p| p.starts_with('/'))
            .ok_or_else(invalid)?;
        let read_only = match parts.next() {
            None | Some("rw") => false,
            Some("ro") => true,
            Some(_) => return Err(invalid()),
        };
        if parts.next().is_some() {
            return Err(invalid());
        }

        if is_host_path(source) {
            Ok(Self::Bind {
                host_path: PathBuf::from(source),
                container_path: target.to_string(),
                read_only,
            })
        } else if read_only {
            // named volumes are always mounted read-write
            Err(invalid())
        } else {
            Ok(Self::named(source, target))
        }
    }
}

impl From<VolumeBinding> for String {
    fn from(binding: VolumeBinding) -> Self {
        binding.to_string()
    }
}

impl TryFrom<String> for VolumeBinding {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// How a single container is run.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Service {
    /// Image reference.
    pub image: String,

    /// Environment variables, ordered by key.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,

    /// Published ports.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<PortBinding>,

    /// Mounted volumes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<VolumeBinding>,

    /// Working directory inside the container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,

    /// Startup command.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Services that must be started first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

impl Service {
    /// Named volumes this service mounts, in mount order.
    pub fn named_volumes(&self) -> impl Iterator<Item = &str> {
        self.volumes.iter().filter_map(|volume| match volume {
            VolumeBinding::Named { name, .. } => Some(name.as_str()),
            VolumeBinding::Bind { .. } => None,
        })
    }

    /// Host paths this service binds, in mount order.
    pub fn host_paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.volumes.iter().filter_map(|volume| match volume {
            VolumeBinding::Bind { host_path, .. } => Some(host_path),
            VolumeBinding::Named { .. } => None,
        })
    }
}

/// One deployable unit of the topology.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ServiceDefinition {
    /// Service name, unique within the topology.
    pub service_name: String,

    /// Container configuration; `None` until a connector factory supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<Service>,

    /// Named volumes the service requires.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volume_names: Vec<String>,
}

impl ServiceDefinition {
    /// Whether every named volume the service mounts is declared.
    #[must_use]
    pub fn declares_named_volumes(&self) -> bool {
        self.service.as_ref().is_none_or(|service| {
            service
                .named_volumes()
                .all(|name| self.volume_names.iter().any(|declared| declared == name))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_port_binding_display_and_parse() {
        let binding = PortBinding {
            host: 5102,
            container: 3000,
        };

        assert_eq!(binding.to_string(), "5102:3000");
        assert_eq!("5102:3000".parse::<PortBinding>().unwrap(), binding);
        assert_eq!(PortBinding::same(7054).to_string(), "7054:7054");
    }

    #[test]
    fn test_port_binding_rejects_garbage() {
        for input in ["7054", "a:b", "70000:1", ":"] {
            assert_eq!(
                input.parse::<PortBinding>(),
                Err(Error::InvalidPortBinding(input.to_string()))
            );
        }
    }

    #[test]
    fn test_bind_volume_display_and_parse() {
        let binding =
            VolumeBinding::read_only("/stacks/dev/blockchain/genesis_block.pb", "/g.block");

        assert_eq!(
            binding.to_string(),
            "/stacks/dev/blockchain/genesis_block.pb:/g.block:ro"
        );
        assert_eq!(
            "/stacks/dev/blockchain/genesis_block.pb:/g.block:ro"
                .parse::<VolumeBinding>()
                .unwrap(),
            binding
        );
        assert_eq!(binding.container_path(), "/g.block");
    }

    #[test]
    fn test_writable_bind_parses() {
        let binding: VolumeBinding = "./data:/data".parse().unwrap();

        assert_eq!(
            binding,
            VolumeBinding::Bind {
                host_path: PathBuf::from("./data"),
                container_path: "/data".to_string(),
                read_only: false,
            }
        );
        assert_eq!(binding.to_string(), "./data:/data");
    }

    #[test]
    fn test_relative_read_only_bind_parses() {
        let binding =
            VolumeBinding::read_only("stacks/dev/blockchain/genesis_block.pb", "/g.block");

        assert_eq!(
            "stacks/dev/blockchain/genesis_block.pb:/g.block:ro"
                .parse::<VolumeBinding>()
                .unwrap(),
            binding
        );
    }

    #[test]
    fn test_named_volume_display_and_parse() {
        let binding =
            VolumeBinding::named("orderer.example.com", "/var/hyperledger/production/orderer");

        assert_eq!(
            binding.to_string(),
            "orderer.example.com:/var/hyperledger/production/orderer"
        );
        assert_eq!(
            "orderer.example.com:/var/hyperledger/production/orderer"
                .parse::<VolumeBinding>()
                .unwrap(),
            binding
        );
    }

    #[test]
    fn test_volume_binding_rejects_garbage() {
        for input in ["", "data", "data:relative", "/a:/b:rx", "/a:/b:ro:x", "vol:/b:ro"] {
            assert_eq!(
                input.parse::<VolumeBinding>(),
                Err(Error::InvalidVolumeBinding(input.to_string()))
            );
        }
    }

    #[test]
    fn test_service_serializes_bindings_as_strings() {
        let service = Service {
            image: "hyperledger/fabric-peer:latest".to_string(),
            ports: vec![PortBinding::same(7051)],
            volumes: vec![
                VolumeBinding::read_only("/s/msp", "/etc/hyperledger/fabric/msp"),
                VolumeBinding::named("peer", "/var/hyperledger/production"),
            ],
            ..Service::default()
        };

        let json = serde_json::to_value(&service).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "image": "hyperledger/fabric-peer:latest",
                "ports": ["7051:7051"],
                "volumes": [
                    "/s/msp:/etc/hyperledger/fabric/msp:ro",
                    "peer:/var/hyperledger/production"
                ]
            })
        );
        assert_eq!(serde_json::from_value::<Service>(json).unwrap(), service);
    }

    #[test]
    fn test_declares_named_volumes() {
        let mut definition = ServiceDefinition {
            service_name: "peer".to_string(),
            service: Some(Service {
                volumes: vec![VolumeBinding::named("peer", "/data")],
                ..Service::default()
            }),
            volume_names: vec![],
        };
        assert!(!definition.declares_named_volumes());

        definition.volume_names.push("peer".to_string());
        assert!(definition.declares_named_volumes());

        definition.service = None;
        definition.volume_names.clear();
        assert!(definition.declares_named_volumes());
    }
}
