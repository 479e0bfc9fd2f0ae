//! Platform QoS configuration

use serde::{Deserialize, Serialize};

use crate::Result;

/// Platform configuration the capability catalog is built from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QosConfig {
    /// RDT subsystem
    pub rdt: RdtConfig,

    /// BlockIO subsystem
    pub blockio: BlockIoConfig,

    /// Extension resource types available to pod sandboxes
    pub pod_resources: Vec<ExtensionResourceConfig>,

    /// Extension resource types available to containers
    pub container_resources: Vec<ExtensionResourceConfig>,
}

impl QosConfig {
    /// Create an empty configuration (both native subsystems disabled)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the RDT subsystem configuration
    #[must_use]
    pub fn with_rdt(mut self, rdt: RdtConfig) -> Self {
        self.rdt = rdt;
        self
    }

    /// Set the BlockIO subsystem configuration
    #[must_use]
    pub fn with_blockio(mut self, blockio: BlockIoConfig) -> Self {
        self.blockio = blockio;
        self
    }

    /// Add a pod-level extension resource type
    #[must_use]
    pub fn with_pod_resource(mut self, resource: ExtensionResourceConfig) -> Self {
        self.pod_resources.push(resource);
        self
    }

    /// Add a container-level extension resource type
    #[must_use]
    pub fn with_container_resource(mut self, resource: ExtensionResourceConfig) -> Self {
        self.container_resources.push(resource);
        self
    }
}

/// RDT subsystem configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RdtConfig {
    /// Whether RDT is usable on this host
    pub enabled: bool,

    /// Configured classes of service
    pub classes: Vec<String>,

    /// Prefix prepended to the class name to form the `ClosID`
    pub closid_prefix: String,
}

impl RdtConfig {
    /// Enabled RDT with the given classes and no `ClosID` prefix
    #[must_use]
    pub fn enabled<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            enabled: true,
            classes: classes.into_iter().map(Into::into).collect(),
            closid_prefix: String::new(),
        }
    }

    /// Set the `ClosID` prefix
    #[must_use]
    pub fn with_closid_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.closid_prefix = prefix.into();
        self
    }
}

/// BlockIO subsystem configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockIoConfig {
    /// Whether BlockIO classes can be applied on this host
    pub enabled: bool,

    /// Configured classes, in reporting order
    pub classes: Vec<BlockIoClassConfig>,
}

impl BlockIoConfig {
    /// Enabled BlockIO with the given classes
    #[must_use]
    pub fn enabled(classes: Vec<BlockIoClassConfig>) -> Self {
        Self {
            enabled: true,
            classes,
        }
    }

    /// Names of the configured classes
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(|c| c.name.as_str())
    }

    /// Configuration of a class by name
    #[must_use]
    pub fn class(&self, name: &str) -> Option<&BlockIoClassConfig> {
        self.classes.iter().find(|c| c.name == name)
    }
}

/// One BlockIO class and the cgroup parameters it stands for
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockIoClassConfig {
    /// Class name
    pub name: String,

    /// Default I/O weight
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u16>,

    /// Leaf I/O weight
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaf_weight: Option<u16>,

    /// Per-device weights and throttles
    #[serde(default)]
    pub devices: Vec<BlockIoDeviceConfig>,
}

impl BlockIoClassConfig {
    /// Class with a default weight and no device rules
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the default weight
    #[must_use]
    pub fn with_weight(mut self, weight: u16) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Add a device rule
    #[must_use]
    pub fn with_device(mut self, device: BlockIoDeviceConfig) -> Self {
        self.devices.push(device);
        self
    }
}

/// Per-device BlockIO parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockIoDeviceConfig {
    /// Device major number
    pub major: i64,
    /// Device minor number
    pub minor: i64,
    /// Device weight
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<u16>,
    /// Read bandwidth limit, bytes per second
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throttle_read_bps: Option<u64>,
    /// Write bandwidth limit, bytes per second
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throttle_write_bps: Option<u64>,
    /// Read operations limit, per second
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throttle_read_iops: Option<u64>,
    /// Write operations limit, per second
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throttle_write_iops: Option<u64>,
}

impl BlockIoDeviceConfig {
    /// Rule for the device `major:minor`
    #[must_use]
    pub fn new(major: i64, minor: i64) -> Self {
        Self {
            major,
            minor,
            ..Self::default()
        }
    }
}

/// Extension (non-native) resource type and its classes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionResourceConfig {
    /// Resource type name
    pub name: String,
    /// Classes the resource type offers, in reporting order
    #[serde(default)]
    pub classes: Vec<String>,
}

impl ExtensionResourceConfig {
    /// Create an extension resource type
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            classes: classes.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = QosConfig::from_json_str("{}").unwrap();
        assert!(!config.rdt.enabled);
        assert!(!config.blockio.enabled);
        assert!(config.rdt.closid_prefix.is_empty());
        assert!(config.container_resources.is_empty());
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "rdt": { "enabled": true, "classes": ["gold", "silver"], "closid_prefix": "qos-" },
            "blockio": {
                "enabled": true,
                "classes": [
                    { "name": "slowreader", "weight": 50,
                      "devices": [ { "major": 8, "minor": 0, "throttle_read_bps": 1048576 } ] }
                ]
            },
            "container_resources": [ { "name": "dummy-1", "classes": ["class-a"] } ]
        }"#;

        let config = QosConfig::from_json_str(json).unwrap();
        assert_eq!(config.rdt.classes, vec!["gold", "silver"]);
        assert_eq!(config.rdt.closid_prefix, "qos-");

        let class = config.blockio.class("slowreader").unwrap();
        assert_eq!(class.weight, Some(50));
        assert_eq!(class.devices[0].throttle_read_bps, Some(1_048_576));
        assert_eq!(config.container_resources[0].name, "dummy-1");
    }

    #[test]
    fn test_config_rejects_malformed_json() {
        assert!(QosConfig::from_json_str("{ \"rdt\": 3 }").is_err());
    }
}
