//! Runtime status with the QoS resource catalog snapshot

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::sync::Arc;

use qosgate_core::{CapabilityCatalog, ResourceEntry, ResourceKind, ResourceScope};

/// Reason reported when the network is not ready
pub const NETWORK_NOT_READY_REASON: &str = "NetworkPluginNotReady";

/// Condition type of the runtime itself
pub const RUNTIME_READY: &str = "RuntimeReady";

/// Condition type of the pod network
pub const NETWORK_READY: &str = "NetworkReady";

/// One class of a QoS resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QosResourceClassInfo {
    /// Class name
    pub name: String,
    /// Ordinal of the class within its resource type
    pub capacity: u64,
}

/// One QoS resource type and its classes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QosResourceInfo {
    /// Resource type name
    pub name: String,
    /// Whether the class can be changed after creation
    pub mutable: bool,
    /// Available classes
    pub classes: Vec<QosResourceClassInfo>,
}

impl QosResourceInfo {
    fn from_entry(entry: &ResourceEntry) -> Self {
        Self {
            name: entry.name().to_string(),
            mutable: false,
            classes: entry
                .classes()
                .iter()
                .zip(0u64..)
                .map(|(name, capacity)| QosResourceClassInfo {
                    name: name.clone(),
                    capacity,
                })
                .collect(),
        }
    }
}

/// QoS resources available to pods and containers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcesInfo {
    /// Pod-level QoS resources
    pub pod_qos_resources: Vec<QosResourceInfo>,
    /// Container-level QoS resources
    pub container_qos_resources: Vec<QosResourceInfo>,
}

/// Runtime condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeCondition {
    /// Condition type
    #[serde(rename = "type")]
    pub condition_type: String,
    /// Whether the condition holds
    pub status: bool,
    /// Machine-readable reason, empty when the condition holds
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
    /// Human-readable message
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl RuntimeCondition {
    fn ready(condition_type: &str) -> Self {
        Self {
            condition_type: condition_type.to_string(),
            status: true,
            reason: String::new(),
            message: String::new(),
        }
    }
}

/// Runtime status answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeStatus {
    /// Runtime and network conditions
    pub conditions: Vec<RuntimeCondition>,
    /// QoS resource catalog snapshot
    pub resources: ResourcesInfo,
}

/// Reports the capability catalog to status queries
#[derive(Debug, Clone)]
pub struct StatusReporter {
    catalog: Arc<CapabilityCatalog>,
}

impl StatusReporter {
    /// Create a reporter for a catalog
    #[must_use]
    pub const fn new(catalog: Arc<CapabilityCatalog>) -> Self {
        Self { catalog }
    }

    /// QoS resources of a scope
    ///
    /// Native types are only reported when classes are configured for them.
    #[must_use]
    pub fn qos_resources(&self, scope: ResourceScope) -> Vec<QosResourceInfo> {
        self.catalog
            .entries(scope)
            .filter(|entry| {
                entry.kind() == ResourceKind::Extension || !entry.classes().is_empty()
            })
            .map(QosResourceInfo::from_entry)
            .collect()
    }

    /// Catalog snapshot for both scopes
    #[must_use]
    pub fn resources(&self) -> ResourcesInfo {
        ResourcesInfo {
            pod_qos_resources: self.qos_resources(ResourceScope::Pod),
            container_qos_resources: self.qos_resources(ResourceScope::Container),
        }
    }

    /// Full runtime status
    ///
    /// `network` is the readiness of the network plugin; an error marks the
    /// network condition as not ready.
    pub fn status<E: Display>(&self, network: Result<(), E>) -> RuntimeStatus {
        let mut network_condition = RuntimeCondition::ready(NETWORK_READY);
        if let Err(e) = network {
            network_condition.status = false;
            network_condition.reason = NETWORK_NOT_READY_REASON.to_string();
            network_condition.message = format!("Network plugin returns error: {e}");
        }

        RuntimeStatus {
            conditions: vec![RuntimeCondition::ready(RUNTIME_READY), network_condition],
            resources: self.resources(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qosgate_core::{ExtensionResourceConfig, QosConfig, RdtConfig};

    fn reporter(config: &QosConfig) -> StatusReporter {
        StatusReporter::new(Arc::new(CapabilityCatalog::from_config(config).unwrap()))
    }

    #[test]
    fn test_container_resources() {
        let config = QosConfig::new()
            .with_rdt(RdtConfig::enabled(["gold", "silver"]))
            .with_container_resource(ExtensionResourceConfig::new("dummy-1", ["class-a"]));

        let resources = reporter(&config).qos_resources(ResourceScope::Container);

        // blockio has no classes and is left out
        let names: Vec<&str> = resources.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["rdt", "dummy-1"]);

        assert_eq!(
            resources[0].classes,
            [
                QosResourceClassInfo {
                    name: "gold".to_string(),
                    capacity: 0
                },
                QosResourceClassInfo {
                    name: "silver".to_string(),
                    capacity: 1
                },
            ]
        );
        assert!(resources.iter().all(|r| !r.mutable));
    }

    #[test]
    fn test_disabled_native_with_classes_is_reported() {
        let mut rdt = RdtConfig::enabled(["gold"]);
        rdt.enabled = false;
        let config = QosConfig::new().with_rdt(rdt);

        let resources = reporter(&config).resources();
        assert_eq!(resources.container_qos_resources.len(), 1);
        assert!(resources.pod_qos_resources.is_empty());
    }

    #[test]
    fn test_pod_resources() {
        let config = QosConfig::new()
            .with_rdt(RdtConfig::enabled(["gold"]))
            .with_pod_resource(ExtensionResourceConfig::new("podres-1", ["qos-a"]))
            .with_pod_resource(ExtensionResourceConfig::new("podres-2", Vec::<String>::new()));

        let pod = reporter(&config).qos_resources(ResourceScope::Pod);
        let names: Vec<&str> = pod.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["podres-1", "podres-2"]);
    }

    #[test]
    fn test_network_conditions() {
        let reporter = reporter(&QosConfig::new());

        let status = reporter.status(Ok::<(), String>(()));
        assert!(status.conditions.iter().all(|c| c.status));

        let status = reporter.status(Err("cni config not found"));
        let network = &status.conditions[1];
        assert_eq!(network.condition_type, NETWORK_READY);
        assert!(!network.status);
        assert_eq!(network.reason, NETWORK_NOT_READY_REASON);
        assert_eq!(
            network.message,
            "Network plugin returns error: cni config not found"
        );
        assert!(status.conditions[0].status);
    }

    #[test]
    fn test_status_json_shape() {
        let reporter = reporter(&QosConfig::new().with_rdt(RdtConfig::enabled(["gold"])));
        let json = serde_json::to_value(reporter.status(Ok::<(), String>(()))).unwrap();

        assert_eq!(json["conditions"][0]["type"], "RuntimeReady");
        assert!(json["conditions"][0].get("reason").is_none());
        assert_eq!(
            json["resources"]["container_qos_resources"][0]["classes"][0]["name"],
            "gold"
        );
    }
}
