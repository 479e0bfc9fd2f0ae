//! Per-request admission inputs: QoS resource maps and annotations

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Free-form annotations attached to a pod or a container
pub type AnnotationSet = BTreeMap<String, String>;

/// Requested class per resource type
///
/// Keys are caller controlled and are checked against the capability
/// catalog before anything is resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QosResourceRequest(BTreeMap<String, String>);

impl QosResourceRequest {
    /// Create an empty request
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a class request for a resource type
    #[must_use]
    pub fn with(mut self, resource_type: impl Into<String>, class: impl Into<String>) -> Self {
        self.0.insert(resource_type.into(), class.into());
        self
    }

    /// Class requested for a resource type, if the key is present
    #[must_use]
    pub fn get(&self, resource_type: &str) -> Option<&str> {
        self.0.get(resource_type).map(String::as_str)
    }

    /// Iterate over `(resource type, class)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(r, c)| (r.as_str(), c.as_str()))
    }

    /// Number of requested resource types
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing was requested
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QosResourceRequest {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Pod sandbox part of an admission request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Pod annotations
    pub annotations: AnnotationSet,
    /// Pod-level QoS resource requests
    pub qos_resources: QosResourceRequest,
}

/// Container part of an admission request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerConfig {
    /// Container name from the container metadata
    pub name: String,
    /// Container annotations
    #[serde(default)]
    pub annotations: AnnotationSet,
    /// Container-level QoS resource requests
    #[serde(default)]
    pub qos_resources: QosResourceRequest,
}

impl ContainerConfig {
    /// Create a container config with no annotations or requests
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the structured QoS resource requests
    #[must_use]
    pub fn with_qos_resources(mut self, qos_resources: QosResourceRequest) -> Self {
        self.qos_resources = qos_resources;
        self
    }

    /// Add a container annotation
    #[must_use]
    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }
}
