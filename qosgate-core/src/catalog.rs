//! Capability catalog of QoS resource types and their classes
//!
//! The catalog is built once from [`QosConfig`] and never mutated afterwards,
//! so it can be shared behind an `Arc` and read from any number of
//! concurrent admission requests without locking.
//!
//! It doubles as the registry of resource types: validation and resolution
//! both go through [`CapabilityCatalog::lookup`], and the returned
//! [`ResourceEntry`] tells native types (two-channel resolution) apart from
//! extension types (closed class set).

use std::collections::HashMap;
use tracing::debug;

use crate::config::{ExtensionResourceConfig, QosConfig};
use crate::types::{NativeResource, ResourceScope};
use crate::{Error, Result};

/// How a registered resource type is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// Natively resolved type (structured map with annotation fallback)
    Native(NativeResource),
    /// Extension type whose classes are checked against the catalog
    Extension,
}

/// Registry record of one resource type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEntry {
    name: String,
    kind: ResourceKind,
    enabled: bool,
    classes: Vec<String>,
}

impl ResourceEntry {
    fn native(resource: NativeResource, enabled: bool, classes: Vec<String>) -> Self {
        Self {
            name: resource.name().to_string(),
            kind: ResourceKind::Native(resource),
            enabled,
            classes,
        }
    }

    fn extension(config: &ExtensionResourceConfig) -> Self {
        Self {
            name: config.name.clone(),
            kind: ResourceKind::Extension,
            enabled: true,
            classes: config.classes.clone(),
        }
    }

    /// Resource type name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handling kind
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Whether the subsystem backing this type is enabled
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Configured classes, in configuration order
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Whether `class` is one of the configured classes
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// Extension types of one scope, in configuration order
#[derive(Debug, Clone, Default)]
struct ResourceFamily {
    entries: Vec<ResourceEntry>,
    index: HashMap<String, usize>,
}

impl ResourceFamily {
    fn build(scope: ResourceScope, configs: &[ExtensionResourceConfig]) -> Result<Self> {
        let mut family = Self::default();

        for config in configs {
            if config.name.is_empty() {
                return Err(Error::InvalidConfig {
                    message: format!("{scope} QoS resource with empty name"),
                });
            }

            if NativeResource::from_name(&config.name).is_some() {
                return Err(Error::InvalidConfig {
                    message: format!(
                        "{scope} QoS resource {:?} shadows a native resource type",
                        config.name
                    ),
                });
            }

            if family.index.contains_key(&config.name) {
                return Err(Error::InvalidConfig {
                    message: format!("duplicate {scope} QoS resource {:?}", config.name),
                });
            }

            check_class_names(&config.name, &config.classes)?;

            family
                .index
                .insert(config.name.clone(), family.entries.len());
            family.entries.push(ResourceEntry::extension(config));
        }

        Ok(family)
    }

    fn get(&self, name: &str) -> Option<&ResourceEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }
}

fn check_class_names(resource_type: &str, classes: &[String]) -> Result<()> {
    if classes.iter().any(String::is_empty) {
        return Err(Error::InvalidConfig {
            message: format!("empty class name configured for QoS resource {resource_type:?}"),
        });
    }
    Ok(())
}

/// Immutable registry of QoS resource types
#[derive(Debug, Clone)]
pub struct CapabilityCatalog {
    rdt: ResourceEntry,
    blockio: ResourceEntry,
    closid_prefix: String,
    pod: ResourceFamily,
    container: ResourceFamily,
}

impl CapabilityCatalog {
    /// Build the catalog from platform configuration
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] on empty or duplicate resource names,
    /// extension types named like a native type, or empty class names.
    pub fn from_config(config: &QosConfig) -> Result<Self> {
        check_class_names(NativeResource::Rdt.name(), &config.rdt.classes)?;

        let blockio_classes: Vec<String> =
            config.blockio.class_names().map(str::to_string).collect();
        check_class_names(NativeResource::BlockIo.name(), &blockio_classes)?;

        let catalog = Self {
            rdt: ResourceEntry::native(
                NativeResource::Rdt,
                config.rdt.enabled,
                config.rdt.classes.clone(),
            ),
            blockio: ResourceEntry::native(
                NativeResource::BlockIo,
                config.blockio.enabled,
                blockio_classes,
            ),
            closid_prefix: config.rdt.closid_prefix.clone(),
            pod: ResourceFamily::build(ResourceScope::Pod, &config.pod_resources)?,
            container: ResourceFamily::build(
                ResourceScope::Container,
                &config.container_resources,
            )?,
        };

        debug!(
            rdt_enabled = catalog.rdt.enabled,
            rdt_classes = catalog.rdt.classes.len(),
            blockio_enabled = catalog.blockio.enabled,
            blockio_classes = catalog.blockio.classes.len(),
            pod_resources = catalog.pod.entries.len(),
            container_resources = catalog.container.entries.len(),
            "Built QoS capability catalog"
        );

        Ok(catalog)
    }

    /// Registry record of a native resource type
    #[must_use]
    pub const fn native(&self, resource: NativeResource) -> &ResourceEntry {
        match resource {
            NativeResource::Rdt => &self.rdt,
            NativeResource::BlockIo => &self.blockio,
        }
    }

    /// Look up a resource type in a scope
    ///
    /// Native types are known in every scope.
    #[must_use]
    pub fn lookup(&self, scope: ResourceScope, name: &str) -> Option<&ResourceEntry> {
        if let Some(native) = NativeResource::from_name(name) {
            return Some(self.native(native));
        }
        self.family(scope).get(name)
    }

    /// Classes of a resource type; empty for unknown types
    #[must_use]
    pub fn classes_for(&self, scope: ResourceScope, name: &str) -> &[String] {
        self.lookup(scope, name)
            .map(ResourceEntry::classes)
            .unwrap_or_default()
    }

    /// Whether a resource type is known and enabled
    #[must_use]
    pub fn is_enabled(&self, scope: ResourceScope, name: &str) -> bool {
        self.lookup(scope, name)
            .is_some_and(ResourceEntry::is_enabled)
    }

    /// Prefix prepended to RDT classes to form the `ClosID`
    #[must_use]
    pub fn closid_prefix(&self) -> &str {
        &self.closid_prefix
    }

    /// Registered resource types of a scope, in reporting order
    ///
    /// The container scope lists the native types first, followed by the
    /// configured extension types. The pod scope only has extension types.
    pub fn entries(&self, scope: ResourceScope) -> impl Iterator<Item = &ResourceEntry> {
        let natives = match scope {
            ResourceScope::Container => Some([&self.rdt, &self.blockio]),
            ResourceScope::Pod => None,
        };
        natives
            .into_iter()
            .flatten()
            .chain(self.family(scope).entries.iter())
    }

    const fn family(&self, scope: ResourceScope) -> &ResourceFamily {
        match scope {
            ResourceScope::Pod => &self.pod,
            ResourceScope::Container => &self.container,
        }
    }
}
