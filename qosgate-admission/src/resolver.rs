//! Effective class resolution for native resource types
//!
//! A class in the structured resource map always wins. Annotations are only
//! consulted when the map has no entry for the type, and a non-empty result
//! is rejected if the subsystem is disabled on this host.

use std::sync::Arc;
use tracing::debug;

use qosgate_core::{
    CapabilityCatalog, ClassSource, ContainerConfig, Error, NativeResource, ResolvedAssignment,
    Result, SandboxConfig,
};

use crate::annotations::{AnnotationResolver, KubernetesAnnotations};

/// Annotation resolvers of the native subsystems
#[derive(Clone)]
pub struct NativeResolvers {
    rdt: Arc<dyn AnnotationResolver>,
    blockio: Arc<dyn AnnotationResolver>,
}

impl NativeResolvers {
    /// Use the given annotation resolvers
    #[must_use]
    pub fn new(rdt: Arc<dyn AnnotationResolver>, blockio: Arc<dyn AnnotationResolver>) -> Self {
        Self { rdt, blockio }
    }

    /// Kubernetes annotation resolvers accepting the catalog's classes
    #[must_use]
    pub fn kubernetes(catalog: &CapabilityCatalog) -> Self {
        let resolver = |resource: NativeResource| -> Arc<dyn AnnotationResolver> {
            Arc::new(KubernetesAnnotations::new(
                resource,
                catalog.native(resource).classes().iter().cloned(),
            ))
        };

        Self {
            rdt: resolver(NativeResource::Rdt),
            blockio: resolver(NativeResource::BlockIo),
        }
    }

    /// Annotation resolver of a native subsystem
    #[must_use]
    pub fn get(&self, resource: NativeResource) -> &dyn AnnotationResolver {
        match resource {
            NativeResource::Rdt => self.rdt.as_ref(),
            NativeResource::BlockIo => self.blockio.as_ref(),
        }
    }
}

impl std::fmt::Debug for NativeResolvers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeResolvers").finish_non_exhaustive()
    }
}

/// Class resolver for the native resource types
#[derive(Debug, Clone)]
pub struct ClassResolver {
    catalog: Arc<CapabilityCatalog>,
    annotations: NativeResolvers,
}

impl ClassResolver {
    /// Create a resolver over a catalog and the annotation fallbacks
    #[must_use]
    pub fn new(catalog: Arc<CapabilityCatalog>, annotations: NativeResolvers) -> Self {
        Self {
            catalog,
            annotations,
        }
    }

    /// Effective class of `resource` for a container
    ///
    /// # Errors
    /// - annotation resolver failures, unchanged
    /// - [`Error::SubsystemDisabled`] if a class was resolved for a disabled subsystem
    pub fn resolve(
        &self,
        resource: NativeResource,
        container: &ContainerConfig,
        sandbox: &SandboxConfig,
    ) -> Result<ResolvedAssignment> {
        let name = container.name.as_str();

        let structured = container
            .qos_resources
            .get(resource.name())
            .filter(|class| !class.is_empty());

        let assignment = if let Some(class) = structured {
            debug!(%resource, class, container = name, "Class from container config");
            ResolvedAssignment {
                resource,
                class: Some(class.to_string()),
                source: ClassSource::Structured,
            }
        } else {
            let class = self.annotations.get(resource).container_class(
                name,
                &container.annotations,
                &sandbox.annotations,
            )?;
            if let Some(class) = &class {
                debug!(%resource, class = class.as_str(), container = name, "Class from annotations");
            }
            ResolvedAssignment {
                resource,
                class,
                source: ClassSource::Annotation,
            }
        };

        if let Some(class) = assignment.class() {
            if !self.catalog.native(resource).is_enabled() {
                return Err(Error::SubsystemDisabled {
                    resource_type: resource.name().to_string(),
                    class: class.to_string(),
                    container: name.to_string(),
                });
            }
        }

        Ok(assignment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::MockAnnotationResolver;
    use qosgate_core::{BlockIoConfig, QosConfig, QosResourceRequest, RdtConfig};

    fn catalog(rdt_enabled: bool) -> Arc<CapabilityCatalog> {
        let mut rdt = RdtConfig::enabled(["gold", "silver"]);
        rdt.enabled = rdt_enabled;
        let config = QosConfig::new()
            .with_rdt(rdt)
            .with_blockio(BlockIoConfig::default());
        Arc::new(CapabilityCatalog::from_config(&config).unwrap())
    }

    fn resolver(
        rdt_enabled: bool,
        rdt: &MockAnnotationResolver,
        blockio: &MockAnnotationResolver,
    ) -> ClassResolver {
        ClassResolver::new(
            catalog(rdt_enabled),
            NativeResolvers::new(Arc::new(rdt.clone()), Arc::new(blockio.clone())),
        )
    }

    fn container(request: QosResourceRequest) -> ContainerConfig {
        ContainerConfig::new("web").with_qos_resources(request)
    }

    #[test]
    fn test_structured_class_wins() {
        let annotations = MockAnnotationResolver::class("silver");
        let resolver = resolver(true, &annotations, &MockAnnotationResolver::none());

        let assignment = resolver
            .resolve(
                NativeResource::Rdt,
                &container(QosResourceRequest::new().with("rdt", "gold")),
                &SandboxConfig::default(),
            )
            .unwrap();

        assert_eq!(assignment.class(), Some("gold"));
        assert_eq!(assignment.source, ClassSource::Structured);
        assert_eq!(annotations.call_count(), 0);
    }

    #[test]
    fn test_annotation_fallback() {
        let annotations = MockAnnotationResolver::class("silver");
        let resolver = resolver(true, &annotations, &MockAnnotationResolver::none());

        let assignment = resolver
            .resolve(
                NativeResource::Rdt,
                &container(QosResourceRequest::new()),
                &SandboxConfig::default(),
            )
            .unwrap();

        assert_eq!(assignment.class(), Some("silver"));
        assert_eq!(assignment.source, ClassSource::Annotation);
        assert_eq!(annotations.call_count(), 1);
    }

    #[test]
    fn test_other_type_does_not_shadow() {
        let blockio = MockAnnotationResolver::class("slow");
        let resolver = resolver(true, &MockAnnotationResolver::none(), &blockio);

        // An RDT entry says nothing about BlockIO
        let err = resolver
            .resolve(
                NativeResource::BlockIo,
                &container(QosResourceRequest::new().with("rdt", "gold")),
                &SandboxConfig::default(),
            )
            .unwrap_err();

        assert!(matches!(err, Error::SubsystemDisabled { .. }));
        assert_eq!(blockio.call_count(), 1);
    }

    #[test]
    fn test_disabled_subsystem() {
        let resolver = resolver(
            false,
            &MockAnnotationResolver::none(),
            &MockAnnotationResolver::none(),
        );

        let err = resolver
            .resolve(
                NativeResource::Rdt,
                &container(QosResourceRequest::new().with("rdt", "gold")),
                &SandboxConfig::default(),
            )
            .unwrap_err();

        assert!(matches!(
            err,
            Error::SubsystemDisabled { ref resource_type, ref class, ref container }
                if resource_type == "rdt" && class == "gold" && container == "web"
        ));
    }

    #[test]
    fn test_nothing_requested_while_disabled() {
        let resolver = resolver(
            false,
            &MockAnnotationResolver::none(),
            &MockAnnotationResolver::none(),
        );

        let assignment = resolver
            .resolve(
                NativeResource::Rdt,
                &container(QosResourceRequest::new()),
                &SandboxConfig::default(),
            )
            .unwrap();

        assert_eq!(assignment.class(), None);
        assert_eq!(assignment.source, ClassSource::Annotation);
    }

    #[test]
    fn test_annotation_error_propagated() {
        let resolver = resolver(
            true,
            &MockAnnotationResolver::failing("RDT class \"x\" does not exist"),
            &MockAnnotationResolver::none(),
        );

        let err = resolver
            .resolve(
                NativeResource::Rdt,
                &container(QosResourceRequest::new()),
                &SandboxConfig::default(),
            )
            .unwrap_err();

        assert!(matches!(err, Error::AnnotationResolution(_)));
        assert_eq!(err.to_string(), "RDT class \"x\" does not exist");
    }
}
