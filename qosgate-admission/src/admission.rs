//! QoS resource handling for pod sandbox and container creation

use oci_spec::runtime::Spec;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use qosgate_core::{
    CapabilityCatalog, ContainerConfig, NativeResource, ResolvedAssignment, ResourceScope, Result,
    SandboxConfig,
};

use crate::blockio::{BlockIoTranslator, ConfiguredBlockIo};
use crate::projector::SpecProjector;
use crate::resolver::{ClassResolver, NativeResolvers};
use crate::validator::validate_resources;

/// Resolved native classes of one container
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerAssignments {
    /// RDT assignment
    pub rdt: ResolvedAssignment,
    /// BlockIO assignment
    pub blockio: ResolvedAssignment,
}

impl ContainerAssignments {
    /// Assignments in projection order
    #[must_use]
    pub const fn in_order(&self) -> [&ResolvedAssignment; 2] {
        [&self.rdt, &self.blockio]
    }
}

/// Admission-time QoS resource handler
///
/// Holds the capability catalog for the lifetime of the server. Every call
/// is independent; nothing is cached between requests.
///
/// # Example
/// ```
/// use oci_spec::runtime::Spec;
/// use qosgate_admission::QosAdmission;
/// use qosgate_core::{ContainerConfig, QosConfig, QosResourceRequest, RdtConfig, SandboxConfig};
///
/// let config = QosConfig::new().with_rdt(RdtConfig::enabled(["gold"]));
/// let admission = QosAdmission::from_config(&config).unwrap();
///
/// let container = ContainerConfig::new("web")
///     .with_qos_resources(QosResourceRequest::new().with("rdt", "gold"));
///
/// let mut spec = Spec::default();
/// let assignments = admission
///     .handle_container(&mut spec, &container, &SandboxConfig::default())
///     .unwrap();
/// assert_eq!(assignments.rdt.class(), Some("gold"));
/// ```
#[derive(Debug, Clone)]
pub struct QosAdmission {
    catalog: Arc<CapabilityCatalog>,
    resolver: ClassResolver,
    projector: SpecProjector,
}

impl QosAdmission {
    /// Create a handler from its collaborators
    #[must_use]
    pub fn new(
        catalog: Arc<CapabilityCatalog>,
        annotations: NativeResolvers,
        blockio: Arc<dyn BlockIoTranslator>,
    ) -> Self {
        let projector = SpecProjector::new(catalog.closid_prefix(), blockio);
        let resolver = ClassResolver::new(Arc::clone(&catalog), annotations);
        Self {
            catalog,
            resolver,
            projector,
        }
    }

    /// Build the catalog and the default collaborators from configuration
    ///
    /// Annotations are parsed with the Kubernetes annotation scheme and
    /// BlockIO classes are translated from the configured class parameters.
    pub fn from_config(config: &qosgate_core::QosConfig) -> Result<Self> {
        let catalog = Arc::new(CapabilityCatalog::from_config(config)?);
        let annotations = NativeResolvers::kubernetes(&catalog);
        let blockio = Arc::new(ConfiguredBlockIo::new(config.blockio.clone()));
        Ok(Self::new(catalog, annotations, blockio))
    }

    /// Capability catalog
    #[must_use]
    pub fn catalog(&self) -> &Arc<CapabilityCatalog> {
        &self.catalog
    }

    /// Validate the QoS resource requests of a pod sandbox
    pub fn handle_sandbox(&self, sandbox: &SandboxConfig) -> Result<()> {
        validate_resources(&self.catalog, ResourceScope::Pod, &sandbox.qos_resources)
    }

    /// Resolve a container's native classes without touching any spec
    pub fn resolve_container(
        &self,
        container: &ContainerConfig,
        sandbox: &SandboxConfig,
    ) -> Result<ContainerAssignments> {
        validate_resources(
            &self.catalog,
            ResourceScope::Container,
            &container.qos_resources,
        )?;

        Ok(ContainerAssignments {
            rdt: self
                .resolver
                .resolve(NativeResource::Rdt, container, sandbox)?,
            blockio: self
                .resolver
                .resolve(NativeResource::BlockIo, container, sandbox)?,
        })
    }

    /// Validate, resolve, and apply a container's QoS resources to `spec`
    ///
    /// Both native types are resolved before the spec is modified, so a
    /// failed request leaves `spec` untouched.
    pub fn handle_container(
        &self,
        spec: &mut Spec,
        container: &ContainerConfig,
        sandbox: &SandboxConfig,
    ) -> Result<ContainerAssignments> {
        let assignments = self.resolve_container(container, sandbox)?;

        for assignment in assignments.in_order() {
            self.projector.project(spec, assignment)?;
        }

        debug!(
            container = container.name.as_str(),
            rdt = assignments.rdt.class(),
            blockio = assignments.blockio.class(),
            "QoS resources applied"
        );

        Ok(assignments)
    }
}
