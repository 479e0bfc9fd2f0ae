//! Projection of resolved classes onto the OCI runtime spec

use oci_spec::runtime::{Linux, LinuxBlockIo, LinuxIntelRdtBuilder, LinuxResources, Spec};
use std::sync::Arc;
use tracing::{debug, warn};

use qosgate_core::{NativeResource, ResolvedAssignment, Result};

use crate::blockio::BlockIoTranslator;

/// Writes resolved native classes into the launch descriptor
///
/// Only the RDT `ClosID` and the block-I/O resource section are touched;
/// an assignment without a class leaves the spec unchanged.
#[derive(Clone)]
pub struct SpecProjector {
    closid_prefix: String,
    blockio: Arc<dyn BlockIoTranslator>,
}

impl SpecProjector {
    /// Create a projector
    #[must_use]
    pub fn new(closid_prefix: impl Into<String>, blockio: Arc<dyn BlockIoTranslator>) -> Self {
        Self {
            closid_prefix: closid_prefix.into(),
            blockio,
        }
    }

    /// Apply one resolved assignment to `spec`
    ///
    /// A BlockIO class the translator rejects is skipped without error.
    pub fn project(&self, spec: &mut Spec, assignment: &ResolvedAssignment) -> Result<()> {
        let Some(class) = assignment.class() else {
            return Ok(());
        };

        match assignment.resource {
            NativeResource::Rdt => self.project_rdt(spec, class),
            NativeResource::BlockIo => {
                match self.blockio.linux_block_io(class) {
                    Ok(block_io) => set_block_io(spec, block_io),
                    Err(e) => {
                        warn!(class, error = %e, "Skipping BlockIO class that cannot be translated");
                    }
                }
                Ok(())
            }
        }
    }

    fn project_rdt(&self, spec: &mut Spec, class: &str) -> Result<()> {
        let clos_id = format!("{}{class}", self.closid_prefix);
        debug!(clos_id = clos_id.as_str(), "Setting RDT ClosID");

        let intel_rdt = LinuxIntelRdtBuilder::default().clos_id(clos_id).build()?;

        let mut linux = spec.linux().clone().unwrap_or_else(bare_linux);
        linux.set_intel_rdt(Some(intel_rdt));
        spec.set_linux(Some(linux));
        Ok(())
    }
}

fn set_block_io(spec: &mut Spec, block_io: LinuxBlockIo) {
    let mut linux = spec.linux().clone().unwrap_or_else(bare_linux);
    let mut resources = linux.resources().clone().unwrap_or_else(bare_resources);
    resources.set_block_io(Some(block_io));
    linux.set_resources(Some(resources));
    spec.set_linux(Some(linux));
}

// The oci-spec defaults carry namespaces, masked paths and a device list.
// A section created here must hold nothing but the QoS fields.
fn bare_linux() -> Linux {
    let mut linux = Linux::default();
    linux.set_resources(None);
    linux.set_namespaces(None);
    linux.set_masked_paths(None);
    linux.set_readonly_paths(None);
    linux
}

fn bare_resources() -> LinuxResources {
    let mut resources = LinuxResources::default();
    resources.set_devices(None);
    resources
}

impl std::fmt::Debug for SpecProjector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpecProjector")
            .field("closid_prefix", &self.closid_prefix)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockio::ConfiguredBlockIo;
    use qosgate_core::{BlockIoClassConfig, BlockIoConfig, ClassSource};

    fn projector(prefix: &str) -> SpecProjector {
        let blockio = ConfiguredBlockIo::new(BlockIoConfig::enabled(vec![
            BlockIoClassConfig::new("slowreader").with_weight(50),
        ]));
        SpecProjector::new(prefix, Arc::new(blockio))
    }

    fn assignment(resource: NativeResource, class: Option<&str>) -> ResolvedAssignment {
        ResolvedAssignment {
            resource,
            class: class.map(str::to_string),
            source: ClassSource::Structured,
        }
    }

    fn clos_id(spec: &Spec) -> Option<String> {
        spec.linux()
            .as_ref()
            .and_then(|l| l.intel_rdt().clone())
            .and_then(|rdt| rdt.clos_id().clone())
    }

    fn block_io(spec: &Spec) -> Option<LinuxBlockIo> {
        spec.linux()
            .as_ref()
            .and_then(|l| l.resources().clone())
            .and_then(|r| r.block_io().clone())
    }

    #[test]
    fn test_rdt_closid() {
        let mut spec = Spec::default();
        projector("qos-")
            .project(&mut spec, &assignment(NativeResource::Rdt, Some("gold")))
            .unwrap();
        assert_eq!(clos_id(&spec).as_deref(), Some("qos-gold"));
    }

    #[test]
    fn test_no_class_is_noop() {
        let mut spec = Spec::default();
        let before = spec.clone();
        let projector = projector("");

        projector
            .project(&mut spec, &assignment(NativeResource::Rdt, None))
            .unwrap();
        projector
            .project(&mut spec, &assignment(NativeResource::BlockIo, None))
            .unwrap();

        assert_eq!(spec, before);
    }

    #[test]
    fn test_blockio_resources() {
        let mut spec = Spec::default();
        projector("")
            .project(
                &mut spec,
                &assignment(NativeResource::BlockIo, Some("slowreader")),
            )
            .unwrap();

        let block_io = block_io(&spec).unwrap();
        assert_eq!(serde_json::to_value(&block_io).unwrap()["weight"], 50);
    }

    #[test]
    fn test_blockio_translation_failure_is_skipped() {
        let mut spec = Spec::default();
        let before = spec.clone();

        projector("")
            .project(&mut spec, &assignment(NativeResource::BlockIo, Some("unknown")))
            .unwrap();

        assert_eq!(spec, before);
    }

    fn linux_json(spec: &Spec) -> serde_json::Value {
        serde_json::to_value(spec.linux()).unwrap()
    }

    #[test]
    fn test_spec_without_linux_section() {
        let projector = projector("qos-");

        let mut spec = Spec::default();
        spec.set_linux(None);
        projector
            .project(&mut spec, &assignment(NativeResource::Rdt, Some("gold")))
            .unwrap();
        assert_eq!(
            linux_json(&spec),
            serde_json::json!({ "intelRdt": { "closID": "qos-gold" } })
        );

        let mut spec = Spec::default();
        spec.set_linux(None);
        projector
            .project(&mut spec, &assignment(NativeResource::BlockIo, Some("slowreader")))
            .unwrap();
        assert_eq!(
            linux_json(&spec),
            serde_json::json!({ "resources": { "blockIO": { "weight": 50 } } })
        );
    }

    #[test]
    fn test_linux_without_resources_section() {
        let namespaces = Spec::default()
            .linux()
            .as_ref()
            .and_then(|l| l.namespaces().clone());
        let mut linux = bare_linux();
        linux.set_namespaces(namespaces);
        let mut spec = Spec::default();
        spec.set_linux(Some(linux.clone()));

        projector("")
            .project(&mut spec, &assignment(NativeResource::BlockIo, Some("slowreader")))
            .unwrap();

        let json = linux_json(&spec);
        assert_eq!(
            json["resources"],
            serde_json::json!({ "blockIO": { "weight": 50 } })
        );
        assert_eq!(
            json["namespaces"],
            serde_json::to_value(linux.namespaces()).unwrap()
        );
    }

    #[test]
    fn test_projection_is_idempotent() {
        let projector = projector("qos-");
        let assignments = [
            assignment(NativeResource::Rdt, Some("gold")),
            assignment(NativeResource::BlockIo, Some("slowreader")),
        ];

        let mut once = Spec::default();
        for a in &assignments {
            projector.project(&mut once, a).unwrap();
        }

        let mut twice = once.clone();
        for a in &assignments {
            projector.project(&mut twice, a).unwrap();
        }

        assert_eq!(once, twice);
    }
}
