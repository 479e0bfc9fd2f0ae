//! QoS resource admission for container creation
//!
//! This crate validates requested QoS resource classes against the
//! capability catalog, resolves the effective RDT and BlockIO classes of a
//! container from the structured resource map and legacy annotations, and
//! writes them into the OCI runtime spec. Platform collaborators
//! (annotation parsers, BlockIO translation) sit behind traits so tests and
//! alternative platforms can plug in their own.

#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod admission;
pub mod annotations;
pub mod blockio;
pub mod projector;
pub mod resolver;
pub mod status;
pub mod validator;

pub use admission::{ContainerAssignments, QosAdmission};
pub use annotations::{
    AnnotationError, AnnotationResolver, KubernetesAnnotations, MockAnnotationResolver,
};
pub use blockio::{BlockIoTranslator, ConfiguredBlockIo};
pub use projector::SpecProjector;
pub use resolver::{ClassResolver, NativeResolvers};
pub use status::{
    QosResourceClassInfo, QosResourceInfo, ResourcesInfo, RuntimeCondition, RuntimeStatus,
    StatusReporter,
};
pub use validator::{validate_class, validate_resources};

// Re-export commonly used types
pub use qosgate_core::{CapabilityCatalog, Error, QosConfig, Result};
