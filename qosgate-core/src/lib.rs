//! qosgate Core - QoS resource types, admission inputs, and the capability catalog
//!
//! This crate provides the data model shared by the admission path and the
//! status reporter.

#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod request;
pub mod types;

pub use catalog::{CapabilityCatalog, ResourceEntry, ResourceKind};
pub use config::{
    BlockIoClassConfig, BlockIoConfig, BlockIoDeviceConfig, ExtensionResourceConfig, QosConfig,
    RdtConfig,
};
pub use error::{BoxError, Error, Result};
pub use request::{AnnotationSet, ContainerConfig, QosResourceRequest, SandboxConfig};
pub use types::{
    BLOCKIO, ClassSource, NativeResource, RDT, ResolvedAssignment, ResourceScope,
};
