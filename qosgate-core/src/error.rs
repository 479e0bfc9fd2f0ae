//! Error types for qosgate

use thiserror::Error;

/// Boxed error returned by platform collaborators
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// qosgate error types
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A resource map entry carried an empty class name
    #[error("empty class name not allowed for QoS resource type {resource_type:?}")]
    EmptyClassName {
        /// Resource type of the offending entry
        resource_type: String,
    },

    /// Resource type is not registered in the capability catalog
    #[error("unknown QoS resource type {resource_type:?}")]
    UnknownResourceType {
        /// Requested resource type
        resource_type: String,
    },

    /// Class is not offered by an extension resource type
    #[error("unknown {resource_type} class {class:?}")]
    UnknownClass {
        /// Resource type
        resource_type: String,
        /// Requested class
        class: String,
    },

    /// A class was resolved for a subsystem that is not enabled on this host
    #[error(
        "{resource_type} disabled, refusing to set {resource_type} class of container {container:?} to {class:?}"
    )]
    SubsystemDisabled {
        /// Native resource type
        resource_type: String,
        /// Resolved class
        class: String,
        /// Container name
        container: String,
    },

    /// Annotation resolver failure, passed through unchanged
    #[error(transparent)]
    AnnotationResolution(BoxError),

    /// BlockIO class could not be translated into OCI resources
    #[error("BlockIO class {class:?}: {message}")]
    BlockIoTranslation {
        /// BlockIO class
        class: String,
        /// Error message
        message: String,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// OCI spec builder error
    #[error("OCI spec error: {0}")]
    Oci(#[from] oci_spec::OciSpecError),
}

impl Error {
    /// Wrap a collaborator error as an annotation resolution failure
    pub fn annotation(err: impl Into<BoxError>) -> Self {
        Self::AnnotationResolution(err.into())
    }
}

/// Result type alias for qosgate operations
pub type Result<T> = std::result::Result<T, Error>;
