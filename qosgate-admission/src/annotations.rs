//! Annotation fallback channel for native resource types
//!
//! Pods and containers can still request RDT and BlockIO classes through
//! legacy annotations. Each native subsystem owns the parsing of its own
//! annotations; the admission path only calls into the [`AnnotationResolver`]
//! when the structured resource map has no entry for the type.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;
use tracing::trace;

use qosgate_core::{AnnotationSet, Error, NativeResource, Result};

/// Resolves a container's class from pod and container annotations
///
/// # Thread Safety
/// Implementations are shared by concurrent admission requests and must be
/// `Send + Sync`.
pub trait AnnotationResolver: Send + Sync {
    /// Class requested through annotations, `None` if nothing was requested
    ///
    /// # Errors
    /// Returns error if the annotations request a class the subsystem
    /// cannot provide. The error is propagated to the caller unchanged.
    fn container_class(
        &self,
        container: &str,
        container_annotations: &AnnotationSet,
        sandbox_annotations: &AnnotationSet,
    ) -> Result<Option<String>>;
}

/// Failures of the Kubernetes annotation parsers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnnotationError {
    /// The annotated class is not configured for the subsystem
    #[error("{subsystem} class {class:?} does not exist in configuration")]
    UnknownClass {
        /// Native subsystem
        subsystem: NativeResource,
        /// Annotated class
        class: String,
    },
}

/// Well-known Kubernetes annotation scheme for a native subsystem
///
/// Lookup order:
/// 1. container annotation `<domain>/container`
/// 2. pod annotation `<domain>/container.<container name>`
/// 3. pod annotation `<domain>/pod`
#[derive(Debug, Clone)]
pub struct KubernetesAnnotations {
    subsystem: NativeResource,
    container_key: String,
    pod_key: String,
    classes: Vec<String>,
}

impl KubernetesAnnotations {
    /// Annotation domain of RDT classes
    pub const RDT_DOMAIN: &'static str = "rdt.resources.beta.kubernetes.io";

    /// Annotation domain of BlockIO classes
    pub const BLOCKIO_DOMAIN: &'static str = "blockio.resources.beta.kubernetes.io";

    /// Resolver for `subsystem` accepting the given classes
    #[must_use]
    pub fn new<I, S>(subsystem: NativeResource, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let domain = match subsystem {
            NativeResource::Rdt => Self::RDT_DOMAIN,
            NativeResource::BlockIo => Self::BLOCKIO_DOMAIN,
        };

        Self {
            subsystem,
            container_key: format!("{domain}/container"),
            pod_key: format!("{domain}/pod"),
            classes: classes.into_iter().map(Into::into).collect(),
        }
    }

    /// Container annotation key
    #[must_use]
    pub fn container_key(&self) -> &str {
        &self.container_key
    }

    /// Pod-wide default annotation key
    #[must_use]
    pub fn pod_key(&self) -> &str {
        &self.pod_key
    }

    /// Pod annotation key addressing one container
    #[must_use]
    pub fn pod_container_key(&self, container: &str) -> String {
        format!("{}.{container}", self.container_key)
    }

    fn lookup<'a>(
        &self,
        container: &str,
        container_annotations: &'a AnnotationSet,
        sandbox_annotations: &'a AnnotationSet,
    ) -> Option<&'a String> {
        container_annotations
            .get(&self.container_key)
            .or_else(|| sandbox_annotations.get(&self.pod_container_key(container)))
            .or_else(|| sandbox_annotations.get(&self.pod_key))
    }
}

impl AnnotationResolver for KubernetesAnnotations {
    fn container_class(
        &self,
        container: &str,
        container_annotations: &AnnotationSet,
        sandbox_annotations: &AnnotationSet,
    ) -> Result<Option<String>> {
        let Some(class) = self.lookup(container, container_annotations, sandbox_annotations)
        else {
            return Ok(None);
        };

        if class.is_empty() {
            return Ok(None);
        }

        if !self.classes.iter().any(|c| c == class) {
            return Err(Error::annotation(AnnotationError::UnknownClass {
                subsystem: self.subsystem,
                class: class.clone(),
            }));
        }

        trace!(
            subsystem = %self.subsystem,
            container,
            class = class.as_str(),
            "Class found in annotations"
        );

        Ok(Some(class.clone()))
    }
}

#[derive(Debug, Clone)]
enum MockAnswer {
    Class(Option<String>),
    Fail(String),
}

/// Mock resolver for testing (returns a fixed answer)
///
/// # Example
/// ```
/// use qosgate_admission::{AnnotationResolver, MockAnnotationResolver};
/// use qosgate_core::AnnotationSet;
///
/// let resolver = MockAnnotationResolver::class("silver");
/// let none = AnnotationSet::new();
///
/// let class = resolver.container_class("web", &none, &none).unwrap();
/// assert_eq!(class.as_deref(), Some("silver"));
/// assert_eq!(resolver.call_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockAnnotationResolver {
    answer: MockAnswer,
    calls: Arc<AtomicUsize>,
}

impl MockAnnotationResolver {
    /// Resolver that always answers with `class`
    #[must_use]
    pub fn class(class: impl Into<String>) -> Self {
        Self::with_answer(MockAnswer::Class(Some(class.into())))
    }

    /// Resolver that never finds a class
    #[must_use]
    pub fn none() -> Self {
        Self::with_answer(MockAnswer::Class(None))
    }

    /// Resolver that always fails with `message`
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_answer(MockAnswer::Fail(message.into()))
    }

    fn with_answer(answer: MockAnswer) -> Self {
        Self {
            answer,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of resolver calls made (for testing)
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockAnnotationResolver {
    fn default() -> Self {
        Self::none()
    }
}

impl AnnotationResolver for MockAnnotationResolver {
    fn container_class(
        &self,
        container: &str,
        _container_annotations: &AnnotationSet,
        _sandbox_annotations: &AnnotationSet,
    ) -> Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(container, "Mock: Resolve class from annotations");

        match &self.answer {
            MockAnswer::Class(class) => Ok(class.clone()),
            MockAnswer::Fail(message) => Err(Error::annotation(message.clone())),
        }
    }
}
