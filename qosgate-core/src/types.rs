//! Core type definitions for QoS resource types and resolved classes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Resource type name of the cache/memory-bandwidth partitioning family
pub const RDT: &str = "rdt";

/// Resource type name of the block-I/O scheduling family
pub const BLOCKIO: &str = "blockio";

/// Resource families the runtime resolves natively
///
/// Native types accept a class from the structured resource map and fall
/// back to pod/container annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NativeResource {
    /// Intel RDT class of service
    Rdt,
    /// Block-I/O class
    BlockIo,
}

impl NativeResource {
    /// All native resource types, in reporting order
    pub const ALL: [Self; 2] = [Self::Rdt, Self::BlockIo];

    /// Resource type name as used in resource maps
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Rdt => RDT,
            Self::BlockIo => BLOCKIO,
        }
    }

    /// Look up a native resource type by name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|n| n.name() == name)
    }
}

impl fmt::Display for NativeResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NativeResource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s).ok_or_else(|| Error::UnknownResourceType {
            resource_type: s.to_string(),
        })
    }
}

/// Scope a resource map or catalog family applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceScope {
    /// Pod sandbox level
    Pod,
    /// Container level
    Container,
}

impl fmt::Display for ResourceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pod => f.write_str("pod"),
            Self::Container => f.write_str("container"),
        }
    }
}

/// Channel a resolved class came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassSource {
    /// Structured QoS resource map of the request
    Structured,
    /// Legacy pod/container annotations
    Annotation,
}

impl fmt::Display for ClassSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structured => f.write_str("container config"),
            Self::Annotation => f.write_str("annotations"),
        }
    }
}

/// Effective class of one native resource type for one container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAssignment {
    /// Native resource type
    pub resource: NativeResource,
    /// Resolved class; `None` when nothing was requested
    pub class: Option<String>,
    /// Channel the class was taken from
    pub source: ClassSource,
}

impl ResolvedAssignment {
    /// Resolved class name, if any
    #[must_use]
    pub fn class(&self) -> Option<&str> {
        self.class.as_deref()
    }
}
