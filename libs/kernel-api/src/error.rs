//! # Kernel Errors
//!
//! Failures reported by a geometry kernel. The mesher never recovers from
//! them locally; they abort the run.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{DimTag, FieldTag};

/// Errors that a kernel operation can return.
#[derive(Debug, Error)]
pub enum KernelError {
    /// The referenced entity does not exist.
    #[error("unknown entity {0}")]
    InvalidEntity(DimTag),

    /// The referenced size field does not exist.
    #[error("unknown field {}", .0 .0)]
    UnknownField(FieldTag),

    /// Geometry that cannot be built (zero radius, empty shell, ...).
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// The kernel does not implement the requested operation or format.
    #[error("unsupported by kernel: {0}")]
    Unsupported(String),

    /// Mesh data handed to the kernel is inconsistent.
    #[error("mesh mismatch: {0}")]
    MeshMismatch(String),

    /// A node or element tag is already in use.
    #[error("{kind} tag {tag} already in use")]
    TagCollision { kind: &'static str, tag: u64 },

    /// Export failed.
    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl KernelError {
    /// Creates a degenerate geometry error.
    pub fn degenerate(message: impl Into<String>) -> Self {
        Self::DegenerateGeometry(message.into())
    }

    /// Creates an unsupported operation error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported(message.into())
    }

    /// Creates a mesh mismatch error.
    pub fn mismatch(message: impl Into<String>) -> Self {
        Self::MeshMismatch(message.into())
    }
}

/// Result type alias for kernel operations.
pub type KernelResult<T> = Result<T, KernelError>;
