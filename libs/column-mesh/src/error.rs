//! # Mesher Errors
//!
//! Top-level error of a meshing run. Lower layers keep their own error
//! types and are wrapped here unchanged.

use config::ConfigError;
use kernel_api::KernelError;
use packed_bed::{BedError, FormatError};
use thiserror::Error;

use crate::column::Phase;

/// Errors that abort a meshing run.
#[derive(Debug, Error)]
pub enum MesherError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Bed(#[from] BedError),

    /// The operation needs a container shape the model does not have.
    #[error("unsupported container shape: {0}")]
    UnsupportedShape(String),

    /// A valid configuration combination that is not implemented.
    #[error("unsupported configuration: {0}")]
    UnsupportedConfig(String),

    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),

    /// A column operation was called out of order.
    #[error("cannot {operation} a column in phase {actual} (expected {expected})")]
    Phase {
        operation: &'static str,
        expected: Phase,
        actual: Phase,
    },
}

impl MesherError {
    /// Creates an unsupported shape error.
    pub fn unsupported_shape(message: impl Into<String>) -> Self {
        Self::UnsupportedShape(message.into())
    }

    /// Creates an unsupported configuration error.
    pub fn unsupported_config(message: impl Into<String>) -> Self {
        Self::UnsupportedConfig(message.into())
    }
}

impl From<FormatError> for MesherError {
    fn from(err: FormatError) -> Self {
        Self::Bed(BedError::Format(err))
    }
}

/// Result type alias for mesher operations.
pub type MesherResult<T> = Result<T, MesherError>;
