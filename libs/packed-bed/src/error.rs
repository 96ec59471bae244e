//! # Packed Bed Errors

use std::path::PathBuf;

use config::ConfigError;
use kernel_api::KernelError;
use thiserror::Error;

/// Malformed packing stream.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The byte count is not a whole number of records.
    #[error("packing stream of {len} bytes is not a multiple of the {record_width}-byte record")]
    Truncated { len: usize, record_width: usize },

    #[error("cannot access packing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while building or using a packed bed.
#[derive(Debug, Error)]
pub enum BedError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Bounds were requested on a bed without beads.
    #[error("packed bed is empty")]
    EmptyBed,

    /// A bead violates `r > 0`.
    #[error("bead {index} has non-positive radius {radius}")]
    InvalidBead { index: usize, radius: f64 },

    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),
}

/// Result type alias for packed bed operations.
pub type BedResult<T> = Result<T, BedError>;
