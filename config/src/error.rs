//! # Configuration Errors
//!
//! Everything that can be wrong with a configuration document is reported
//! before any geometry work begins.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid JSON or a value has the wrong type or an
    /// unknown choice.
    #[error("invalid config document: {0}")]
    Parse(#[from] serde_json::Error),

    /// A required key is absent.
    #[error("{0} not specified")]
    Missing(&'static str),

    /// A value is out of range or inconsistent with other keys.
    #[error("{key} has invalid value: {message}")]
    InvalidValue { key: &'static str, message: String },
}

impl ConfigError {
    /// Creates an invalid value error.
    pub fn invalid(key: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key,
            message: message.into(),
        }
    }
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
