//! # Config Crate
//!
//! Centralized configuration for the packed-bed column mesher. Holds the
//! shared constants and the strongly typed [`MesherConfig`] that replaces
//! dotted-key lookups into an untyped document.
//!
//! ## Usage
//!
//! ```rust
//! use config::{MesherConfig, MeshMethod};
//!
//! let json = r#"{
//!     "packedbed": { "packing_file": { "dataformat": "<d" } },
//!     "container": { "shape": "cylinder", "size": [5.0, 20.0] },
//!     "mesh": { "method": "copymesh" }
//! }"#;
//! let config = MesherConfig::from_json(json).unwrap();
//! assert_eq!(config.mesh.method, MeshMethod::CopyMesh);
//! assert_eq!(config.mesh.size, 0.2);
//! ```
//!
//! ## Design Principles
//!
//! - **Validated once**: type and choice checks happen when the document is
//!   loaded, never at first use
//! - **Explicit defaults**: every optional key has a documented default
//! - **Single Source of Truth**: literals live in [`constants`]

pub mod constants;
pub mod error;
pub mod schema;

pub use error::ConfigError;
pub use schema::*;
