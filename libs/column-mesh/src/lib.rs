//! # Column Mesh
//!
//! Assembles a packed bed and its container into a tagged column and drives
//! the kernel through meshing and export.
//!
//! ## Architecture
//!
//! ```text
//! MesherConfig ─► Model ─┬─ GenericModel ──┐
//!                        └─ CopyMeshModel ─┤
//!                                          ▼
//!            PackedBed + Container ─► Column (phase machine) ─► files
//!                                          │
//!                                   GeometryKernel
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use column_mesh::build_model;
//! use config::MesherConfig;
//! use preview_kernel::PreviewKernel;
//!
//! let config = MesherConfig::load("column.json")?;
//! let written = build_model(&config, &mut PreviewKernel::new())?;
//! ```

pub mod column;
pub mod container;
pub mod copymesh;
pub mod error;
pub mod generic;
pub mod model;

pub use column::{Column, FusionMode, Phase, SurfaceRole, TaggedSurface, VolumeRole};
pub use container::{Body, Container};
pub use copymesh::CopyMeshModel;
pub use error::{MesherError, MesherResult};
pub use generic::GenericModel;
pub use model::{build_model, Model};
