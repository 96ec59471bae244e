//! # Preview Kernel
//!
//! A self-contained [`GeometryKernel`](kernel_api::GeometryKernel) for
//! previews and tests. It builds analytic primitives, tessellates their
//! surfaces, evaluates size fields, accepts copied meshes, and exports VTK or
//! STL files.
//!
//! ## Limits
//!
//! - Booleans are non-conformal bookkeeping (logged with `warn!`).
//! - Volumes are not meshed: `generate_mesh(3)` fails with
//!   [`KernelError::Unsupported`](kernel_api::KernelError::Unsupported)
//!   unless every volume already carries a copied mesh.
//!
//! ## Example
//!
//! ```rust
//! use glam::DVec3;
//! use kernel_api::GeometryKernel;
//! use preview_kernel::PreviewKernel;
//!
//! let mut kernel = PreviewKernel::new();
//! let sphere = kernel.add_sphere(DVec3::ZERO, 1.0).unwrap();
//! let surfaces = kernel.boundary(sphere).unwrap();
//! kernel.generate_mesh(2).unwrap();
//! assert!(!kernel.elements(surfaces[0]).unwrap().is_empty());
//! ```

pub mod entity;
pub mod export;
pub mod field;
pub mod kernel;
pub mod tessellate;

pub use entity::Shape;
pub use field::Field;
pub use kernel::{PeriodicLink, PhysicalGroup, PreviewKernel};
