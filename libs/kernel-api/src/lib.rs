//! # Kernel API
//!
//! The narrow contract through which the mesher drives a geometry/meshing
//! kernel. The core never builds triangulations itself: it decides which
//! primitives to create, how to fuse them, and how to reuse an existing
//! discretization, then asks the kernel to do the work.
//!
//! ## Architecture
//!
//! ```text
//! packed-bed / column-mesh ──► GeometryKernel ──► (gmsh, preview-kernel, ...)
//!                 │
//!                 └──► MeshTemplate::capture / stamp (tag-offset copy)
//! ```

pub mod copy;
pub mod error;
pub mod kernel;
pub mod types;

pub use copy::{MeshTemplate, TagOffsets};
pub use error::{KernelError, KernelResult};
pub use kernel::GeometryKernel;
pub use types::*;
