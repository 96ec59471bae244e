//! # Configuration Constants
//!
//! Centralized constants for the mesher. Default values for configuration
//! keys, geometric tolerances and tessellation limits are defined here.
//!
//! ## Categories
//!
//! - **Precision**: Floating-point comparison tolerances
//! - **Defaults**: Values used when a configuration key is absent
//! - **Resolution**: Segment counts for the preview tessellator
//! - **Files**: Fixed output names

// =============================================================================
// PRECISION CONSTANTS
// =============================================================================

/// Epsilon for floating-point comparisons.
///
/// # Example
///
/// ```rust
/// use config::constants::EPSILON;
///
/// fn approximately_equal(a: f64, b: f64) -> bool {
///     (a - b).abs() < EPSILON
/// }
///
/// assert!(approximately_equal(1.0, 1.0 + 1e-11));
/// ```
pub const EPSILON: f64 = 1e-10;

/// Relative tolerance used when classifying surfaces by their bounding box.
///
/// A surface whose z-extent is below `GEOMETRY_TOLERANCE * column_height`
/// counts as planar, and a surface reaching within the same fraction of the
/// container envelope counts as touching it.
pub const GEOMETRY_TOLERANCE: f64 = 1e-6;

// =============================================================================
// DEFAULT VALUES
// =============================================================================

/// Default packing file name.
pub const DEFAULT_PACKING_FILE: &str = "packing.xyzd";

/// Default target element size.
///
/// # Example
///
/// ```rust
/// use config::constants::DEFAULT_MESH_SIZE;
///
/// let user_size: Option<f64> = None;
/// assert_eq!(user_size.unwrap_or(DEFAULT_MESH_SIZE), 0.2);
/// ```
pub const DEFAULT_MESH_SIZE: f64 = 0.2;

/// Default output mesh file name. The stem and extension are reused for the
/// per-section fragment files.
pub const DEFAULT_OUTPUT_FILE: &str = "output.vtk";

/// Default fragment format extension (without leading dot).
pub const DEFAULT_FRAGMENT_FORMAT: &str = "vtk";

/// Default 2D meshing algorithm code (Delaunay).
pub const DEFAULT_ALGORITHM_2D: i32 = 5;

/// Default 3D meshing algorithm code (HXT).
pub const DEFAULT_ALGORITHM_3D: i32 = 10;

/// Default topological dimension of the reference mesh in copy-mesh mode.
pub const DEFAULT_COPYMESH_REF_DIM: u8 = 3;

/// Default dimension up to which the final mesh is generated.
pub const DEFAULT_GENERATE_DIM: u8 = 3;

// =============================================================================
// RESOLUTION CONSTANTS
// =============================================================================

/// Minimum number of segments for any circular shape.
///
/// # Example
///
/// ```rust
/// use config::constants::MIN_SEGMENTS;
///
/// let computed = 2;
/// assert_eq!(computed.max(MIN_SEGMENTS), MIN_SEGMENTS);
/// ```
pub const MIN_SEGMENTS: u32 = 8;

/// Maximum number of segments for any circular shape.
///
/// Safety limit to prevent excessive tessellation of tiny mesh sizes.
pub const MAX_SEGMENTS: u32 = 512;

// =============================================================================
// FILE CONSTANTS
// =============================================================================

/// Name of the dump of the beads that survived selection.
pub const BEADS_USED_FILE: &str = "beads_used.xyzd";

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Computes the number of segments for a circle of `radius` meshed at a
/// target edge length of `size`.
///
/// `ceil(2 * PI * r / size)` clamped to `MIN_SEGMENTS..=MAX_SEGMENTS`.
///
/// # Example
///
/// ```rust
/// use config::constants::{compute_segments, MIN_SEGMENTS, MAX_SEGMENTS};
///
/// assert_eq!(compute_segments(1.0, 10.0), MIN_SEGMENTS);
/// assert_eq!(compute_segments(1.0, 1e-6), MAX_SEGMENTS);
/// assert_eq!(compute_segments(1.0, 0.1), 63);
/// ```
pub fn compute_segments(radius: f64, size: f64) -> u32 {
    if size <= 0.0 || radius <= 0.0 {
        return MIN_SEGMENTS;
    }
    let from_size = (2.0 * std::f64::consts::PI * radius) / size;
    let segments = from_size.ceil().min(MAX_SEGMENTS as f64) as u32;
    segments.clamp(MIN_SEGMENTS, MAX_SEGMENTS)
}

/// Checks if two f64 values are equal within `tolerance`.
///
/// # Example
///
/// ```rust
/// use config::constants::approx_equal;
///
/// assert!(approx_equal(1.0, 1.0 + 1e-11, 1e-10));
/// assert!(!approx_equal(1.0, 1.1, 1e-10));
/// ```
#[inline]
pub fn approx_equal(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}
