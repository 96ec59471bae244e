//! # Geometry Kernel Contract
//!
//! Operations the mesher needs from a geometry/meshing kernel. Implementations
//! must be deterministic for identical call sequences: entity tags, node tags
//! and element tags may only depend on the order of calls.
//!
//! Solids (`add_sphere`, `add_box`, `add_cylinder`) are volumes whose bounding
//! surfaces are reachable through [`GeometryKernel::boundary`]. Cylinders are
//! always aligned with +z.

use std::path::Path;

use config::KernelOptions;
use glam::DVec3;

use crate::error::KernelResult;
use crate::types::{Aabb, DimTag, ElementBlock, ElementTag, FieldTag, NodeBlock, NodeTag, Threshold};

/// A geometry and meshing kernel.
pub trait GeometryKernel {
    /// Applies global options (algorithms, worker count, default size).
    fn configure(&mut self, options: &KernelOptions) -> KernelResult<()>;

    // -------------------------------------------------------------------------
    // Primitives
    // -------------------------------------------------------------------------

    /// Adds a geometric point carrying a characteristic mesh size.
    fn add_point(&mut self, position: DVec3, mesh_size: f64) -> KernelResult<DimTag>;

    /// Adds a solid sphere.
    fn add_sphere(&mut self, center: DVec3, radius: f64) -> KernelResult<DimTag>;

    /// Adds a solid box spanning `min..min + extent`.
    fn add_box(&mut self, min: DVec3, extent: DVec3) -> KernelResult<DimTag>;

    /// Adds a solid cylinder with its base disk centered at `base`.
    fn add_cylinder(&mut self, base: DVec3, height: f64, radius: f64) -> KernelResult<DimTag>;

    /// Adds a planar ring (a disk when `inner == 0`) in the plane `z = center.z`.
    fn add_annulus(&mut self, center: DVec3, inner: f64, outer: f64) -> KernelResult<DimTag>;

    /// Adds the lateral surface of a cylinder.
    fn add_cylinder_wall(&mut self, base: DVec3, height: f64, radius: f64) -> KernelResult<DimTag>;

    /// Adds an entity without geometry whose mesh is supplied via
    /// [`add_nodes`](Self::add_nodes) / [`add_elements`](Self::add_elements).
    fn add_discrete_entity(&mut self, dim: u8, boundary: &[DimTag]) -> KernelResult<DimTag>;

    /// Adds a volume bounded by `shell` with cavities bounded by each of `holes`.
    fn add_volume(&mut self, shell: &[DimTag], holes: &[Vec<DimTag>]) -> KernelResult<DimTag>;

    /// Removes entities; `recursive` also removes their unused boundaries.
    fn remove(&mut self, entities: &[DimTag], recursive: bool) -> KernelResult<()>;

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// All entities of a dimension, ordered by tag.
    fn entities(&self, dim: u8) -> Vec<DimTag>;

    /// Entities one dimension lower bounding `entity`.
    fn boundary(&self, entity: DimTag) -> KernelResult<Vec<DimTag>>;

    fn bounding_box(&self, entity: DimTag) -> KernelResult<Aabb>;

    // -------------------------------------------------------------------------
    // Booleans
    // -------------------------------------------------------------------------

    /// Fragments objects and tools into a conformal set of entities sharing
    /// their common boundaries. Returns the resulting highest-dimension entities.
    fn fragment(&mut self, objects: &[DimTag], tools: &[DimTag]) -> KernelResult<Vec<DimTag>>;

    /// Subtracts tools from objects; tools are consumed.
    fn cut(&mut self, objects: &[DimTag], tools: &[DimTag]) -> KernelResult<Vec<DimTag>>;

    /// Splits objects by the horizontal plane `z`.
    fn slice(&mut self, objects: &[DimTag], z: f64) -> KernelResult<Vec<DimTag>>;

    // -------------------------------------------------------------------------
    // Mesh sizing
    // -------------------------------------------------------------------------

    /// Distance field measuring the distance to the given point entities.
    fn add_distance_field(&mut self, points: &[DimTag]) -> KernelResult<FieldTag>;

    fn add_threshold_field(&mut self, threshold: &Threshold) -> KernelResult<FieldTag>;

    /// Pointwise minimum of several fields.
    fn add_min_field(&mut self, fields: &[FieldTag]) -> KernelResult<FieldTag>;

    fn set_background_field(&mut self, field: FieldTag) -> KernelResult<()>;

    /// Prescribes a mesh size on entities (points of their closure).
    fn set_mesh_size(&mut self, entities: &[DimTag], size: f64) -> KernelResult<()>;

    // -------------------------------------------------------------------------
    // Meshing
    // -------------------------------------------------------------------------

    /// Highest dimension [`generate_mesh`](Self::generate_mesh) can mesh
    /// from geometry. Entities above it can only carry copied meshes.
    fn max_mesh_dim(&self) -> u8;

    /// Meshes every entity up to `dim`. Entities that already carry a mesh are
    /// left untouched.
    fn generate_mesh(&mut self, dim: u8) -> KernelResult<()>;

    /// Nodes owned by `entity`, plus those of its boundary closure when
    /// `include_boundary` is set.
    fn nodes(&self, entity: DimTag, include_boundary: bool) -> KernelResult<NodeBlock>;

    /// Elements owned by `entity`, one block per element type.
    fn elements(&self, entity: DimTag) -> KernelResult<Vec<ElementBlock>>;

    /// Adds nodes with caller-chosen tags to an entity.
    fn add_nodes(&mut self, entity: DimTag, nodes: &NodeBlock) -> KernelResult<()>;

    /// Adds elements with caller-chosen tags to an entity.
    fn add_elements(&mut self, entity: DimTag, block: &ElementBlock) -> KernelResult<()>;

    /// Largest node tag in use (0 when the model has no nodes).
    fn max_node_tag(&self) -> NodeTag;

    /// Largest element tag in use (0 when the model has no elements).
    fn max_element_tag(&self) -> ElementTag;

    // -------------------------------------------------------------------------
    // Tagging and export
    // -------------------------------------------------------------------------

    /// Constrains `slaves` to carry the mesh of `masters` shifted by `translation`.
    fn set_periodic(
        &mut self,
        slaves: &[DimTag],
        masters: &[DimTag],
        translation: DVec3,
    ) -> KernelResult<()>;

    /// Groups entities of one dimension under a name; returns the group tag.
    fn add_physical_group(&mut self, dim: u8, tags: &[i32], name: &str) -> KernelResult<i32>;

    fn clear_physical_groups(&mut self);

    /// Writes the mesh to `path`, format chosen by extension. When physical
    /// groups exist only their elements are written.
    fn write(&mut self, path: &Path) -> KernelResult<()>;
}
