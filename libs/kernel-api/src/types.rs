//! # Kernel Types
//!
//! Identifiers and plain data exchanged with a geometry kernel.

use std::fmt;

use glam::DVec3;

/// Global node identifier.
pub type NodeTag = u64;

/// Global element identifier.
pub type ElementTag = u64;

// =============================================================================
// ENTITIES
// =============================================================================

/// A model entity: topological dimension plus kernel tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DimTag {
    pub dim: u8,
    pub tag: i32,
}

impl DimTag {
    pub const fn new(dim: u8, tag: i32) -> Self {
        Self { dim, tag }
    }

    pub const fn point(tag: i32) -> Self {
        Self::new(0, tag)
    }

    pub const fn surface(tag: i32) -> Self {
        Self::new(2, tag)
    }

    pub const fn volume(tag: i32) -> Self {
        Self::new(3, tag)
    }
}

impl fmt::Display for DimTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.dim, self.tag)
    }
}

/// Handle of a mesh size field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldTag(pub i32);

/// Threshold field: maps the distance reported by `input` to an element size.
///
/// Below `dist_min` the size is `size_min`, above `dist_max` it is `size_max`,
/// linear in between.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    pub input: FieldTag,
    pub size_min: f64,
    pub size_max: f64,
    pub dist_min: f64,
    pub dist_max: f64,
}

impl Threshold {
    /// Evaluates the threshold for a distance.
    ///
    /// # Example
    ///
    /// ```rust
    /// use kernel_api::{FieldTag, Threshold};
    ///
    /// let t = Threshold {
    ///     input: FieldTag(1),
    ///     size_min: 0.1,
    ///     size_max: 0.5,
    ///     dist_min: 1.0,
    ///     dist_max: 3.0,
    /// };
    /// assert_eq!(t.size_at(0.0), 0.1);
    /// assert!((t.size_at(2.0) - 0.3).abs() < 1e-12);
    /// assert_eq!(t.size_at(9.0), 0.5);
    /// ```
    pub fn size_at(&self, distance: f64) -> f64 {
        if distance <= self.dist_min {
            return self.size_min;
        }
        if distance >= self.dist_max {
            return self.size_max;
        }
        let t = (distance - self.dist_min) / (self.dist_max - self.dist_min);
        self.size_min + t * (self.size_max - self.size_min)
    }
}

// =============================================================================
// BOUNDING BOX
// =============================================================================

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: DVec3,
    pub max: DVec3,
}

impl Aabb {
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Box of a sphere.
    pub fn around_sphere(center: DVec3, radius: f64) -> Self {
        Self::new(center - DVec3::splat(radius), center + DVec3::splat(radius))
    }

    /// Smallest box containing all points; `None` for an empty slice.
    pub fn from_points(points: &[DVec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        Some(rest.iter().fold(Self::new(*first, *first), |acc, p| {
            Self::new(acc.min.min(*p), acc.max.max(*p))
        }))
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &Self) -> Self {
        Self::new(self.min.min(other.min), self.max.max(other.max))
    }

    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    pub fn extent(&self) -> DVec3 {
        self.max - self.min
    }

    /// True if `other` lies inside this box, widened by `tolerance`.
    pub fn contains(&self, other: &Self, tolerance: f64) -> bool {
        let tol = DVec3::splat(tolerance);
        (other.min + tol).cmpge(self.min).all() && (other.max - tol).cmple(self.max).all()
    }

    /// True if the box straddles the horizontal plane `z`.
    pub fn straddles_z(&self, z: f64) -> bool {
        self.min.z < z && self.max.z > z
    }

    pub fn translated(&self, offset: DVec3) -> Self {
        Self::new(self.min + offset, self.max + offset)
    }
}

// =============================================================================
// MESH DATA
// =============================================================================

/// Element kinds exchanged with the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Point,
    Line,
    Triangle,
    Tetrahedron,
}

impl ElementType {
    /// Number of nodes per element.
    pub fn node_count(self) -> usize {
        match self {
            Self::Point => 1,
            Self::Line => 2,
            Self::Triangle => 3,
            Self::Tetrahedron => 4,
        }
    }

    /// Topological dimension of the element.
    pub fn dim(self) -> u8 {
        match self {
            Self::Point => 0,
            Self::Line => 1,
            Self::Triangle => 2,
            Self::Tetrahedron => 3,
        }
    }
}

/// Nodes owned by one entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeBlock {
    pub tags: Vec<NodeTag>,
    pub coords: Vec<DVec3>,
}

impl NodeBlock {
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// Elements of a single type owned by one entity.
///
/// `nodes` holds `node_count()` node tags per element, flattened.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementBlock {
    pub element_type: ElementType,
    pub tags: Vec<ElementTag>,
    pub nodes: Vec<NodeTag>,
}

impl ElementBlock {
    pub fn new(element_type: ElementType) -> Self {
        Self {
            element_type,
            tags: Vec::new(),
            nodes: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Node tags of element `index`.
    pub fn element_nodes(&self, index: usize) -> &[NodeTag] {
        let n = self.element_type.node_count();
        &self.nodes[index * n..(index + 1) * n]
    }

    /// Checks that the connectivity length matches the element count.
    pub fn is_consistent(&self) -> bool {
        self.nodes.len() == self.tags.len() * self.element_type.node_count()
    }
}
