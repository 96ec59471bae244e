//! # Model Entities
//!
//! Entities of the preview model: an analytic shape (or none for discrete
//! entities), a boundary one dimension lower, and the mesh the entity owns.

use glam::DVec3;
use kernel_api::{Aabb, DimTag, ElementBlock, NodeBlock};

use crate::tessellate::{self, Patch};

/// Geometry behind an entity.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Point { position: DVec3 },
    Sphere { center: DVec3, radius: f64 },
    Box { min: DVec3, extent: DVec3 },
    Cylinder { base: DVec3, height: f64, radius: f64 },
    SphereSurface { center: DVec3, radius: f64 },
    CylinderWall { base: DVec3, height: f64, radius: f64 },
    Annulus { center: DVec3, inner: f64, outer: f64 },
    /// Planar parallelogram `origin + s·u + t·v`.
    Quad { origin: DVec3, u: DVec3, v: DVec3 },
    /// Volume enclosed by `outer` (its holes are the rest of the boundary).
    Enclosed { outer: Vec<DimTag> },
    /// No geometry; the mesh is supplied from outside.
    Discrete,
}

impl Shape {
    /// Exact bounds of analytic shapes.
    pub fn bounds(&self) -> Option<Aabb> {
        match *self {
            Self::Point { position } => Some(Aabb::new(position, position)),
            Self::Sphere { center, radius } | Self::SphereSurface { center, radius } => {
                Some(Aabb::around_sphere(center, radius))
            }
            Self::Box { min, extent } => Some(Aabb::new(min, min + extent)),
            Self::Cylinder {
                base,
                height,
                radius,
            }
            | Self::CylinderWall {
                base,
                height,
                radius,
            } => Some(Aabb::new(
                base - DVec3::new(radius, radius, 0.0),
                base + DVec3::new(radius, radius, height),
            )),
            Self::Annulus { center, outer, .. } => Some(Aabb::new(
                center - DVec3::new(outer, outer, 0.0),
                center + DVec3::new(outer, outer, 0.0),
            )),
            Self::Quad { origin, u, v } => {
                Aabb::from_points(&[origin, origin + u, origin + v, origin + u + v])
            }
            Self::Enclosed { .. } | Self::Discrete => None,
        }
    }

    /// A point on the surface where the size field is sampled.
    pub fn sample_point(&self) -> Option<DVec3> {
        match *self {
            Self::SphereSurface { center, radius } => Some(center + DVec3::new(0.0, 0.0, radius)),
            Self::CylinderWall { base, height, radius } => {
                Some(base + DVec3::new(radius, 0.0, height / 2.0))
            }
            Self::Annulus { center, inner, outer } => {
                Some(center + DVec3::new((inner + outer) / 2.0, 0.0, 0.0))
            }
            Self::Quad { origin, u, v } => Some(origin + (u + v) * 0.5),
            _ => None,
        }
    }

    /// Triangulates a surface shape at the target element size; `None` for
    /// shapes that are not surfaces.
    pub fn tessellate(&self, size: f64) -> Option<Patch> {
        use config::constants::compute_segments;

        match *self {
            Self::SphereSurface { center, radius } => {
                Some(tessellate::sphere(center, radius, compute_segments(radius, size)))
            }
            Self::CylinderWall { base, height, radius } => Some(tessellate::cylinder_wall(
                base,
                height,
                radius,
                compute_segments(radius, size),
                tessellate::divisions(height, size),
            )),
            Self::Annulus { center, inner, outer } => Some(tessellate::annulus(
                center,
                inner,
                outer,
                compute_segments(outer, size),
                tessellate::divisions(outer - inner, size),
            )),
            Self::Quad { origin, u, v } => Some(tessellate::quad(
                origin,
                u,
                v,
                tessellate::divisions(u.length(), size),
                tessellate::divisions(v.length(), size),
            )),
            _ => None,
        }
    }

    /// Splits a +z solid by the plane `z`; `None` when the shape cannot be
    /// split exactly.
    pub fn split_z(&self, z: f64) -> Option<(Shape, Shape)> {
        match *self {
            Self::Box { min, extent } => {
                let lower = z - min.z;
                Some((
                    Self::Box {
                        min,
                        extent: DVec3::new(extent.x, extent.y, lower),
                    },
                    Self::Box {
                        min: DVec3::new(min.x, min.y, z),
                        extent: DVec3::new(extent.x, extent.y, extent.z - lower),
                    },
                ))
            }
            Self::Cylinder { base, height, radius } => {
                let lower = z - base.z;
                Some((
                    Self::Cylinder {
                        base,
                        height: lower,
                        radius,
                    },
                    Self::Cylinder {
                        base: DVec3::new(base.x, base.y, z),
                        height: height - lower,
                        radius,
                    },
                ))
            }
            _ => None,
        }
    }
}

/// One model entity.
#[derive(Debug, Clone)]
pub struct Entity {
    pub shape: Shape,
    pub boundary: Vec<DimTag>,
    /// Size prescribed with `set_mesh_size`.
    pub mesh_size: Option<f64>,
    pub nodes: NodeBlock,
    pub elements: Vec<ElementBlock>,
}

impl Entity {
    pub fn new(shape: Shape, boundary: Vec<DimTag>) -> Self {
        Self {
            shape,
            boundary,
            mesh_size: None,
            nodes: NodeBlock::default(),
            elements: Vec::new(),
        }
    }

    /// True once the entity owns at least one element.
    pub fn is_meshed(&self) -> bool {
        self.elements.iter().any(|b| !b.is_empty())
    }
}
