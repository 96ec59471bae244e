//! # Container
//!
//! The vessel the bed sits in. The body is centered on the z axis and spans
//! `z ∈ [0, height]`; optional inlet and outlet extensions continue the same
//! cross-section below and above it:
//!
//! ```text
//!   z = height + outlet_length ┌──────┐
//!                              │outlet│
//!   z = height                 ├──────┤
//!                              │ body │
//!   z = 0                      ├──────┤
//!                              │inlet │
//!   z = -inlet_length          └──────┘
//! ```

use config::constants::GEOMETRY_TOLERANCE;
use config::{ConfigError, ContainerConfig, ContainerShape, Periodicity, StackMethod};
use glam::DVec3;
use kernel_api::{Aabb, DimTag, GeometryKernel, KernelResult, MeshTemplate, TagOffsets};
use tracing::{debug, info, warn};

use crate::column::VolumeRole;
use crate::error::{MesherError, MesherResult};

// =============================================================================
// BODY
// =============================================================================

/// Cross-section and height of the container body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Body {
    /// Box with edge lengths `extent`.
    Box { extent: DVec3 },
    Cylinder { radius: f64, height: f64 },
}

impl Body {
    pub fn height(&self) -> f64 {
        match self {
            Self::Box { extent } => extent.z,
            Self::Cylinder { height, .. } => *height,
        }
    }

    /// Half widths of the cross-section in x and y.
    fn half_widths(&self) -> (f64, f64) {
        match self {
            Self::Box { extent } => (extent.x / 2.0, extent.y / 2.0),
            Self::Cylinder { radius, .. } => (*radius, *radius),
        }
    }

    /// Envelope of a slab of this cross-section between `z0` and `z1`.
    fn slab(&self, z0: f64, z1: f64) -> Aabb {
        let (hx, hy) = self.half_widths();
        Aabb::new(DVec3::new(-hx, -hy, z0), DVec3::new(hx, hy, z1))
    }

    /// Adds a solid of this cross-section from `z0` with the given length.
    fn solid<K: GeometryKernel + ?Sized>(
        &self,
        kernel: &mut K,
        z0: f64,
        length: f64,
    ) -> KernelResult<DimTag> {
        match self {
            Self::Box { extent } => kernel.add_box(
                DVec3::new(-extent.x / 2.0, -extent.y / 2.0, z0),
                DVec3::new(extent.x, extent.y, length),
            ),
            Self::Cylinder { radius, .. } => {
                kernel.add_cylinder(DVec3::new(0.0, 0.0, z0), length, *radius)
            }
        }
    }
}

// =============================================================================
// CONTAINER
// =============================================================================

/// Container parameters plus the kernel handles of whatever was built.
#[derive(Debug, Clone)]
pub struct Container {
    body: Option<Body>,
    periodicity: Periodicity,
    linked: bool,
    stack_method: StackMethod,
    inlet_length: f64,
    outlet_length: f64,
    end_face_sections: u32,
    volumes: Vec<(DimTag, VolumeRole)>,
    shell: Vec<DimTag>,
}

impl Container {
    /// Builds a container from its configuration section.
    ///
    /// # Example
    ///
    /// ```rust
    /// use column_mesh::Container;
    /// use config::{ContainerConfig, ContainerShape};
    ///
    /// let cfg = ContainerConfig {
    ///     shape: ContainerShape::Cylinder,
    ///     size: vec![2.0, 10.0],
    ///     ..Default::default()
    /// };
    /// let container = Container::new(&cfg).unwrap();
    /// assert_eq!(container.height(), Some(10.0));
    /// assert_eq!(container.bounds().unwrap().min.x, -2.0);
    /// ```
    pub fn new(cfg: &ContainerConfig) -> MesherResult<Self> {
        let expected = cfg.shape.size_len();
        if cfg.shape != ContainerShape::None && cfg.size.len() != expected {
            return Err(ConfigError::invalid(
                "container.size",
                format!("{} needs {expected} values, got {}", cfg.shape, cfg.size.len()),
            )
            .into());
        }
        if let Some(v) = cfg.size.iter().find(|v| !(**v > 0.0)) {
            return Err(ConfigError::invalid(
                "container.size",
                format!("all entries must be positive, got {v}"),
            )
            .into());
        }
        if !(cfg.inlet_length >= 0.0 && cfg.outlet_length >= 0.0) {
            return Err(ConfigError::invalid(
                "container.inlet_length",
                "extension lengths must be >= 0",
            )
            .into());
        }

        let body = match cfg.shape {
            ContainerShape::Box => Some(Body::Box {
                extent: DVec3::new(cfg.size[0], cfg.size[1], cfg.size[2]),
            }),
            ContainerShape::Cylinder => Some(Body::Cylinder {
                radius: cfg.size[0],
                height: cfg.size[1],
            }),
            ContainerShape::None => None,
        };

        Ok(Self {
            body,
            periodicity: cfg.periodicity,
            linked: cfg.linked,
            stack_method: cfg.stack_method,
            inlet_length: cfg.inlet_length,
            outlet_length: cfg.outlet_length,
            end_face_sections: cfg.end_face_sections.max(1),
            volumes: Vec::new(),
            shell: Vec::new(),
        })
    }

    // =========================================================================
    // PARAMETERS
    // =========================================================================

    pub fn body(&self) -> Option<Body> {
        self.body
    }

    pub fn shape(&self) -> ContainerShape {
        match self.body {
            Some(Body::Box { .. }) => ContainerShape::Box,
            Some(Body::Cylinder { .. }) => ContainerShape::Cylinder,
            None => ContainerShape::None,
        }
    }

    pub fn height(&self) -> Option<f64> {
        self.body.map(|b| b.height())
    }

    pub fn periodicity(&self) -> Periodicity {
        self.periodicity
    }

    /// Whether sections are exported to separate files.
    pub fn linked(&self) -> bool {
        self.linked
    }

    pub fn stack_method(&self) -> StackMethod {
        self.stack_method
    }

    pub fn end_face_sections(&self) -> u32 {
        self.end_face_sections
    }

    /// Envelope of the body; `None` without a container.
    pub fn bounds(&self) -> Option<Aabb> {
        self.body.map(|b| b.slab(0.0, b.height()))
    }

    /// Envelope of body and extensions together.
    pub fn column_bounds(&self) -> Option<Aabb> {
        self.body
            .map(|b| b.slab(-self.inlet_length, b.height() + self.outlet_length))
    }

    /// z-range of a section, `None` when the section does not exist.
    pub fn section_range(&self, role: VolumeRole) -> Option<(f64, f64)> {
        let height = self.height()?;
        match role {
            VolumeRole::Inlet => (self.inlet_length > 0.0).then_some((-self.inlet_length, 0.0)),
            VolumeRole::Bed => Some((0.0, height)),
            VolumeRole::Outlet => {
                (self.outlet_length > 0.0).then_some((height, height + self.outlet_length))
            }
        }
    }

    /// Section containing height `z`; points on a section plane belong to
    /// the body.
    pub fn role_at(&self, z: f64) -> VolumeRole {
        let height = self.height().unwrap_or(0.0);
        let tol = self.tolerance();
        if z < -tol {
            VolumeRole::Inlet
        } else if z > height + tol {
            VolumeRole::Outlet
        } else {
            VolumeRole::Bed
        }
    }

    /// Absolute tolerance for comparing positions against the container.
    pub fn tolerance(&self) -> f64 {
        let extent = self
            .column_bounds()
            .map_or(1.0, |b| b.extent().max_element());
        GEOMETRY_TOLERANCE * extent.max(1.0)
    }

    // =========================================================================
    // HANDLES
    // =========================================================================

    /// Solids built by [`build_geometry`](Self::build_geometry).
    pub fn volumes(&self) -> Vec<DimTag> {
        self.volumes.iter().map(|(tag, _)| *tag).collect()
    }

    /// Solids with the section they form.
    pub fn sections(&self) -> &[(DimTag, VolumeRole)] {
        &self.volumes
    }

    /// Surfaces bounding the copied container.
    pub fn shell(&self) -> &[DimTag] {
        &self.shell
    }

    // =========================================================================
    // GEOMETRY
    // =========================================================================

    fn require_body(&self, operation: &str) -> MesherResult<Body> {
        self.body
            .ok_or_else(|| {
                MesherError::unsupported_shape(format!(
                    "{operation} needs a box or cylinder container"
                ))
            })
    }

    /// Adds the body solid and the inlet/outlet solids of non-zero length.
    pub fn build_geometry<K: GeometryKernel + ?Sized>(
        &mut self,
        kernel: &mut K,
    ) -> MesherResult<Vec<DimTag>> {
        let body = self.require_body("building container geometry")?;
        let mut volumes = vec![(body.solid(kernel, 0.0, body.height())?, VolumeRole::Bed)];
        if self.inlet_length > 0.0 {
            let inlet = body.solid(kernel, -self.inlet_length, self.inlet_length)?;
            volumes.push((inlet, VolumeRole::Inlet));
        }
        if self.outlet_length > 0.0 {
            let outlet = body.solid(kernel, body.height(), self.outlet_length)?;
            volumes.push((outlet, VolumeRole::Outlet));
        }
        debug!(shape = %self.shape(), solids = volumes.len(), "Built container geometry");
        self.volumes = volumes;
        Ok(self.volumes())
    }

    /// Fresh inlet/outlet solids, used as cutting tools by the volume cut.
    pub fn extension_tools<K: GeometryKernel + ?Sized>(
        &self,
        kernel: &mut K,
    ) -> MesherResult<Vec<DimTag>> {
        let body = self.require_body("cutting against extensions")?;
        let mut tools = Vec::new();
        if self.inlet_length > 0.0 {
            tools.push(body.solid(kernel, -self.inlet_length, self.inlet_length)?);
        }
        if self.outlet_length > 0.0 {
            tools.push(body.solid(kernel, body.height(), self.outlet_length)?);
        }
        Ok(tools)
    }

    /// Meshes the wall and the bottom end face of a cylinder and stamps the
    /// bottom mesh onto the top end face.
    ///
    /// The end faces are split into `end_face_sections` concentric rings of
    /// equal width. Stamped tags start past `offsets`; the returned offsets
    /// lie past the top face.
    pub fn copy_reference_mesh<K: GeometryKernel + ?Sized>(
        &mut self,
        kernel: &mut K,
        offsets: TagOffsets,
    ) -> MesherResult<TagOffsets> {
        let Some(Body::Cylinder { radius, height }) = self.body else {
            return Err(MesherError::unsupported_shape(format!(
                "mesh copy of a {} container",
                self.shape()
            )));
        };
        if self.inlet_length > 0.0 || self.outlet_length > 0.0 {
            warn!(
                inlet = self.inlet_length,
                outlet = self.outlet_length,
                "Copied containers have no inlet/outlet extensions; lengths ignored"
            );
        }

        let n = self.end_face_sections;
        let wall = kernel.add_cylinder_wall(DVec3::ZERO, height, radius)?;
        let bottom = (0..n)
            .map(|k| {
                let inner = radius * f64::from(k) / f64::from(n);
                let outer = radius * f64::from(k + 1) / f64::from(n);
                kernel.add_annulus(DVec3::ZERO, inner, outer)
            })
            .collect::<KernelResult<Vec<_>>>()?;
        kernel.generate_mesh(2)?;

        let template = MeshTemplate::capture(kernel, &bottom, DVec3::ZERO)?;
        let top = (0..n)
            .map(|_| kernel.add_discrete_entity(2, &[]))
            .collect::<KernelResult<Vec<_>>>()?;
        let next = template.stamp(kernel, &top, DVec3::Z * height, offsets)?;

        info!(
            sections = n,
            node_offset = next.node,
            element_offset = next.element,
            "Copied container end face"
        );

        self.shell = std::iter::once(wall).chain(bottom).chain(top).collect();
        Ok(next)
    }
}
