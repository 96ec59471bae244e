//! # Column
//!
//! Assembly of one container and one packed bed into a tagged, meshed
//! domain. A column walks through its phases strictly forward:
//!
//! ```text
//! Empty ─fuse─► Fused ─partition─► Partitioned ─classify─► BoundaryTagged
//!                                                               │
//!                         Written ◄─write─ Meshed ◄─mesh────────┘
//! ```
//!
//! `apply_stack_method` only runs on an empty column and
//! `apply_periodicity` only on a tagged one; neither advances the phase.
//! Calling an operation in the wrong phase is a [`MesherError::Phase`].

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use config::constants::approx_equal;
use config::{OutputConfig, Periodicity, StackMethod};
use glam::DVec3;
use kernel_api::{Aabb, DimTag, GeometryKernel};
use packed_bed::PackedBed;
use tracing::{debug, info, warn};

use crate::container::{Body, Container};
use crate::error::{MesherError, MesherResult};

// =============================================================================
// PHASES AND ROLES
// =============================================================================

/// Lifecycle of a [`Column`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Empty,
    Fused,
    Partitioned,
    BoundaryTagged,
    Meshed,
    Written,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Empty => "empty",
            Self::Fused => "fused",
            Self::Partitioned => "partitioned",
            Self::BoundaryTagged => "boundary-tagged",
            Self::Meshed => "meshed",
            Self::Written => "written",
        })
    }
}

/// Section of the column a volume belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VolumeRole {
    Inlet,
    Bed,
    Outlet,
}

impl VolumeRole {
    pub const ALL: [Self; 3] = [Self::Inlet, Self::Bed, Self::Outlet];

    /// Name used for output files and physical groups.
    pub fn name(self) -> &'static str {
        match self {
            Self::Inlet => "inlet",
            Self::Bed => "column",
            Self::Outlet => "outlet",
        }
    }
}

/// Kind of a surface bounding a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SurfaceRole {
    /// Bottom end face of a section.
    InletCap,
    /// Top end face of a section.
    OutletCap,
    /// Lateral container wall.
    Wall,
    /// Particle surface.
    Bed,
}

impl SurfaceRole {
    pub const ALL: [Self; 4] = [Self::InletCap, Self::OutletCap, Self::Wall, Self::Bed];

    pub fn name(self) -> &'static str {
        match self {
            Self::InletCap => "inlet",
            Self::OutletCap => "outlet",
            Self::Wall => "wall",
            Self::Bed => "bed",
        }
    }
}

/// How container and bed are joined into one domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FusionMode {
    /// Boolean fragmentation of container and bead solids. With
    /// `fragment == false` the solids are kept as they are.
    Boolean { fragment: bool },
    /// Interstitial volume bounded by the copied container shell with the
    /// copied bead shells as cavities.
    Discrete,
}

/// A surface with the section it bounds and its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaggedSurface {
    pub surface: DimTag,
    pub section: VolumeRole,
    pub role: SurfaceRole,
}

// =============================================================================
// COLUMN
// =============================================================================

/// A container filled with a packed bed.
#[derive(Debug)]
pub struct Column<'a> {
    container: &'a Container,
    bed: &'a PackedBed,
    phase: Phase,
    /// Bead solids as modified by the stack method.
    bed_volumes: Vec<DimTag>,
    volumes: Vec<DimTag>,
    sections: Vec<(DimTag, VolumeRole)>,
    surfaces: Vec<TaggedSurface>,
}

impl<'a> Column<'a> {
    /// Starts an empty column. The container must have a body.
    pub fn new(container: &'a Container, bed: &'a PackedBed) -> MesherResult<Self> {
        if container.body().is_none() {
            return Err(MesherError::unsupported_shape(
                "a column needs a box or cylinder container",
            ));
        }
        Ok(Self {
            container,
            bed,
            phase: Phase::Empty,
            bed_volumes: bed.volumes(),
            volumes: Vec::new(),
            sections: Vec::new(),
            surfaces: Vec::new(),
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Volumes after fusion.
    pub fn volumes(&self) -> &[DimTag] {
        &self.volumes
    }

    /// Volumes with their section, set by [`partition`](Self::partition).
    pub fn sections(&self) -> &[(DimTag, VolumeRole)] {
        &self.sections
    }

    /// Classified boundary surfaces.
    pub fn surfaces(&self) -> &[TaggedSurface] {
        &self.surfaces
    }

    /// Surfaces of one kind, over all sections.
    pub fn surfaces_with(&self, role: SurfaceRole) -> Vec<DimTag> {
        self.surfaces
            .iter()
            .filter(|s| s.role == role)
            .map(|s| s.surface)
            .collect()
    }

    fn require_phase(&self, operation: &'static str, expected: Phase) -> MesherResult<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(MesherError::Phase {
                operation,
                expected,
                actual: self.phase,
            })
        }
    }

    fn column_bounds(&self) -> MesherResult<Aabb> {
        self.container
            .column_bounds()
            .ok_or_else(|| MesherError::unsupported_shape("column without container body"))
    }

    // =========================================================================
    // ASSEMBLY
    // =========================================================================

    /// Trims the bead solids against the section planes and extensions.
    ///
    /// `planecut` slices the beads at `z = 0` and `z = height`; `volumecut`
    /// subtracts the inlet/outlet solids from them; `all` does both.
    pub fn apply_stack_method<K: GeometryKernel + ?Sized>(
        &mut self,
        kernel: &mut K,
        method: StackMethod,
    ) -> MesherResult<()> {
        self.require_phase("apply the stack method to", Phase::Empty)?;
        let height = self.container.height().unwrap_or(0.0);

        if method.cuts_planes() {
            for z in [0.0, height] {
                self.bed_volumes = kernel.slice(&self.bed_volumes, z)?;
            }
        }
        if method.cuts_volumes() {
            let tools = self.container.extension_tools(kernel)?;
            if tools.is_empty() {
                debug!("No extensions to cut the bed against");
            } else {
                self.bed_volumes = kernel.cut(&self.bed_volumes, &tools)?;
            }
        }
        debug!(?method, bead_volumes = self.bed_volumes.len(), "Applied stack method");
        Ok(())
    }

    /// Joins container and bed into the column domain.
    pub fn fuse<K: GeometryKernel + ?Sized>(
        &mut self,
        kernel: &mut K,
        mode: FusionMode,
    ) -> MesherResult<()> {
        self.require_phase("fuse", Phase::Empty)?;
        let container_volumes = self.container.volumes();

        self.volumes = match mode {
            FusionMode::Boolean { fragment: true } => {
                let fused = kernel.fragment(&container_volumes, &self.bed_volumes)?;
                self.drop_outside(kernel, fused)?
            }
            FusionMode::Boolean { fragment: false } => {
                container_volumes.iter().chain(&self.bed_volumes).copied().collect()
            }
            FusionMode::Discrete => {
                let shell = self.container.shell();
                if shell.is_empty() {
                    return Err(MesherError::unsupported_config(
                        "discrete fusion needs a copied container shell",
                    ));
                }
                let holes: Vec<Vec<DimTag>> = self.bed.shells();
                let interstitial = kernel.add_volume(shell, &holes)?;
                std::iter::once(interstitial).chain(self.bed.volumes()).collect()
            }
        };

        info!(?mode, volumes = self.volumes.len(), "Fused column");
        self.phase = Phase::Fused;
        Ok(())
    }

    /// Removes fragments lying outside the column envelope.
    fn drop_outside<K: GeometryKernel + ?Sized>(
        &self,
        kernel: &mut K,
        volumes: Vec<DimTag>,
    ) -> MesherResult<Vec<DimTag>> {
        let envelope = self.column_bounds()?;
        let tol = self.container.tolerance();
        let mut kept = Vec::with_capacity(volumes.len());
        let mut outside = Vec::new();
        for volume in volumes {
            if envelope.contains(&kernel.bounding_box(volume)?, tol) {
                kept.push(volume);
            } else {
                outside.push(volume);
            }
        }
        if !outside.is_empty() {
            warn!(removed = outside.len(), "Removing bed fragments outside the container");
            kernel.remove(&outside, true)?;
        }
        Ok(kept)
    }

    /// Assigns each volume the section its bounding-box center lies in.
    pub fn partition<K: GeometryKernel + ?Sized>(&mut self, kernel: &mut K) -> MesherResult<()> {
        self.require_phase("partition", Phase::Fused)?;
        let mut sections = Vec::new();
        for volume in kernel.entities(3) {
            let center = kernel.bounding_box(volume)?.center();
            sections.push((volume, self.container.role_at(center.z)));
        }
        for role in VolumeRole::ALL {
            let count = sections.iter().filter(|(_, r)| *r == role).count();
            debug!(section = role.name(), volumes = count, "Partitioned column");
        }
        self.sections = sections;
        self.phase = Phase::Partitioned;
        Ok(())
    }

    /// Classifies the surfaces bounding every section and creates one
    /// physical group per section and surface kind.
    ///
    /// A planar surface at the bottom of its section is an inlet cap, one at
    /// the top an outlet cap. Surfaces on a side plane of a box, or spanning
    /// the full cross-section, form the wall. Everything else is bed.
    pub fn classify_boundary_surfaces<K: GeometryKernel + ?Sized>(
        &mut self,
        kernel: &mut K,
    ) -> MesherResult<()> {
        self.require_phase("classify", Phase::Partitioned)?;
        let body = self
            .container
            .body()
            .ok_or_else(|| MesherError::unsupported_shape("column without container body"))?;
        let envelope = self.column_bounds()?;
        let tol = self.container.tolerance();

        // Interfaces go to the lower section: inlet, then bed, then outlet.
        let mut sections = self.sections.clone();
        sections.sort_by_key(|(_, role)| *role);

        let mut seen: HashSet<DimTag> = HashSet::new();
        let mut surfaces = Vec::new();
        for (volume, section) in &sections {
            let (zmin, zmax) = self
                .container
                .section_range(*section)
                .unwrap_or((envelope.min.z, envelope.max.z));
            for surface in kernel.boundary(*volume)? {
                if !seen.insert(surface) {
                    continue;
                }
                let bounds = kernel.bounding_box(surface)?;
                let role = classify(&bounds, body, &envelope, zmin, zmax, tol);
                surfaces.push(TaggedSurface {
                    surface,
                    section: *section,
                    role,
                });
            }
        }
        self.surfaces = surfaces;
        self.tag_groups(kernel, &VolumeRole::ALL)?;

        for role in SurfaceRole::ALL {
            debug!(
                role = role.name(),
                surfaces = self.surfaces_with(role).len(),
                "Classified surfaces"
            );
        }
        self.phase = Phase::BoundaryTagged;
        Ok(())
    }

    /// Replaces the physical groups by those of the given sections.
    fn tag_groups<K: GeometryKernel + ?Sized>(
        &self,
        kernel: &mut K,
        sections: &[VolumeRole],
    ) -> MesherResult<()> {
        kernel.clear_physical_groups();
        for section in sections {
            let volumes: Vec<i32> = self
                .sections
                .iter()
                .filter(|(_, r)| r == section)
                .map(|(v, _)| v.tag)
                .collect();
            if !volumes.is_empty() {
                kernel.add_physical_group(3, &volumes, section.name())?;
            }
        }
        for role in SurfaceRole::ALL {
            let tags: Vec<i32> = self
                .surfaces
                .iter()
                .filter(|s| s.role == role && sections.contains(&s.section))
                .map(|s| s.surface.tag)
                .collect();
            if !tags.is_empty() {
                kernel.add_physical_group(2, &tags, role.name())?;
            }
        }
        Ok(())
    }

    /// Links opposite container faces in every periodic direction. Only box
    /// containers have flat opposite faces.
    pub fn apply_periodicity<K: GeometryKernel + ?Sized>(
        &mut self,
        kernel: &mut K,
        periodicity: Periodicity,
    ) -> MesherResult<()> {
        self.require_phase("apply periodicity to", Phase::BoundaryTagged)?;
        if periodicity.is_none() {
            return Ok(());
        }
        if !matches!(self.container.body(), Some(Body::Box { .. })) {
            return Err(MesherError::unsupported_config(format!(
                "periodicity '{}' needs a box container",
                String::from(periodicity)
            )));
        }

        let envelope = self.column_bounds()?;
        let tol = self.container.tolerance();
        let mut boxes = Vec::with_capacity(self.surfaces.len());
        for s in &self.surfaces {
            boxes.push((s.surface, kernel.bounding_box(s.surface)?));
        }

        for axis in periodicity.axes() {
            let length = envelope.extent()[axis];
            let translation = DVec3::AXES[axis] * length;
            let on_plane = |b: &Aabb, at: f64| {
                approx_equal(b.min[axis], at, tol) && approx_equal(b.max[axis], at, tol)
            };

            let masters: Vec<&(DimTag, Aabb)> =
                boxes.iter().filter(|(_, b)| on_plane(b, envelope.min[axis])).collect();
            let slaves: Vec<&(DimTag, Aabb)> =
                boxes.iter().filter(|(_, b)| on_plane(b, envelope.max[axis])).collect();

            let mut linked = 0usize;
            for (master, master_box) in &masters {
                let expected = master_box.translated(translation);
                let partner = slaves
                    .iter()
                    .find(|(_, b)| expected.contains(b, tol) && b.contains(&expected, tol));
                match partner {
                    Some((slave, _)) => {
                        kernel.set_periodic(&[*slave], &[*master], translation)?;
                        linked += 1;
                    }
                    None => warn!(axis, surface = %master, "No periodic partner for surface"),
                }
            }
            info!(axis, linked, "Applied periodicity");
        }
        Ok(())
    }

    // =========================================================================
    // MESH AND OUTPUT
    // =========================================================================

    /// Meshes the column up to `dim`.
    pub fn mesh<K: GeometryKernel + ?Sized>(
        &mut self,
        kernel: &mut K,
        dim: u8,
    ) -> MesherResult<()> {
        self.require_phase("mesh", Phase::BoundaryTagged)?;
        kernel.generate_mesh(dim)?;
        self.phase = Phase::Meshed;
        Ok(())
    }

    /// Writes the column and returns the written paths.
    ///
    /// With `linked` each section goes to `<base>_<section><ext>`, otherwise
    /// everything goes to `<base>_column<ext>`. With `fragments` each surface
    /// kind of each written file is also exported on its own as
    /// `<base>_<section>_<kind><fragment ext>`.
    pub fn write<K: GeometryKernel + ?Sized>(
        &mut self,
        kernel: &mut K,
        output: &OutputConfig,
        linked: bool,
        fragments: bool,
    ) -> MesherResult<Vec<PathBuf>> {
        self.require_phase("write", Phase::Meshed)?;

        let files: Vec<(&'static str, Vec<VolumeRole>)> = if linked {
            VolumeRole::ALL
                .into_iter()
                .filter(|role| self.sections.iter().any(|(_, r)| r == role))
                .map(|role| (role.name(), vec![role]))
                .collect()
        } else {
            vec![(VolumeRole::Bed.name(), VolumeRole::ALL.to_vec())]
        };

        let mut written = Vec::new();
        for (name, sections) in &files {
            self.tag_groups(kernel, sections)?;
            let path = output.section_path(name);
            kernel.write(&path)?;
            written.push(path);

            if fragments {
                for role in SurfaceRole::ALL {
                    let tags: Vec<i32> = self
                        .surfaces
                        .iter()
                        .filter(|s| s.role == role && sections.contains(&s.section))
                        .map(|s| s.surface.tag)
                        .collect();
                    if tags.is_empty() {
                        continue;
                    }
                    kernel.clear_physical_groups();
                    kernel.add_physical_group(2, &tags, role.name())?;
                    let path = output.fragment_path(name, role.name());
                    kernel.write(&path)?;
                    written.push(path);
                }
            }
        }
        self.tag_groups(kernel, &VolumeRole::ALL)?;

        info!(files = written.len(), "Wrote column");
        self.phase = Phase::Written;
        Ok(written)
    }
}

/// Kind of a surface with bounding box `b` in a section spanning
/// `zmin..zmax`.
fn classify(b: &Aabb, body: Body, envelope: &Aabb, zmin: f64, zmax: f64, tol: f64) -> SurfaceRole {
    let near = |a: f64, c: f64| approx_equal(a, c, tol);
    let planar = b.extent().z <= tol;
    if planar && near(b.min.z, zmin) {
        return SurfaceRole::InletCap;
    }
    if planar && near(b.max.z, zmax) {
        return SurfaceRole::OutletCap;
    }

    let spans_cross_section = near(b.min.x, envelope.min.x)
        && near(b.max.x, envelope.max.x)
        && near(b.min.y, envelope.min.y)
        && near(b.max.y, envelope.max.y);
    let on_x_side = b.extent().x <= tol
        && (near(b.min.x, envelope.min.x) || near(b.max.x, envelope.max.x));
    let on_y_side = b.extent().y <= tol
        && (near(b.min.y, envelope.min.y) || near(b.max.y, envelope.max.y));
    let on_side_plane = matches!(body, Body::Box { .. }) && (on_x_side || on_y_side);

    if spans_cross_section || on_side_plane {
        SurfaceRole::Wall
    } else {
        SurfaceRole::Bed
    }
}

#[cfg(test)]
mod tests;
