//! # Bed Geometry
//!
//! Everything the packed bed asks of the geometry kernel: one sphere per bead,
//! per-bead sizing fields, and the copy-mesh path that meshes a single
//! reference sphere and stamps it onto every other bead.
//!
//! Entity handles are kept in bead order: `entities()[i]` belongs to
//! `beads()[i]`.

use config::{RefRadius, SizingParams};
use kernel_api::{DimTag, FieldTag, GeometryKernel, MeshTemplate, TagOffsets, Threshold};
use tracing::{debug, info};

use crate::bed::PackedBed;
use crate::error::{BedError, BedResult};

/// Kernel handles of one bead.
#[derive(Debug, Clone, PartialEq)]
pub struct BeadEntity {
    /// Solid, absent when only the surface was copied.
    pub volume: Option<DimTag>,
    /// Bounding surfaces.
    pub shell: Vec<DimTag>,
}

/// Handles of the per-bead sizing fields.
#[derive(Debug, Clone, PartialEq)]
pub struct SizingField {
    /// Center points, one per bead.
    pub points: Vec<DimTag>,
    /// Distance fields, each fed by the matching center point.
    pub distances: Vec<FieldTag>,
    pub thresholds: Vec<FieldTag>,
    /// Minimum over all thresholds; installed as background field.
    pub background: FieldTag,
}

impl PackedBed {
    // =========================================================================
    // HANDLES
    // =========================================================================

    /// Per-bead handles; empty until primitives or copies were generated.
    pub fn entities(&self) -> &[BeadEntity] {
        &self.entities
    }

    /// Bead solids in bead order (beads without a solid are skipped).
    pub fn volumes(&self) -> Vec<DimTag> {
        self.entities.iter().filter_map(|e| e.volume).collect()
    }

    /// Bead surfaces, grouped per bead.
    pub fn shells(&self) -> Vec<Vec<DimTag>> {
        self.entities.iter().map(|e| e.shell.clone()).collect()
    }

    pub fn sizing_field(&self) -> Option<&SizingField> {
        self.sizing.as_ref()
    }

    // =========================================================================
    // PRIMITIVES
    // =========================================================================

    /// Creates one solid sphere per bead.
    pub fn generate_primitives<K: GeometryKernel + ?Sized>(
        &mut self,
        kernel: &mut K,
    ) -> BedResult<()> {
        let mut entities = Vec::with_capacity(self.len());
        for bead in self.beads() {
            let volume = kernel.add_sphere(bead.center(), bead.r)?;
            let shell = kernel.boundary(volume)?;
            entities.push(BeadEntity {
                volume: Some(volume),
                shell,
            });
        }
        debug!(beads = entities.len(), "Generated bead primitives");
        self.entities = entities;
        Ok(())
    }

    // =========================================================================
    // SIZING
    // =========================================================================

    /// Installs a size field refining the mesh around every bead.
    ///
    /// For bead `i` with radius `r`: a point at the center, a distance field
    /// measuring the distance to that point, and a threshold mapping
    /// `[rad_min_factor·r, rad_max_factor·r]` to `[size_in, size_out]`. The
    /// thresholds are combined by a minimum field which becomes the
    /// background field.
    pub fn derive_sizing_field<K: GeometryKernel + ?Sized>(
        &mut self,
        kernel: &mut K,
        sizing: &SizingParams,
    ) -> BedResult<&SizingField> {
        let n = self.len();
        let mut points = Vec::with_capacity(n);
        let mut distances = Vec::with_capacity(n);
        let mut thresholds = Vec::with_capacity(n);

        for bead in self.beads() {
            let point = kernel.add_point(bead.center(), sizing.size_in)?;
            let distance = kernel.add_distance_field(&[point])?;
            let threshold = kernel.add_threshold_field(&Threshold {
                input: distance,
                size_min: sizing.size_in,
                size_max: sizing.size_out,
                dist_min: sizing.rad_min_factor * bead.r,
                dist_max: sizing.rad_max_factor * bead.r,
            })?;
            points.push(point);
            distances.push(distance);
            thresholds.push(threshold);
        }

        let background = kernel.add_min_field(&thresholds)?;
        kernel.set_background_field(background)?;
        debug!(fields = thresholds.len(), ?background, "Installed bead sizing field");

        Ok(self.sizing.insert(SizingField {
            points,
            distances,
            thresholds,
            background,
        }))
    }

    /// Prescribes a uniform mesh size on every bead entity.
    pub fn apply_global_size<K: GeometryKernel + ?Sized>(
        &self,
        kernel: &mut K,
        size: f64,
    ) -> BedResult<()> {
        let targets: Vec<DimTag> = self
            .entities
            .iter()
            .flat_map(|e| e.volume.iter().chain(&e.shell).copied())
            .collect();
        kernel.set_mesh_size(&targets, size)?;
        Ok(())
    }

    // =========================================================================
    // COPY MESH
    // =========================================================================

    /// Radius of the reference sphere.
    pub fn reference_radius(&self, choice: RefRadius) -> f64 {
        let bounds = self.bounds();
        match choice {
            RefRadius::Avg => bounds.ravg,
            RefRadius::Max => bounds.rmax,
            RefRadius::Min => bounds.rmin,
        }
    }

    /// Meshes one reference sphere at the first bead and copies its mesh onto
    /// every other bead.
    ///
    /// With `ref_dim == 2` only the surface mesh is reused and the beads end
    /// up as hollow shells; with `ref_dim == 3` the volume mesh is copied too.
    /// Node and element tags of each copy start past `offsets` (and past every
    /// tag already in the kernel); the returned offsets lie past the last copy.
    pub fn copy_reference_mesh<K: GeometryKernel + ?Sized>(
        &mut self,
        kernel: &mut K,
        offsets: TagOffsets,
        ref_dim: u8,
        ref_radius: RefRadius,
    ) -> BedResult<TagOffsets> {
        let with_volume = match ref_dim {
            2 => false,
            3 => true,
            other => {
                return Err(BedError::Config(config::ConfigError::invalid(
                    "mesh.copymesh_ref_dim",
                    format!("must be 2 or 3, got {other}"),
                )))
            }
        };

        let radius = self.reference_radius(ref_radius);
        let origin = self.beads()[0].center();

        let reference = kernel.add_sphere(origin, radius)?;
        let surfaces = kernel.boundary(reference)?;
        if !with_volume {
            kernel.remove(&[reference], false)?;
        }
        kernel.generate_mesh(ref_dim)?;

        let mut captured = surfaces.clone();
        if with_volume {
            captured.push(reference);
        }
        let template = MeshTemplate::capture(kernel, &captured, origin)?;
        debug!(
            radius,
            nodes = template.node_count(),
            elements = template.element_count(),
            "Meshed reference bead"
        );

        let mut entities = Vec::with_capacity(self.len());
        entities.push(BeadEntity {
            volume: with_volume.then_some(reference),
            shell: surfaces.clone(),
        });

        let mut next = offsets;
        for bead in &self.beads()[1..] {
            let shell = surfaces
                .iter()
                .map(|_| kernel.add_discrete_entity(2, &[]))
                .collect::<Result<Vec<_>, _>>()?;
            let mut targets = shell.clone();
            let volume = if with_volume {
                let volume = kernel.add_discrete_entity(3, &shell)?;
                targets.push(volume);
                Some(volume)
            } else {
                None
            };
            next = template.stamp(kernel, &targets, bead.center(), next)?;
            entities.push(BeadEntity { volume, shell });
        }

        info!(
            copies = entities.len() - 1,
            ref_dim,
            node_offset = next.node,
            element_offset = next.element,
            "Copied reference mesh onto beads"
        );
        self.entities = entities;
        Ok(next)
    }
}
