//! # Copy-Mesh Model
//!
//! Meshes one reference bead and one container end face, then copies those
//! discretizations instead of meshing every instance. The interstitial
//! volume is bounded by the copied surfaces.
//!
//! ```text
//! bed copy ─offsets─► container copy ─► discrete fusion ─► partition
//!     ─► classify ─► mesh(generate) ─► write
//! ```
//!
//! Only cylinders are supported; box containers are rejected before any
//! geometry is built.

use std::path::PathBuf;

use config::{ContainerShape, MesherConfig};
use kernel_api::{GeometryKernel, TagOffsets};
use tracing::{info, warn};

use crate::column::{Column, FusionMode};
use crate::container::Container;
use crate::error::{MesherError, MesherResult};
use crate::model::{load_bed, write_bed_only};

/// Copy-mesh run over a validated configuration.
#[derive(Debug, Clone, Copy)]
pub struct CopyMeshModel<'c> {
    config: &'c MesherConfig,
}

impl<'c> CopyMeshModel<'c> {
    pub fn new(config: &'c MesherConfig) -> MesherResult<Self> {
        if config.container.shape == ContainerShape::Box {
            return Err(MesherError::unsupported_config("box containers cannot be copy-meshed"));
        }
        Ok(Self { config })
    }

    /// Runs the model; returns every file written.
    pub fn run<K: GeometryKernel + ?Sized>(&self, kernel: &mut K) -> MesherResult<Vec<PathBuf>> {
        let cfg = self.config;
        let mesh = &cfg.mesh;
        info!(ref_dim = mesh.copymesh_ref_dim, "Running copy-mesh model");

        let (mut bed, dump) = load_bed(cfg)?;
        let mut written = vec![dump];

        let mut container = Container::new(&cfg.container)?;
        let Some(bounds) = container.bounds() else {
            bed.copy_reference_mesh(
                kernel,
                TagOffsets::default(),
                mesh.copymesh_ref_dim,
                mesh.ref_radius,
            )?;
            written.push(write_bed_only(cfg, kernel)?);
            return Ok(written);
        };
        if !container.periodicity().is_none() {
            warn!("Periodicity is not applied to copied meshes");
        }
        if cfg.general.center_bed_in_container {
            bed.center_in_bounds(&bounds);
        }

        let offsets = bed.copy_reference_mesh(
            kernel,
            TagOffsets::default(),
            mesh.copymesh_ref_dim,
            mesh.ref_radius,
        )?;
        container.copy_reference_mesh(kernel, offsets)?;

        let mut column = Column::new(&container, &bed)?;
        column.fuse(kernel, FusionMode::Discrete)?;
        column.partition(kernel)?;
        column.classify_boundary_surfaces(kernel)?;
        column.mesh(kernel, mesh.generate)?;
        written.extend(column.write(
            kernel,
            &cfg.output,
            container.linked(),
            cfg.general.fragment,
        )?);
        Ok(written)
    }
}
