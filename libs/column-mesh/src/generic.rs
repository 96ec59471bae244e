//! # Generic Model
//!
//! Meshes every bead and the container as independent primitives joined by
//! boolean fragmentation.
//!
//! ```text
//! beads + sizing ─► container solids ─► stack method ─► fuse (boolean)
//!     ─► partition ─► classify ─► periodicity ─► size ─► mesh ─► write
//! ```

use std::path::PathBuf;

use config::{ContainerShape, MesherConfig, SizeMethod};
use kernel_api::{DimTag, GeometryKernel};
use packed_bed::PackedBed;
use tracing::{debug, info};

use crate::column::{Column, FusionMode};
use crate::container::Container;
use crate::error::{MesherError, MesherResult};
use crate::model::{load_bed, write_bed_only};

/// Generic run over a validated configuration.
#[derive(Debug, Clone, Copy)]
pub struct GenericModel<'c> {
    config: &'c MesherConfig,
}

impl<'c> GenericModel<'c> {
    pub fn new(config: &'c MesherConfig) -> MesherResult<Self> {
        let container = &config.container;
        if !container.periodicity.is_none() && container.shape != ContainerShape::Box {
            return Err(MesherError::unsupported_config(format!(
                "periodicity on a {} container",
                container.shape
            )));
        }
        Ok(Self { config })
    }

    /// Runs the model; returns every file written.
    pub fn run<K: GeometryKernel + ?Sized>(&self, kernel: &mut K) -> MesherResult<Vec<PathBuf>> {
        let cfg = self.config;
        info!(size_method = ?cfg.mesh.size_method, "Running generic model");

        let (mut bed, dump) = load_bed(cfg)?;
        let mut written = vec![dump];

        let mut container = Container::new(&cfg.container)?;
        let Some(bounds) = container.bounds() else {
            bed.generate_primitives(kernel)?;
            self.size_bed(kernel, &mut bed)?;
            written.push(write_bed_only(cfg, kernel)?);
            return Ok(written);
        };
        if cfg.general.center_bed_in_container {
            bed.center_in_bounds(&bounds);
        }

        bed.generate_primitives(kernel)?;
        if cfg.mesh.size_method == SizeMethod::Field {
            bed.derive_sizing_field(kernel, &cfg.mesh.sizing())?;
        }
        container.build_geometry(kernel)?;

        let mut column = Column::new(&container, &bed)?;
        column.apply_stack_method(kernel, container.stack_method())?;
        column.fuse(kernel, FusionMode::Boolean { fragment: cfg.general.fragment })?;
        column.partition(kernel)?;
        column.classify_boundary_surfaces(kernel)?;
        column.apply_periodicity(kernel, container.periodicity())?;

        if cfg.mesh.size_method == SizeMethod::Global {
            let entities: Vec<DimTag> = kernel
                .entities(2)
                .into_iter()
                .chain(kernel.entities(3))
                .collect();
            kernel.set_mesh_size(&entities, cfg.mesh.size)?;
            debug!(entities = entities.len(), size = cfg.mesh.size, "Applied global mesh size");
        }

        column.mesh(kernel, cfg.mesh.generate)?;
        written.extend(column.write(
            kernel,
            &cfg.output,
            container.linked(),
            cfg.general.fragment,
        )?);
        Ok(written)
    }

    fn size_bed<K: GeometryKernel + ?Sized>(
        &self,
        kernel: &mut K,
        bed: &mut PackedBed,
    ) -> MesherResult<()> {
        match self.config.mesh.size_method {
            SizeMethod::Field => {
                bed.derive_sizing_field(kernel, &self.config.mesh.sizing())?;
            }
            SizeMethod::Global => bed.apply_global_size(kernel, self.config.mesh.size)?,
        }
        Ok(())
    }
}
