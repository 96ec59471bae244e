//! # Model Dispatch
//!
//! Picks the meshing model for a configuration and runs it against a
//! kernel. Both models share the bed preparation: read the packing, then
//! dump the beads actually used next to the output file.

use std::path::PathBuf;

use config::constants::BEADS_USED_FILE;
use config::{MeshMethod, MesherConfig};
use kernel_api::GeometryKernel;
use packed_bed::PackedBed;
use tracing::info;

use crate::copymesh::CopyMeshModel;
use crate::error::{MesherError, MesherResult};
use crate::generic::GenericModel;

/// A meshing model ready to run.
#[derive(Debug)]
pub enum Model<'c> {
    Generic(GenericModel<'c>),
    CopyMesh(CopyMeshModel<'c>),
}

impl<'c> Model<'c> {
    /// Selects the model named by `mesh.method`.
    pub fn new(config: &'c MesherConfig) -> MesherResult<Self> {
        Ok(match config.mesh.method {
            MeshMethod::Generic => Self::Generic(GenericModel::new(config)?),
            MeshMethod::CopyMesh => Self::CopyMesh(CopyMeshModel::new(config)?),
        })
    }

    /// Runs the model; returns every file written.
    pub fn run<K: GeometryKernel + ?Sized>(&self, kernel: &mut K) -> MesherResult<Vec<PathBuf>> {
        match self {
            Self::Generic(model) => model.run(kernel),
            Self::CopyMesh(model) => model.run(kernel),
        }
    }
}

/// Validates `config`, configures the kernel and runs the selected model.
///
/// Mesh dimensions the kernel cannot generate are rejected before the
/// packing is read.
pub fn build_model<K: GeometryKernel + ?Sized>(
    config: &MesherConfig,
    kernel: &mut K,
) -> MesherResult<Vec<PathBuf>> {
    config.validate()?;
    check_mesh_dims(config, kernel.max_mesh_dim())?;
    let model = Model::new(config)?;
    kernel.configure(&config.kernel_options())?;
    let written = model.run(kernel)?;
    info!(files = written.len(), "Meshing finished");
    Ok(written)
}

fn check_mesh_dims(config: &MesherConfig, supported: u8) -> MesherResult<()> {
    let mesh = &config.mesh;
    let mut requested = vec![("mesh.generate", mesh.generate)];
    if mesh.method == MeshMethod::CopyMesh {
        requested.push(("mesh.copymesh_ref_dim", mesh.copymesh_ref_dim));
    }
    match requested.into_iter().find(|(_, dim)| *dim > supported) {
        Some((key, dim)) => Err(MesherError::unsupported_config(format!(
            "{key} = {dim} but the kernel meshes up to dimension {supported}"
        ))),
        None => Ok(()),
    }
}

/// Reads the bed and writes `beads_used.xyzd` beside the output file.
pub(crate) fn load_bed(config: &MesherConfig) -> MesherResult<(PackedBed, PathBuf)> {
    let bed = PackedBed::from_config(&config.packedbed)?;
    let dump = config.output.sibling(BEADS_USED_FILE);
    bed.write(&dump, config.packedbed.packing_file.format()?)?;
    info!(path = %dump.display(), beads = bed.len(), "Wrote used beads");
    Ok((bed, dump))
}

/// Meshes a bed without container and writes `<base>_bed<ext>`.
pub(crate) fn write_bed_only<K: GeometryKernel + ?Sized>(
    config: &MesherConfig,
    kernel: &mut K,
) -> MesherResult<PathBuf> {
    kernel.generate_mesh(config.mesh.generate)?;
    let path = config.output.section_path("bed");
    kernel.write(&path)?;
    Ok(path)
}
