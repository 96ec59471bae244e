//! # Configuration Schema
//!
//! Typed mirror of the mesher's configuration document. Sections follow the
//! document layout (`packedbed`, `container`, `mesh`, `output`, `general`,
//! `kernel`); every field carries a serde default so that partial documents
//! load, and [`MesherConfig::validate`] enforces ranges and cross-key rules.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ALGORITHM_2D, DEFAULT_ALGORITHM_3D, DEFAULT_COPYMESH_REF_DIM,
    DEFAULT_FRAGMENT_FORMAT, DEFAULT_GENERATE_DIM, DEFAULT_MESH_SIZE, DEFAULT_OUTPUT_FILE,
    DEFAULT_PACKING_FILE,
};
use crate::error::{ConfigError, ConfigResult};

// =============================================================================
// ROOT
// =============================================================================

/// Complete, validated mesher configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MesherConfig {
    pub packedbed: PackedBedConfig,
    pub container: ContainerConfig,
    pub mesh: MeshConfig,
    pub output: OutputConfig,
    pub general: GeneralConfig,
    /// Raw numeric options forwarded verbatim to the geometry kernel.
    pub kernel: BTreeMap<String, f64>,
}

impl MesherConfig {
    /// Parses and validates a JSON document.
    pub fn from_json(text: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Checks ranges and cross-key consistency.
    pub fn validate(&self) -> ConfigResult<()> {
        self.packedbed.validate()?;
        self.container.validate()?;
        self.mesh.validate()?;
        if self.general.nproc == 0 {
            return Err(ConfigError::invalid("general.nproc", "must be at least 1"));
        }
        Ok(())
    }

    /// Options forwarded to the geometry kernel before any geometry is built.
    pub fn kernel_options(&self) -> KernelOptions {
        KernelOptions {
            algorithm_2d: self.mesh.algorithm,
            algorithm_3d: self.mesh.algorithm_3d,
            worker_count: self.general.nproc,
            improved_bbox: self.general.improved_bbox_calc,
            mesh_size: self.mesh.size,
            raw: self.kernel.clone(),
        }
    }
}

// =============================================================================
// PACKED BED
// =============================================================================

/// Encoding of the binary packing records: float width and byte order.
///
/// Serialized as its tag (`"<f"`, `"<d"`, `">f"`, `">d"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PackingFormat {
    LittleF32,
    LittleF64,
    BigF32,
    BigF64,
}

impl PackingFormat {
    /// Width in bytes of one encoded value.
    pub fn value_width(self) -> usize {
        match self {
            Self::LittleF32 | Self::BigF32 => 4,
            Self::LittleF64 | Self::BigF64 => 8,
        }
    }

    /// Width in bytes of one `(x, y, z, diameter)` record.
    pub fn record_width(self) -> usize {
        4 * self.value_width()
    }

    /// Returns true for little-endian encodings.
    pub fn is_little_endian(self) -> bool {
        matches!(self, Self::LittleF32 | Self::LittleF64)
    }

    /// The format tag as written in configuration documents.
    pub fn tag(self) -> &'static str {
        match self {
            Self::LittleF32 => "<f",
            Self::LittleF64 => "<d",
            Self::BigF32 => ">f",
            Self::BigF64 => ">d",
        }
    }
}

impl FromStr for PackingFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "<f" => Ok(Self::LittleF32),
            "<d" => Ok(Self::LittleF64),
            ">f" => Ok(Self::BigF32),
            ">d" => Ok(Self::BigF64),
            other => Err(ConfigError::invalid(
                "packedbed.packing_file.dataformat",
                format!("'{other}' is not one of <f, <d, >f, >d"),
            )),
        }
    }
}

impl TryFrom<String> for PackingFormat {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PackingFormat> for String {
    fn from(value: PackingFormat) -> Self {
        value.tag().to_owned()
    }
}

impl fmt::Display for PackingFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Location and encoding of the packing file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackingFileConfig {
    pub filename: PathBuf,
    pub dataformat: Option<PackingFormat>,
}

impl Default for PackingFileConfig {
    fn default() -> Self {
        Self {
            filename: PathBuf::from(DEFAULT_PACKING_FILE),
            dataformat: None,
        }
    }
}

impl PackingFileConfig {
    /// The configured record encoding; the key has no default.
    pub fn format(&self) -> ConfigResult<PackingFormat> {
        self.dataformat
            .ok_or(ConfigError::Missing("packedbed.packing_file.dataformat"))
    }
}

/// Per-particle adjustments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticlesConfig {
    /// Extra factor applied to radii only.
    pub scaling_factor: f64,
    /// Beads whose scaled radius falls below this value are dropped.
    pub radius_lower_threshold: f64,
}

impl Default for ParticlesConfig {
    fn default() -> Self {
        Self {
            scaling_factor: 1.0,
            radius_lower_threshold: 0.0,
        }
    }
}

/// Packed bed ingestion parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackedBedConfig {
    pub packing_file: PackingFileConfig,
    /// Take the first `nbeads` records when non-negative; otherwise filter by z.
    pub nbeads: Option<i64>,
    /// Lower z bound in scaled coordinates (unbounded when absent).
    pub zbot: Option<f64>,
    /// Upper z bound in scaled coordinates (unbounded when absent).
    pub ztop: Option<f64>,
    pub scaling_factor: f64,
    pub particles: ParticlesConfig,
    pub auto_translate: bool,
}

impl Default for PackedBedConfig {
    fn default() -> Self {
        Self {
            packing_file: PackingFileConfig::default(),
            nbeads: None,
            zbot: None,
            ztop: None,
            scaling_factor: 1.0,
            particles: ParticlesConfig::default(),
            auto_translate: false,
        }
    }
}

impl PackedBedConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.packing_file.format()?;
        if !(self.scaling_factor > 0.0) {
            return Err(ConfigError::invalid(
                "packedbed.scaling_factor",
                format!("must be positive, got {}", self.scaling_factor),
            ));
        }
        if !(self.particles.scaling_factor > 0.0) {
            return Err(ConfigError::invalid(
                "packedbed.particles.scaling_factor",
                format!("must be positive, got {}", self.particles.scaling_factor),
            ));
        }
        if let (Some(bot), Some(top)) = (self.zbot, self.ztop) {
            if bot > top {
                return Err(ConfigError::invalid(
                    "packedbed.zbot",
                    format!("zbot ({bot}) is above ztop ({top})"),
                ));
            }
        }
        Ok(())
    }
}

// =============================================================================
// CONTAINER
// =============================================================================

/// Shape of the enclosing container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainerShape {
    #[serde(rename = "box")]
    Box,
    #[serde(rename = "cylinder")]
    Cylinder,
    #[default]
    #[serde(rename = "", alias = "none")]
    None,
}

impl ContainerShape {
    /// Number of entries `container.size` must have for this shape.
    pub fn size_len(self) -> usize {
        match self {
            Self::Box => 3,
            Self::Cylinder => 2,
            Self::None => 0,
        }
    }
}

impl fmt::Display for ContainerShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Box => "box",
            Self::Cylinder => "cylinder",
            Self::None => "none",
        })
    }
}

/// How the bed is cut against the inlet/outlet extensions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackMethod {
    #[default]
    PlaneCut,
    VolumeCut,
    All,
}

impl StackMethod {
    /// Whether flat cutting planes are applied.
    pub fn cuts_planes(self) -> bool {
        matches!(self, Self::PlaneCut | Self::All)
    }

    /// Whether extension solids are subtracted from the bed.
    pub fn cuts_volumes(self) -> bool {
        matches!(self, Self::VolumeCut | Self::All)
    }
}

/// Directions along which the container is periodic.
///
/// Serialized as a combination string of `x`, `y`, `z` in that order
/// (`""`, `"x"`, `"xz"`, `"xyz"`, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Periodicity {
    pub x: bool,
    pub y: bool,
    pub z: bool,
}

impl Periodicity {
    /// True when no direction is periodic.
    pub fn is_none(self) -> bool {
        !(self.x || self.y || self.z)
    }

    /// Periodic axes as indices (0 = x, 1 = y, 2 = z).
    pub fn axes(self) -> impl Iterator<Item = usize> {
        [self.x, self.y, self.z]
            .into_iter()
            .enumerate()
            .filter_map(|(axis, on)| on.then_some(axis))
    }
}

impl TryFrom<String> for Periodicity {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let mut periodicity = Periodicity::default();
        let mut last = None;
        for c in value.chars() {
            let axis = match c {
                'x' => 0,
                'y' => 1,
                'z' => 2,
                other => {
                    return Err(ConfigError::invalid(
                        "container.periodicity",
                        format!("unknown direction '{other}'"),
                    ))
                }
            };
            if last.is_some_and(|prev| axis <= prev) {
                return Err(ConfigError::invalid(
                    "container.periodicity",
                    format!("'{value}' must list distinct directions in xyz order"),
                ));
            }
            last = Some(axis);
            match axis {
                0 => periodicity.x = true,
                1 => periodicity.y = true,
                _ => periodicity.z = true,
            }
        }
        Ok(periodicity)
    }
}

impl From<Periodicity> for String {
    fn from(value: Periodicity) -> Self {
        let mut s = String::new();
        if value.x {
            s.push('x');
        }
        if value.y {
            s.push('y');
        }
        if value.z {
            s.push('z');
        }
        s
    }
}

/// Container parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    pub shape: ContainerShape,
    /// Box: `[dx, dy, dz]`; cylinder: `[radius, height]`.
    pub size: Vec<f64>,
    pub periodicity: Periodicity,
    /// Export inlet/outlet sections as separate files.
    pub linked: bool,
    pub stack_method: StackMethod,
    pub inlet_length: f64,
    pub outlet_length: f64,
    /// Number of concentric sections each end face is split into.
    pub end_face_sections: u32,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            shape: ContainerShape::None,
            size: Vec::new(),
            periodicity: Periodicity::default(),
            linked: false,
            stack_method: StackMethod::PlaneCut,
            inlet_length: 0.0,
            outlet_length: 0.0,
            end_face_sections: 1,
        }
    }
}

impl ContainerConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.inlet_length < 0.0 {
            return Err(ConfigError::invalid("container.inlet_length", "must be >= 0"));
        }
        if self.outlet_length < 0.0 {
            return Err(ConfigError::invalid("container.outlet_length", "must be >= 0"));
        }
        if self.end_face_sections == 0 {
            return Err(ConfigError::invalid(
                "container.end_face_sections",
                "must be at least 1",
            ));
        }
        if self.shape != ContainerShape::None && self.size.len() != self.shape.size_len() {
            return Err(ConfigError::invalid(
                "container.size",
                format!(
                    "{} needs {} values, got {}",
                    self.shape,
                    self.shape.size_len(),
                    self.size.len()
                ),
            ));
        }
        if let Some(v) = self.size.iter().find(|v| !(**v > 0.0)) {
            return Err(ConfigError::invalid(
                "container.size",
                format!("all entries must be positive, got {v}"),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// MESH
// =============================================================================

/// Overall meshing strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeshMethod {
    /// Mesh every primitive independently after boolean fusion.
    #[default]
    #[serde(rename = "generic")]
    Generic,
    /// Mesh one reference bead and copy its discretization.
    #[serde(rename = "copymesh")]
    CopyMesh,
}

/// How target element sizes are prescribed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeMethod {
    #[default]
    Global,
    Field,
}

/// Which bead radius statistic the copy-mesh reference sphere uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefRadius {
    #[default]
    Avg,
    Max,
    Min,
}

/// Threshold field parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Element size at the bead center; defaults to `mesh.size`.
    pub size_in: Option<f64>,
    /// Element size far from the bead; defaults to `mesh.size`.
    pub size_out: Option<f64>,
    pub rad_min_factor: f64,
    pub rad_max_factor: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            size_in: None,
            size_out: None,
            rad_min_factor: 1.0,
            rad_max_factor: 1.0,
        }
    }
}

/// Mesh size field section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub threshold: ThresholdConfig,
}

/// Meshing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    pub method: MeshMethod,
    /// Dimension of the reference discretization copied in copy-mesh mode.
    pub copymesh_ref_dim: u8,
    pub size_method: SizeMethod,
    pub size: f64,
    pub field: FieldConfig,
    pub ref_radius: RefRadius,
    /// Highest dimension generated by the final meshing pass.
    pub generate: u8,
    pub algorithm: i32,
    #[serde(rename = "algorithm3D")]
    pub algorithm_3d: i32,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            method: MeshMethod::Generic,
            copymesh_ref_dim: DEFAULT_COPYMESH_REF_DIM,
            size_method: SizeMethod::Global,
            size: DEFAULT_MESH_SIZE,
            field: FieldConfig::default(),
            ref_radius: RefRadius::Avg,
            generate: DEFAULT_GENERATE_DIM,
            algorithm: DEFAULT_ALGORITHM_2D,
            algorithm_3d: DEFAULT_ALGORITHM_3D,
        }
    }
}

impl MeshConfig {
    /// Resolved sizing parameters of the per-bead threshold fields.
    pub fn sizing(&self) -> SizingParams {
        let threshold = &self.field.threshold;
        SizingParams {
            size_in: threshold.size_in.unwrap_or(self.size),
            size_out: threshold.size_out.unwrap_or(self.size),
            rad_min_factor: threshold.rad_min_factor,
            rad_max_factor: threshold.rad_max_factor,
        }
    }

    fn validate(&self) -> ConfigResult<()> {
        if !(self.size > 0.0) {
            return Err(ConfigError::invalid(
                "mesh.size",
                format!("must be positive, got {}", self.size),
            ));
        }
        if !matches!(self.copymesh_ref_dim, 2 | 3) {
            return Err(ConfigError::invalid(
                "mesh.copymesh_ref_dim",
                format!("must be 2 or 3, got {}", self.copymesh_ref_dim),
            ));
        }
        if self.generate > 3 {
            return Err(ConfigError::invalid(
                "mesh.generate",
                format!("must be one of 0, 1, 2, 3, got {}", self.generate),
            ));
        }
        let sizing = self.sizing();
        if !(sizing.size_in > 0.0 && sizing.size_out > 0.0) {
            return Err(ConfigError::invalid(
                "mesh.field.threshold",
                "size_in and size_out must be positive",
            ));
        }
        if sizing.rad_min_factor > sizing.rad_max_factor {
            return Err(ConfigError::invalid(
                "mesh.field.threshold.rad_min_factor",
                "must not exceed rad_max_factor",
            ));
        }
        Ok(())
    }
}

/// Threshold sizing values with defaults applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizingParams {
    pub size_in: f64,
    pub size_out: f64,
    pub rad_min_factor: f64,
    pub rad_max_factor: f64,
}

// =============================================================================
// OUTPUT / GENERAL
// =============================================================================

/// Output naming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub filename: PathBuf,
    pub fragment_format: String,
    pub log_timestamp: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            filename: PathBuf::from(DEFAULT_OUTPUT_FILE),
            fragment_format: DEFAULT_FRAGMENT_FORMAT.to_string(),
            log_timestamp: false,
        }
    }
}

impl OutputConfig {
    /// Fragment extension with a leading dot.
    ///
    /// # Example
    ///
    /// ```rust
    /// use config::OutputConfig;
    ///
    /// let output = OutputConfig { fragment_format: "msh".into(), ..Default::default() };
    /// assert_eq!(output.fragment_extension(), ".msh");
    /// ```
    pub fn fragment_extension(&self) -> String {
        if self.fragment_format.starts_with('.') {
            self.fragment_format.clone()
        } else {
            format!(".{}", self.fragment_format)
        }
    }

    /// Output path for a named section: `<dir>/<stem>_<role><ext>`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use config::OutputConfig;
    /// use std::path::PathBuf;
    ///
    /// let output = OutputConfig { filename: "out/mesh.vtk".into(), ..Default::default() };
    /// assert_eq!(output.section_path("inlet"), PathBuf::from("out/mesh_inlet.vtk"));
    /// ```
    pub fn section_path(&self, role: &str) -> PathBuf {
        let stem = self
            .filename
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = self
            .filename
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        self.filename
            .with_file_name(format!("{stem}_{role}{extension}"))
    }

    /// Path of a surface fragment of a section:
    /// `<dir>/<stem>_<section>_<role><fragment ext>`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use config::OutputConfig;
    /// use std::path::PathBuf;
    ///
    /// let output = OutputConfig {
    ///     filename: "mesh.msh".into(),
    ///     fragment_format: "stl".into(),
    ///     ..Default::default()
    /// };
    /// assert_eq!(output.fragment_path("column", "wall"), PathBuf::from("mesh_column_wall.stl"));
    /// ```
    pub fn fragment_path(&self, section: &str, role: &str) -> PathBuf {
        let stem = self
            .filename
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.filename.with_file_name(format!(
            "{stem}_{section}_{role}{}",
            self.fragment_extension()
        ))
    }

    /// Sibling of the output file with a fixed name.
    pub fn sibling(&self, name: &str) -> PathBuf {
        self.filename.with_file_name(name)
    }
}

/// Process-wide switches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Fuse bed and container with a boolean fragmentation.
    pub fragment: bool,
    /// Worker-count hint for the kernel.
    pub nproc: usize,
    pub center_bed_in_container: bool,
    pub improved_bbox_calc: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            fragment: true,
            nproc: 1,
            center_bed_in_container: false,
            improved_bbox_calc: false,
        }
    }
}

/// Settings the kernel receives before geometry is created.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelOptions {
    pub algorithm_2d: i32,
    pub algorithm_3d: i32,
    pub worker_count: usize,
    pub improved_bbox: bool,
    /// Global target element size.
    pub mesh_size: f64,
    pub raw: BTreeMap<String, f64>,
}

impl Default for KernelOptions {
    fn default() -> Self {
        MesherConfig::default().kernel_options()
    }
}
