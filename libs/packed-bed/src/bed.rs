//! # Packed Bed Model
//!
//! Owns the ordered bead set and keeps its bounds consistent with every
//! position change.

use std::path::Path;

use config::constants::EPSILON;
use config::{PackedBedConfig, PackingFormat};
use glam::DVec3;
use kernel_api::Aabb;
use tracing::{debug, info, warn};

use crate::bead::Bead;
use crate::bounds::BedBounds;
use crate::error::{BedError, BedResult, FormatError};
use crate::geometry::{BeadEntity, SizingField};
use crate::packing::{read_packing, write_packing, Record};

// =============================================================================
// SELECTION
// =============================================================================

/// Which records of a packing become beads.
///
/// The two policies are exclusive: a count limit takes the leading records
/// regardless of their z value, while the z range applies only when no count
/// limit is configured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BeadSelection {
    /// The first `n` records, in file order.
    Count(usize),
    /// Records whose *unscaled* z lies in `[bot, top]` (inclusive).
    ZRange { bot: f64, top: f64 },
}

impl BeadSelection {
    /// Derives the policy from `nbeads`, `zbot`, `ztop` and `scaling_factor`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use config::PackedBedConfig;
    /// use packed_bed::BeadSelection;
    ///
    /// let cfg = PackedBedConfig {
    ///     nbeads: Some(-1),
    ///     zbot: Some(2.0),
    ///     ztop: Some(4.0),
    ///     scaling_factor: 2.0,
    ///     ..Default::default()
    /// };
    /// assert_eq!(BeadSelection::from_config(&cfg), BeadSelection::ZRange { bot: 1.0, top: 2.0 });
    ///
    /// let cfg = PackedBedConfig { nbeads: Some(10), ..cfg };
    /// assert_eq!(BeadSelection::from_config(&cfg), BeadSelection::Count(10));
    /// ```
    pub fn from_config(cfg: &PackedBedConfig) -> Self {
        match cfg.nbeads {
            Some(n) if n >= 0 => Self::Count(n as usize),
            _ => Self::ZRange {
                bot: cfg.zbot.unwrap_or(f64::NEG_INFINITY) / cfg.scaling_factor,
                top: cfg.ztop.unwrap_or(f64::INFINITY) / cfg.scaling_factor,
            },
        }
    }

    fn keeps(&self, index: usize, record: &Record) -> bool {
        match *self {
            Self::Count(n) => index < n,
            Self::ZRange { bot, top } => record[2] >= bot && record[2] <= top,
        }
    }
}

/// Selects and scales beads from decoded records.
///
/// Beads whose scaled radius falls below
/// `particles.radius_lower_threshold` are dropped after selection.
pub fn ingest(records: &[Record], cfg: &PackedBedConfig) -> Vec<Bead> {
    let selection = BeadSelection::from_config(cfg);
    let threshold = cfg.particles.radius_lower_threshold;

    let limit = match selection {
        BeadSelection::Count(n) => n.min(records.len()),
        BeadSelection::ZRange { .. } => records.len(),
    };

    let beads: Vec<Bead> = records[..limit]
        .iter()
        .enumerate()
        .filter(|(index, record)| selection.keeps(*index, record))
        .map(|(_, record)| {
            Bead::from_record(record, cfg.scaling_factor, cfg.particles.scaling_factor)
        })
        .filter(|bead| bead.r >= threshold)
        .collect();

    debug!(
        records = records.len(),
        selected = beads.len(),
        ?selection,
        "Selected beads"
    );
    beads
}

// =============================================================================
// PACKED BED
// =============================================================================

/// An ordered set of beads with consistent bounds.
#[derive(Debug, Clone)]
pub struct PackedBed {
    beads: Vec<Bead>,
    bounds: BedBounds,
    pub(crate) entities: Vec<BeadEntity>,
    pub(crate) sizing: Option<SizingField>,
}

impl PackedBed {
    /// Builds a bed from beads in file order.
    ///
    /// # Errors
    ///
    /// [`BedError::EmptyBed`] for an empty set, [`BedError::InvalidBead`] for
    /// a non-positive radius.
    pub fn new(beads: Vec<Bead>) -> BedResult<Self> {
        if let Some((index, bead)) = beads.iter().enumerate().find(|(_, b)| !(b.r > 0.0)) {
            return Err(BedError::InvalidBead {
                index,
                radius: bead.r,
            });
        }
        let bounds = BedBounds::compute(&beads)?;
        Ok(Self {
            beads,
            bounds,
            entities: Vec::new(),
            sizing: None,
        })
    }

    /// Reads the configured packing, selects beads and optionally recenters.
    pub fn from_config(cfg: &PackedBedConfig) -> BedResult<Self> {
        let format = cfg.packing_file.format()?;
        let path = &cfg.packing_file.filename;
        info!(path = %path.display(), %format, "Reading packing");

        let records = read_packing(path, format)?;
        let beads = ingest(&records, cfg);
        if beads.is_empty() {
            warn!(records = records.len(), "No bead survived selection");
        }

        let mut bed = Self::new(beads)?;
        if cfg.auto_translate {
            bed.recenter();
        }
        info!(
            beads = bed.len(),
            rmin = bed.bounds.rmin,
            rmax = bed.bounds.rmax,
            height = bed.bounds.height,
            "Packed bed ready"
        );
        Ok(bed)
    }

    /// Number of beads.
    #[inline]
    pub fn len(&self) -> usize {
        self.beads.len()
    }

    /// Always false: a bed holds at least one bead.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.beads.is_empty()
    }

    #[inline]
    pub fn beads(&self) -> &[Bead] {
        &self.beads
    }

    #[inline]
    pub fn bounds(&self) -> &BedBounds {
        &self.bounds
    }

    /// Recomputes the bounds from the live bead set.
    pub fn compute_bounds(&mut self) -> BedResult<&BedBounds> {
        self.bounds = BedBounds::compute(&self.beads)?;
        Ok(&self.bounds)
    }

    /// Translates every bead; bounds follow.
    pub fn translate(&mut self, offset: DVec3) {
        for bead in &mut self.beads {
            bead.translate(offset);
        }
        if let Ok(bounds) = BedBounds::compute(&self.beads) {
            self.bounds = bounds;
        }
    }

    /// Moves the x/y midpoint of the bed to the origin; z is untouched.
    ///
    /// Offsets within rounding noise of the bed extent are ignored, so a
    /// second call leaves positions bit-identical.
    pub fn recenter(&mut self) {
        self.move_xy_center_to(DVec3::ZERO);
    }

    /// Moves the x/y midpoint of the bed onto the x/y midpoint of `target`.
    pub fn center_in_bounds(&mut self, target: &Aabb) {
        self.move_xy_center_to(target.center());
    }

    fn move_xy_center_to(&mut self, target: DVec3) {
        let offset = DVec3::new(target.x, target.y, 0.0) - self.bounds.xy_center();
        let extent = self.bounds.aabb().extent().max_element().max(1.0);
        if offset.abs().max_element() <= EPSILON * extent {
            return;
        }
        debug!(dx = offset.x, dy = offset.y, "Centering bed");
        self.translate(offset);
    }

    /// Writes the beads back in packing format (scaled frame).
    pub fn write(&self, path: impl AsRef<Path>, format: PackingFormat) -> Result<(), FormatError> {
        let records: Vec<Record> = self.beads.iter().map(Bead::to_record).collect();
        write_packing(path, &records, format)
    }
}
