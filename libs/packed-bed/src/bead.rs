//! # Bead
//!
//! A spherical particle: center and radius.

use glam::DVec3;

use crate::packing::Record;

/// A sphere of the packed bed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bead {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub r: f64,
}

impl Bead {
    pub fn new(x: f64, y: f64, z: f64, r: f64) -> Self {
        Self { x, y, z, r }
    }

    /// Builds a bead from an `(x, y, z, diameter)` record.
    ///
    /// Positions are multiplied by `scale`; the radius is
    /// `diameter / 2 * scale * particle_scale`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use packed_bed::Bead;
    ///
    /// let bead = Bead::from_record(&[1.0, 2.0, 3.0, 4.0], 2.0, 0.5);
    /// assert_eq!(bead, Bead::new(2.0, 4.0, 6.0, 2.0));
    /// ```
    pub fn from_record(record: &Record, scale: f64, particle_scale: f64) -> Self {
        Self {
            x: record[0] * scale,
            y: record[1] * scale,
            z: record[2] * scale,
            r: record[3] / 2.0 * scale * particle_scale,
        }
    }

    /// The bead as an `(x, y, z, diameter)` record.
    pub fn to_record(&self) -> Record {
        [self.x, self.y, self.z, 2.0 * self.r]
    }

    #[inline]
    pub fn center(&self) -> DVec3 {
        DVec3::new(self.x, self.y, self.z)
    }

    pub fn translate(&mut self, offset: DVec3) {
        self.x += offset.x;
        self.y += offset.y;
        self.z += offset.z;
    }
}
