//! # Bed Bounds
//!
//! Envelope and radius statistics of a set of beads.

use std::f64::consts::PI;

use glam::DVec3;
use kernel_api::Aabb;

use crate::bead::Bead;
use crate::error::{BedError, BedResult};

/// Derived bounds of a packed bed.
///
/// `radius` is half the larger of the x and y extents: the radius of the
/// axis-aligned enclosing cylinder used for the bed volume, not a
/// circumscribed radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BedBounds {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
    pub zmin: f64,
    pub zmax: f64,
    pub rmin: f64,
    pub rmax: f64,
    pub ravg: f64,
    /// Enclosing cylinder radius `R`.
    pub radius: f64,
    /// Bed height `h = zmax - zmin`.
    pub height: f64,
    /// `PI * R^2 * h`.
    pub cylinder_volume: f64,
}

impl BedBounds {
    /// Computes the bounds of `beads`, including their radii.
    ///
    /// # Errors
    ///
    /// [`BedError::EmptyBed`] if `beads` is empty.
    pub fn compute(beads: &[Bead]) -> BedResult<Self> {
        let first = beads.first().ok_or(BedError::EmptyBed)?;

        let mut b = Self {
            xmin: first.x - first.r,
            xmax: first.x + first.r,
            ymin: first.y - first.r,
            ymax: first.y + first.r,
            zmin: first.z - first.r,
            zmax: first.z + first.r,
            rmin: first.r,
            rmax: first.r,
            ravg: 0.0,
            radius: 0.0,
            height: 0.0,
            cylinder_volume: 0.0,
        };

        let mut rsum = 0.0;
        for bead in beads {
            b.xmin = b.xmin.min(bead.x - bead.r);
            b.xmax = b.xmax.max(bead.x + bead.r);
            b.ymin = b.ymin.min(bead.y - bead.r);
            b.ymax = b.ymax.max(bead.y + bead.r);
            b.zmin = b.zmin.min(bead.z - bead.r);
            b.zmax = b.zmax.max(bead.z + bead.r);
            b.rmin = b.rmin.min(bead.r);
            b.rmax = b.rmax.max(bead.r);
            rsum += bead.r;
        }

        b.ravg = rsum / beads.len() as f64;
        b.radius = ((b.xmax - b.xmin) / 2.0).max((b.ymax - b.ymin) / 2.0);
        b.height = b.zmax - b.zmin;
        b.cylinder_volume = PI * b.radius * b.radius * b.height;
        Ok(b)
    }

    /// The envelope as a bounding box.
    pub fn aabb(&self) -> Aabb {
        Aabb::new(
            DVec3::new(self.xmin, self.ymin, self.zmin),
            DVec3::new(self.xmax, self.ymax, self.zmax),
        )
    }

    /// Midpoint of the x/y envelope (z = 0).
    pub fn xy_center(&self) -> DVec3 {
        DVec3::new((self.xmax + self.xmin) / 2.0, (self.ymax + self.ymin) / 2.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_bed_has_no_bounds() {
        assert!(matches!(BedBounds::compute(&[]), Err(BedError::EmptyBed)));
    }

    #[test]
    fn test_two_bead_bounds() {
        let beads = [Bead::new(0.0, 0.0, 0.0, 1.0), Bead::new(5.0, 0.0, 0.0, 1.0)];
        let b = BedBounds::compute(&beads).unwrap();
        assert_eq!(b.xmin, -1.0);
        assert_eq!(b.xmax, 6.0);
        assert_eq!(b.ymin, -1.0);
        assert_eq!(b.ymax, 1.0);
        assert_eq!(b.radius, 3.5);
        assert_eq!(b.height, 2.0);
        assert_relative_eq!(b.cylinder_volume, PI * 3.5 * 3.5 * 2.0);
    }

    #[test]
    fn test_radius_statistics() {
        let beads = [
            Bead::new(0.0, 0.0, 0.0, 1.0),
            Bead::new(0.0, 0.0, 5.0, 2.0),
            Bead::new(0.0, 0.0, 9.0, 3.0),
        ];
        let b = BedBounds::compute(&beads).unwrap();
        assert_eq!(b.rmin, 1.0);
        assert_eq!(b.rmax, 3.0);
        assert_relative_eq!(b.ravg, 2.0);
        assert_eq!(b.zmin, -1.0);
        assert_eq!(b.zmax, 12.0);
    }

    #[test]
    fn test_every_bead_inside_bounds() {
        let beads: Vec<Bead> = (0..50)
            .map(|i| {
                let t = i as f64;
                Bead::new(
                    (t * 0.37).sin() * 4.0,
                    (t * 0.91).cos() * 3.0,
                    t * 0.2,
                    0.1 + (i % 7) as f64 * 0.05,
                )
            })
            .collect();
        let b = BedBounds::compute(&beads).unwrap();
        for bead in &beads {
            assert!(b.xmin <= bead.x - bead.r && bead.x + bead.r <= b.xmax);
            assert!(b.ymin <= bead.y - bead.r && bead.y + bead.r <= b.ymax);
            assert!(b.zmin <= bead.z - bead.r && bead.z + bead.r <= b.zmax);
        }
        assert_eq!(b.radius, ((b.xmax - b.xmin).max(b.ymax - b.ymin)) / 2.0);
    }
}
