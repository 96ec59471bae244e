//! # Surface Tessellation
//!
//! Triangulations of the analytic surfaces the preview kernel knows. Every
//! function returns a [`Patch`] in model coordinates; the kernel assigns node
//! and element tags afterwards.

use std::f64::consts::PI;

use glam::DVec3;

/// Triangulated surface patch with local vertex indices.
#[derive(Debug, Clone, Default)]
pub struct Patch {
    pub vertices: Vec<DVec3>,
    pub triangles: Vec<[usize; 3]>,
}

impl Patch {
    fn add_vertex(&mut self, position: DVec3) -> usize {
        self.vertices.push(position);
        self.vertices.len() - 1
    }

    fn add_triangle(&mut self, a: usize, b: usize, c: usize) {
        self.triangles.push([a, b, c]);
    }

    /// Adds a circle of `segments` vertices and returns their indices.
    fn add_ring(&mut self, center: DVec3, radius: f64, segments: u32) -> Vec<usize> {
        (0..segments)
            .map(|j| {
                let theta = 2.0 * PI * j as f64 / segments as f64;
                let offset = DVec3::new(radius * theta.cos(), radius * theta.sin(), 0.0);
                self.add_vertex(center + offset)
            })
            .collect()
    }

    /// Two triangles per quad between two rings of equal length.
    fn stitch(&mut self, lower: &[usize], upper: &[usize]) {
        let n = lower.len();
        for j in 0..n {
            let k = (j + 1) % n;
            self.add_triangle(lower[j], lower[k], upper[k]);
            self.add_triangle(lower[j], upper[k], upper[j]);
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }
}

/// Latitude/longitude sphere without pole vertices; the first and last rings
/// are closed by fans.
///
/// # Example
///
/// ```rust
/// use glam::DVec3;
/// use preview_kernel::tessellate::sphere;
///
/// let patch = sphere(DVec3::ZERO, 1.0, 16);
/// assert_eq!(patch.vertices.len(), 8 * 16);
/// ```
pub fn sphere(center: DVec3, radius: f64, segments: u32) -> Patch {
    let segments = segments.max(3);
    let num_rings = (segments + 1) / 2;
    let mut patch = Patch::default();

    let rings: Vec<Vec<usize>> = (0..num_rings)
        .map(|i| {
            let phi = PI * (i as f64 + 0.5) / num_rings as f64;
            let ring_center = center + DVec3::new(0.0, 0.0, radius * phi.cos());
            patch.add_ring(ring_center, radius * phi.sin(), segments)
        })
        .collect();

    let first = &rings[0];
    for j in 1..first.len() - 1 {
        patch.add_triangle(first[0], first[j], first[j + 1]);
    }
    for pair in rings.windows(2) {
        patch.stitch(&pair[1], &pair[0]);
    }
    let last = &rings[rings.len() - 1];
    for j in 1..last.len() - 1 {
        patch.add_triangle(last[0], last[j + 1], last[j]);
    }
    patch
}

/// Lateral surface of a +z cylinder, `layers` bands high.
pub fn cylinder_wall(base: DVec3, height: f64, radius: f64, segments: u32, layers: u32) -> Patch {
    let segments = segments.max(3);
    let layers = layers.max(1);
    let mut patch = Patch::default();
    let rings: Vec<Vec<usize>> = (0..=layers)
        .map(|k| {
            let z = height * k as f64 / layers as f64;
            patch.add_ring(base + DVec3::new(0.0, 0.0, z), radius, segments)
        })
        .collect();
    for pair in rings.windows(2) {
        patch.stitch(&pair[0], &pair[1]);
    }
    patch
}

/// Planar ring in `z = center.z`, `bands` rings wide. With `inner == 0` the
/// innermost band is a fan around the center.
pub fn annulus(center: DVec3, inner: f64, outer: f64, segments: u32, bands: u32) -> Patch {
    let segments = segments.max(3);
    let bands = bands.max(1);
    let mut patch = Patch::default();

    let mut rings: Vec<Vec<usize>> = Vec::with_capacity(bands as usize + 1);
    for k in 0..=bands {
        let r = inner + (outer - inner) * k as f64 / bands as f64;
        if r > 0.0 {
            rings.push(patch.add_ring(center, r, segments));
        }
    }

    if inner <= 0.0 {
        let hub = patch.add_vertex(center);
        if let Some(first) = rings.first().cloned() {
            let n = first.len();
            for j in 0..n {
                patch.add_triangle(hub, first[j], first[(j + 1) % n]);
            }
        }
    }
    for pair in rings.windows(2) {
        patch.stitch(&pair[0], &pair[1]);
    }
    patch
}

/// Parallelogram `origin + s·u + t·v`, `s, t ∈ [0, 1]`, split into a
/// `nu × nv` grid.
pub fn quad(origin: DVec3, u: DVec3, v: DVec3, nu: u32, nv: u32) -> Patch {
    let (nu, nv) = (nu.max(1), nv.max(1));
    let mut patch = Patch::default();
    for j in 0..=nv {
        for i in 0..=nu {
            let s = i as f64 / nu as f64;
            let t = j as f64 / nv as f64;
            patch.add_vertex(origin + u * s + v * t);
        }
    }
    let row = nu as usize + 1;
    for j in 0..nv as usize {
        for i in 0..nu as usize {
            let a = j * row + i;
            patch.add_triangle(a, a + 1, a + row + 1);
            patch.add_triangle(a, a + row + 1, a + row);
        }
    }
    patch
}

/// Number of divisions of a straight edge at a target element size.
pub fn divisions(length: f64, size: f64) -> u32 {
    if size <= 0.0 {
        return 1;
    }
    ((length / size).ceil() as u32).clamp(1, config::constants::MAX_SEGMENTS)
}
