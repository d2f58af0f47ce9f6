//! Fixed-bounds, fixed-resolution lattice sampling of a signed-distance field.

use crate::error::MeshingError;
use glam::Vec3;
use maquette_config::is_allowed_resolution;
use moulding::SdfField;
use tracing::debug;

/// Axis-aligned sampling bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }
}

/// A `resolution^3` lattice of field samples over `bounds`.
///
/// Values are indexed `x + y * res + z * res^2`; the lattice spacing is
/// per-axis `(max - min) / (resolution - 1)`. Rebuilt from scratch on every
/// regeneration, never updated incrementally.
#[derive(Debug, Clone)]
pub struct VoxelGrid {
    resolution: u32,
    bounds: Aabb,
    spacing: Vec3,
    values: Vec<f32>,
}

impl VoxelGrid {
    /// Allocate an empty grid. Rejects resolutions outside the allowed set
    /// before any allocation happens.
    pub fn new(resolution: u32, bounds: Aabb) -> Result<Self, MeshingError> {
        if !is_allowed_resolution(resolution) {
            return Err(MeshingError::InvalidResolution(resolution));
        }
        let spacing = (bounds.max - bounds.min) / (resolution as f32 - 1.0);
        Ok(Self {
            resolution,
            bounds,
            spacing,
            values: vec![0.0; (resolution as usize).pow(3)],
        })
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn spacing(&self) -> Vec3 {
        self.spacing
    }

    /// Sample `field` at every lattice vertex. Synchronous bulk fill,
    /// `resolution^3` evaluations.
    pub fn fill(&mut self, field: &impl SdfField) {
        let res = self.resolution as usize;
        for z in 0..res {
            for y in 0..res {
                for x in 0..res {
                    let position = self.position(x as f32, y as f32, z as f32);
                    self.values[x + y * res + z * res * res] = field.evaluate_sdf(position);
                }
            }
        }
        debug!(resolution = self.resolution, "filled voxel grid");
    }

    /// Field value at a lattice vertex.
    #[inline]
    pub fn value(&self, x: u32, y: u32, z: u32) -> f32 {
        let res = self.resolution as usize;
        self.values[x as usize + y as usize * res + z as usize * res * res]
    }

    /// World position of a lattice coordinate. Fractional coordinates give
    /// positions inside cells (e.g. `x + 0.5` for a cell center).
    #[inline]
    pub fn position(&self, x: f32, y: f32, z: f32) -> Vec3 {
        self.bounds.min + self.spacing * Vec3::new(x, y, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PlaneField;

    impl SdfField for PlaneField {
        fn evaluate_sdf(&self, point: Vec3) -> f32 {
            point.y
        }
    }

    fn unit_bounds() -> Aabb {
        Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0))
    }

    #[test]
    fn test_rejects_disallowed_resolution() {
        assert_eq!(
            VoxelGrid::new(100, unit_bounds()).unwrap_err(),
            MeshingError::InvalidResolution(100)
        );
    }

    #[test]
    fn test_spacing_is_per_axis() {
        let bounds = Aabb::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 2.0, 4.0));
        let grid = VoxelGrid::new(32, bounds).expect("grid");
        let expected = Vec3::new(1.0, 2.0, 4.0) / 31.0;
        assert!(grid.spacing().abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn test_lattice_spans_bounds_exactly() {
        let grid = VoxelGrid::new(32, unit_bounds()).expect("grid");
        assert!(grid.position(0.0, 0.0, 0.0).abs_diff_eq(Vec3::splat(-1.0), 1e-6));
        assert!(grid.position(31.0, 31.0, 31.0).abs_diff_eq(Vec3::splat(1.0), 1e-5));
    }

    #[test]
    fn test_fill_samples_field_at_vertices() {
        let mut grid = VoxelGrid::new(32, unit_bounds()).expect("grid");
        grid.fill(&PlaneField);
        // Bottom layer is at y = -1, top layer at y = +1
        assert!((grid.value(0, 0, 0) + 1.0).abs() < 1e-6);
        assert!((grid.value(5, 31, 7) - 1.0).abs() < 1e-5);
    }
}
