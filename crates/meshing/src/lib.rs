//! Maquette sampling and surface extraction
//!
//! This crate turns a signed-distance field into triangle geometry:
//! - [`voxel_grid`] - fixed-bounds lattice sampling of an [`moulding::SdfField`]
//! - [`marching_cubes`] - table-driven isosurface extraction with shared vertices
//! - [`dual_contouring`] - cell-vertex extraction with Newton projection
//! - [`mesh`] - the vertex/index/normal buffers both extractors produce

pub mod dual_contouring;
pub mod error;
pub mod marching_cubes;
pub mod mesh;
pub mod voxel_grid;

pub use dual_contouring::dual_contouring;
pub use error::MeshingError;
pub use marching_cubes::marching_cubes;
pub use mesh::MeshBuffers;
pub use voxel_grid::VoxelGrid;

use moulding::SdfField;
use serde::{Deserialize, Serialize};

/// Which extraction algorithm a regeneration pass uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SurfaceStrategy {
    MarchingCubes,
    #[default]
    DualContouring,
}

/// Extract a surface from a filled grid with the chosen strategy.
///
/// `fast_mode` only affects dual contouring, where it skips the Newton
/// projection of cell vertices; marching cubes ignores it.
pub fn extract_surface(
    grid: &VoxelGrid,
    field: &impl SdfField,
    strategy: SurfaceStrategy,
    fast_mode: bool,
) -> MeshBuffers {
    match strategy {
        SurfaceStrategy::MarchingCubes => marching_cubes(grid, 0.0),
        SurfaceStrategy::DualContouring => dual_contouring(grid, field, 0.0, fast_mode),
    }
}
