//! One regeneration pass: rebuild mould frames, fill the grid, extract.

use crate::error::EngineError;
use maquette_config::SamplingBounds;
use meshing::voxel_grid::Aabb;
use meshing::{MeshBuffers, SurfaceStrategy, VoxelGrid, extract_surface};
use moulding::MouldManager;
use tracing::debug;

/// Run a full field-to-mesh pass at the given resolution.
///
/// Synchronous on the caller's task; the scheduler guarantees passes of the
/// same kind never overlap.
pub fn regenerate(
    manager: &mut MouldManager,
    bounds: &SamplingBounds,
    resolution: u32,
    strategy: SurfaceStrategy,
    fast_mode: bool,
) -> Result<MeshBuffers, EngineError> {
    manager.rebuild_transforms()?;

    let aabb = Aabb::new(bounds.min_vec3(), bounds.max_vec3());
    let mut grid = VoxelGrid::new(resolution, aabb)?;
    grid.fill(&*manager);

    let mesh = extract_surface(&grid, &*manager, strategy, fast_mode);
    debug!(
        resolution,
        fast_mode,
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "regeneration pass"
    );
    Ok(mesh)
}
