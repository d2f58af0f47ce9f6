//! Dual contouring over a filled voxel grid.
//!
//! One vertex per sign-crossing cell, projected toward the zero level set
//! with Newton steps along the field gradient. Quads connect the four cells
//! around each sign-crossing lattice edge, wound by the edge's
//! inside/outside orientation. Fast mode skips the projection and leaves
//! vertices at cell centers, which is what interactive previews use.

use crate::mesh::MeshBuffers;
use crate::voxel_grid::VoxelGrid;
use glam::Vec3;
use moulding::SdfField;
use moulding::sdf::gradient;
use std::collections::HashMap;
use tracing::debug;

const NEWTON_ITERATIONS: usize = 8;
const NEWTON_TOLERANCE: f32 = 1e-3;

/// Extract the `iso` level set of a filled grid, refining cell vertices
/// against `field` unless `fast_mode` is set.
pub fn dual_contouring(
    grid: &VoxelGrid,
    field: &impl SdfField,
    iso: f32,
    fast_mode: bool,
) -> MeshBuffers {
    let res = grid.resolution();
    let mut mesh = MeshBuffers::default();
    let mut cell_vertices: HashMap<(u32, u32, u32), u32> = HashMap::new();

    // One vertex for every cell the surface passes through
    for z in 0..res - 1 {
        for y in 0..res - 1 {
            for x in 0..res - 1 {
                if !cell_crosses_surface(grid, x, y, z, iso) {
                    continue;
                }
                let position = if fast_mode {
                    grid.position(x as f32 + 0.5, y as f32 + 0.5, z as f32 + 0.5)
                } else {
                    project_cell_vertex(grid, field, x, y, z, iso)
                };
                cell_vertices.insert((x, y, z), mesh.vertices.len() as u32);
                mesh.vertices.push(position);
            }
        }
    }

    // A quad for every sign-crossing lattice edge, connecting the four
    // adjacent cell vertices
    for axis in 0..3u8 {
        emit_axis_faces(grid, axis, iso, &cell_vertices, &mut mesh.indices);
    }

    mesh.compute_smooth_normals();
    debug!(
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        fast_mode,
        "dual contouring extraction"
    );
    mesh
}

fn cell_crosses_surface(grid: &VoxelGrid, x: u32, y: u32, z: u32, iso: f32) -> bool {
    let mut has_inside = false;
    let mut has_outside = false;
    for dz in 0..2 {
        for dy in 0..2 {
            for dx in 0..2 {
                if grid.value(x + dx, y + dy, z + dz) < iso {
                    has_inside = true;
                } else {
                    has_outside = true;
                }
            }
        }
    }
    has_inside && has_outside
}

/// Newton-project the cell center onto the isosurface along the gradient.
fn project_cell_vertex(
    grid: &VoxelGrid,
    field: &impl SdfField,
    x: u32,
    y: u32,
    z: u32,
    iso: f32,
) -> Vec3 {
    let mut position = grid.position(x as f32 + 0.5, y as f32 + 0.5, z as f32 + 0.5);

    for _ in 0..NEWTON_ITERATIONS {
        let distance = field.evaluate_sdf(position) - iso;
        if distance.abs() < NEWTON_TOLERANCE {
            break;
        }
        let grad = gradient(position, |p| field.evaluate_sdf(p));
        let grad_len = grad.length();
        if grad_len < 1e-4 {
            break;
        }
        position -= grad * (distance / (grad_len * grad_len));
    }

    position
}

/// Walk every lattice edge along `axis` whose four neighboring cells exist,
/// and emit a quad where the edge crosses the surface.
fn emit_axis_faces(
    grid: &VoxelGrid,
    axis: u8,
    iso: f32,
    cell_vertices: &HashMap<(u32, u32, u32), u32>,
    indices: &mut Vec<u32>,
) {
    let res = grid.resolution();
    // Cyclic frame (axis, u, v) keeps u cross v pointing along +axis, so
    // the quad order below is counterclockwise seen from +axis
    let (u_axis, v_axis) = match axis {
        0 => (1, 2),
        1 => (2, 0),
        _ => (0, 1),
    };

    for a in 0..res - 1 {
        for u in 1..res - 1 {
            for v in 1..res - 1 {
                let mut start = [0u32; 3];
                start[axis as usize] = a;
                start[u_axis] = u;
                start[v_axis] = v;
                let mut end = start;
                end[axis as usize] += 1;

                let v0 = grid.value(start[0], start[1], start[2]);
                let v1 = grid.value(end[0], end[1], end[2]);
                let start_inside = v0 < iso;
                if start_inside == (v1 < iso) {
                    continue;
                }

                let quad = [(-1i64, -1i64), (0, -1), (0, 0), (-1, 0)].map(|(du, dv)| {
                    let mut cell = [0i64; 3];
                    cell[axis as usize] = a as i64;
                    cell[u_axis] = u as i64 + du;
                    cell[v_axis] = v as i64 + dv;
                    let key = (cell[0] as u32, cell[1] as u32, cell[2] as u32);
                    // Every cell touching a crossing edge has a sign change,
                    // so its vertex exists
                    *cell_vertices
                        .get(&key)
                        .expect("cell vertex missing beside crossing edge")
                });

                // Surface faces from inside to outside along the edge
                let ordered = if start_inside {
                    quad
                } else {
                    [quad[3], quad[2], quad[1], quad[0]]
                };
                triangulate_quad(ordered, indices);
            }
        }
    }
}

fn triangulate_quad(quad: [u32; 4], indices: &mut Vec<u32>) {
    // Both diagonals are valid; either triangulation keeps the winding
    indices.extend_from_slice(&[quad[0], quad[1], quad[2]]);
    indices.extend_from_slice(&[quad[0], quad[2], quad[3]]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel_grid::Aabb;
    use std::collections::HashMap;

    struct SphereField {
        radius: f32,
    }

    impl SdfField for SphereField {
        fn evaluate_sdf(&self, point: Vec3) -> f32 {
            point.length() - self.radius
        }
    }

    fn sphere_grid(resolution: u32) -> (VoxelGrid, SphereField) {
        let field = SphereField { radius: 0.5 };
        let bounds = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let mut grid = VoxelGrid::new(resolution, bounds).expect("grid");
        grid.fill(&field);
        (grid, field)
    }

    #[test]
    fn test_sphere_extraction_is_closed() {
        let (grid, field) = sphere_grid(32);
        let mesh = dual_contouring(&grid, &field, 0.0, false);
        assert!(!mesh.is_empty());
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));

        let mut edge_uses: HashMap<(u32, u32), u32> = HashMap::new();
        for t in mesh.indices.chunks_exact(3) {
            for (a, b) in [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])] {
                let key = (a.min(b), a.max(b));
                *edge_uses.entry(key).or_insert(0) += 1;
            }
        }
        assert!(edge_uses.values().all(|&uses| uses == 2));

        let v = mesh.vertex_count() as i64;
        let e = edge_uses.len() as i64;
        let f = mesh.triangle_count() as i64;
        assert_eq!(v - e + f, 2);
    }

    #[test]
    fn test_projection_tightens_vertices() {
        let (grid, field) = sphere_grid(32);
        let fast = dual_contouring(&grid, &field, 0.0, true);
        let projected = dual_contouring(&grid, &field, 0.0, false);
        assert_eq!(fast.vertex_count(), projected.vertex_count());

        let max_error = |mesh: &MeshBuffers| {
            mesh.vertices
                .iter()
                .map(|&v| field.evaluate_sdf(v).abs())
                .fold(0.0f32, f32::max)
        };
        assert!(max_error(&projected) < NEWTON_TOLERANCE * 2.0);
        assert!(max_error(&projected) < max_error(&fast));
    }

    #[test]
    fn test_fast_mode_uses_cell_centers() {
        let (grid, field) = sphere_grid(32);
        let mesh = dual_contouring(&grid, &field, 0.0, true);
        let spacing = grid.spacing();
        let origin = grid.bounds().min + spacing * 0.5;
        for v in &mesh.vertices {
            // Cell centers lie on the half-step lattice
            let steps = (*v - origin) / spacing;
            for value in [steps.x, steps.y, steps.z] {
                assert!((value - value.round()).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn test_normals_face_outward() {
        let (grid, field) = sphere_grid(32);
        let mesh = dual_contouring(&grid, &field, 0.0, false);
        assert_eq!(mesh.normals.len(), mesh.vertex_count());
        for (v, n) in mesh.vertices.iter().zip(&mesh.normals) {
            assert!(n.dot(v.normalize()) > 0.0, "inward normal at {v:?}");
        }
    }

    #[test]
    fn test_empty_field_extracts_nothing() {
        struct Outside;
        impl SdfField for Outside {
            fn evaluate_sdf(&self, _point: Vec3) -> f32 {
                1.0
            }
        }
        let bounds = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let mut grid = VoxelGrid::new(32, bounds).expect("grid");
        grid.fill(&Outside);
        let mesh = dual_contouring(&grid, &Outside, 0.0, false);
        assert!(mesh.is_empty());
    }
}
