//! Vertex/index/normal buffers produced by surface extraction.

use glam::Vec3;

/// An extracted triangle mesh.
///
/// Every index is a valid vertex index; when `normals` is non-empty it has
/// one entry per vertex. Produced fresh on each regeneration.
#[derive(Debug, Clone, Default)]
pub struct MeshBuffers {
    pub vertices: Vec<Vec3>,
    pub indices: Vec<u32>,
    pub normals: Vec<Vec3>,
}

impl MeshBuffers {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Recompute per-vertex normals by accumulating area-weighted face
    /// normals at shared vertices.
    pub fn compute_smooth_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.vertices.len()];

        for triangle in self.indices.chunks_exact(3) {
            let [i0, i1, i2] = [triangle[0] as usize, triangle[1] as usize, triangle[2] as usize];
            let v0 = self.vertices[i0];
            let v1 = self.vertices[i1];
            let v2 = self.vertices[i2];

            // Cross product length is twice the triangle area, so large
            // faces weigh more in the average
            let face = (v1 - v0).cross(v2 - v0);
            normals[i0] += face;
            normals[i1] += face;
            normals[i2] += face;
        }

        for normal in &mut normals {
            *normal = normal.normalize_or_zero();
        }
        self.normals = normals;
    }

    /// Flat `[x, y, z, ...]` view of the vertex positions.
    pub fn vertex_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Flat `[x, y, z, ...]` view of the normals.
    pub fn normal_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.normals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> MeshBuffers {
        MeshBuffers {
            vertices: vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            indices: vec![0, 1, 2, 0, 2, 3],
            normals: Vec::new(),
        }
    }

    #[test]
    fn test_smooth_normals_for_planar_quad() {
        let mut mesh = quad();
        mesh.compute_smooth_normals();
        assert_eq!(mesh.normals.len(), 4);
        for n in &mesh.normals {
            assert!(n.abs_diff_eq(Vec3::Z, 1e-6));
        }
    }

    #[test]
    fn test_counts() {
        let mesh = quad();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert!(!mesh.is_empty());
    }

    #[test]
    fn test_vertex_floats_layout() {
        let mesh = quad();
        let floats = mesh.vertex_floats();
        assert_eq!(floats.len(), 12);
        assert_eq!(&floats[3..6], &[1.0, 0.0, 0.0]);
    }
}
