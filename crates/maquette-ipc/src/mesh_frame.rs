//! The binary mesh frame: a 12-byte little-endian header of three `u32`
//! byte lengths (vertex, index, normal), followed by packed `f32` position
//! triples, `u32` triangle indices, and `f32` normal triples. A zero normal
//! length means "recompute locally".

use crate::error::IpcError;

const HEADER_BYTES: usize = 12;

/// An owned, decoded mesh frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshFrame {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
    pub normals: Vec<f32>,
}

/// A zero-copy view into a mesh frame buffer. Only available when the
/// buffer's payload sections are 4-byte aligned.
#[derive(Debug, Clone, Copy)]
pub struct MeshFrameView<'a> {
    pub vertices: &'a [f32],
    pub indices: &'a [u32],
    pub normals: &'a [f32],
}

/// Encode vertex, index, and normal buffers into a framed byte vector.
pub fn encode_mesh_frame(vertices: &[f32], indices: &[u32], normals: &[f32]) -> Vec<u8> {
    let vertex_bytes: &[u8] = bytemuck::cast_slice(vertices);
    let index_bytes: &[u8] = bytemuck::cast_slice(indices);
    let normal_bytes: &[u8] = bytemuck::cast_slice(normals);

    let mut buffer =
        Vec::with_capacity(HEADER_BYTES + vertex_bytes.len() + index_bytes.len() + normal_bytes.len());
    buffer.extend_from_slice(&(vertex_bytes.len() as u32).to_le_bytes());
    buffer.extend_from_slice(&(index_bytes.len() as u32).to_le_bytes());
    buffer.extend_from_slice(&(normal_bytes.len() as u32).to_le_bytes());
    buffer.extend_from_slice(vertex_bytes);
    buffer.extend_from_slice(index_bytes);
    buffer.extend_from_slice(normal_bytes);
    buffer
}

/// Split a frame into its three payload byte sections after validating the
/// header lengths.
fn split_sections(bytes: &[u8]) -> Result<[&[u8]; 3], IpcError> {
    if bytes.len() < HEADER_BYTES {
        return Err(IpcError::Truncated {
            needed: HEADER_BYTES,
            have: bytes.len(),
        });
    }
    let vertex_len = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
    let index_len = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
    let normal_len = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;

    let needed = HEADER_BYTES + vertex_len + index_len + normal_len;
    if bytes.len() < needed {
        return Err(IpcError::Truncated {
            needed,
            have: bytes.len(),
        });
    }
    for length in [vertex_len, index_len, normal_len] {
        if length % 4 != 0 {
            return Err(IpcError::MisalignedSection { length, element: 4 });
        }
    }

    let payload = &bytes[HEADER_BYTES..];
    let (vertex_bytes, rest) = payload.split_at(vertex_len);
    let (index_bytes, rest) = rest.split_at(index_len);
    let normal_bytes = &rest[..normal_len];
    Ok([vertex_bytes, index_bytes, normal_bytes])
}

/// Decode a frame into owned buffers. Works for any byte alignment.
pub fn decode_mesh_frame(bytes: &[u8]) -> Result<MeshFrame, IpcError> {
    let [vertex_bytes, index_bytes, normal_bytes] = split_sections(bytes)?;
    Ok(MeshFrame {
        vertices: bytemuck::pod_collect_to_vec(vertex_bytes),
        indices: bytemuck::pod_collect_to_vec(index_bytes),
        normals: bytemuck::pod_collect_to_vec(normal_bytes),
    })
}

/// Decode a frame as zero-copy slices into `bytes`.
///
/// Fails with [`IpcError::UnalignedBuffer`] when the buffer does not place
/// the payload on a 4-byte boundary; callers fall back to
/// [`decode_mesh_frame`] in that case.
pub fn decode_mesh_frame_view(bytes: &[u8]) -> Result<MeshFrameView<'_>, IpcError> {
    let [vertex_bytes, index_bytes, normal_bytes] = split_sections(bytes)?;
    Ok(MeshFrameView {
        vertices: bytemuck::try_cast_slice(vertex_bytes).map_err(|_| IpcError::UnalignedBuffer)?,
        indices: bytemuck::try_cast_slice(index_bytes).map_err(|_| IpcError::UnalignedBuffer)?,
        normals: bytemuck::try_cast_slice(normal_bytes).map_err(|_| IpcError::UnalignedBuffer)?,
    })
}
