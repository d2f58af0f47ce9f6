//! Transport payloads and mesh framing for the Maquette engine boundary.
//!
//! This crate defines the wire shapes exchanged with an external backend:
//! - [`types`] - joint and mould sync payloads plus the mesh request
//! - [`mesh_frame`] - the length-prefixed binary mesh format
//! - [`error`] - codec error types

pub mod error;
pub mod mesh_frame;
pub mod types;

pub use error::IpcError;
pub use mesh_frame::{MeshFrame, MeshFrameView, decode_mesh_frame, decode_mesh_frame_view, encode_mesh_frame};
pub use types::{JointPayload, MeshRequest, MouldPayload, MouldShapeName, QuatPayload, Vec3Payload};
