//! The async boundary to the external backend.
//!
//! A synchronization is two ordered calls, joints then moulds. The engine
//! treats every transport error as recoverable: it logs, keeps the previous
//! mesh and visualization state, and retries only on the next user edit.

use maquette_ipc::{JointPayload, MeshRequest, MouldPayload};

/// Failures at the transport boundary.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("backend unreachable: {0}")]
    Unreachable(String),

    #[error("malformed backend response: {0}")]
    MalformedResponse(String),
}

/// One coalesced unit of outgoing skeleton/mould state.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncPayload {
    pub joints: Vec<JointPayload>,
    pub moulds: Vec<MouldPayload>,
}

/// Backend connection used for state sync and remote mesh generation.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Push the full joint list to the backend.
    async fn send_joints(&mut self, joints: &[JointPayload]) -> Result<(), TransportError>;

    /// Push the full mould list to the backend. Always follows
    /// [`Transport::send_joints`] within one sync.
    async fn send_moulds(&mut self, moulds: &[MouldPayload]) -> Result<(), TransportError>;

    /// Ask the backend to generate a mesh; returns a framed byte buffer in
    /// the `maquette-ipc` mesh format.
    async fn request_mesh(&mut self, request: MeshRequest) -> Result<Vec<u8>, TransportError>;
}
