//! Engine-level error type wrapping the layer errors.

use crate::transport::TransportError;
use meshing::MeshingError;
use moulding::MouldingError;

/// Errors surfaced by the engine facade.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Moulding(#[from] MouldingError),

    #[error(transparent)]
    Meshing(#[from] MeshingError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
