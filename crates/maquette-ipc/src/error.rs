//! Error types for payload serialization and mesh framing.

/// Errors that can occur while encoding or decoding engine payloads.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    #[error("failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("mesh frame truncated: need {needed} bytes, have {have}")]
    Truncated { needed: usize, have: usize },

    #[error("mesh frame section length {length} is not a multiple of {element} bytes")]
    MisalignedSection { length: usize, element: usize },

    #[error("mesh frame payload is not aligned for zero-copy access")]
    UnalignedBuffer,
}
