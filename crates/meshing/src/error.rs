//! Error types for grid allocation and extraction.

use maquette_config::ALLOWED_RESOLUTIONS;

/// Errors from the sampling and extraction layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeshingError {
    #[error("resolution {0} is not one of the allowed set {allowed:?}", allowed = ALLOWED_RESOLUTIONS)]
    InvalidResolution(u32),
}
