//! Error types for skeleton and mould construction and mutation.
//!
//! These are programmer errors: a malformed skeleton or profile corrupts
//! every subsequent field evaluation, so they surface immediately instead of
//! being swallowed.

/// Errors from skeleton and mould operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MouldingError {
    #[error("unknown joint: {0}")]
    UnknownJoint(String),

    #[error("unknown mould: {0}")]
    UnknownMould(String),

    #[error("duplicate joint id: {0}")]
    DuplicateId(String),

    #[error("adding joint {0} would create a cycle")]
    Cycle(String),

    #[error("invalid radial profile: {0}")]
    InvalidProfile(String),
}
