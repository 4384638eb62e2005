//! Attribute-store error types

use thiserror::Error;

/// Failures mutating the per-file attribute store.
///
/// Reads never surface here: stored metadata is consumed best-effort and
/// malformed or missing entries degrade to "treat as mismatched" instead
/// of failing the file.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum AttrError {
    #[error("failed to write attribute {key}: {message}")]
    WriteFailed { key: String, message: String },

    #[error("failed to remove attribute {key}: {message}")]
    RemoveFailed { key: String, message: String },
}
