//! Content-digest error types

use thiserror::Error;

/// Failures while computing a file's content digest.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum HashError {
    #[error("cannot open {path}: {message}")]
    Open { path: String, message: String },

    /// The file's modification time changed between the start and the end
    /// of hashing, so the digest does not correspond to any single
    /// coherent state. Reported, never retried.
    #[error("file modified while hashing: {path}")]
    ConcurrentModification { path: String },

    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("invalid digest: {message}")]
    InvalidDigest { message: String },
}

impl HashError {
    /// Convert an `io::Error` into a read failure with an associated path
    #[must_use]
    pub fn from_io_read(err: &std::io::Error, path: &std::path::Path) -> Self {
        Self::Read {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}
