//! Error types for blogsync.

use std::path::PathBuf;

use thiserror::Error;

/// Application-level errors returned by library functions.
#[derive(Debug, Error)]
pub enum BlogsyncError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Source error: {0}")]
    Source(String),

    #[error("Malformed document {}: {reason}", path.display())]
    MalformedDocument { path: PathBuf, reason: String },

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Store request failed ({status}): {message}")]
    StoreRequestFailed { status: u16, message: String },

    #[error("Slug already taken: {0}")]
    AmbiguousSlug(String),

    #[error("No record with slug: {0}")]
    RecordNotFound(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl BlogsyncError {
    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MalformedDocument {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
