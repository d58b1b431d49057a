//! Error types

use thiserror::Error;

/// Shared error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Photo {0} is approved; its label can no longer be edited")]
    PhotoApproved(String),

    #[error("Photo not found: {0}")]
    PhotoNotFound(String),
}

/// Result alias
pub type Result<T> = std::result::Result<T, Error>;
