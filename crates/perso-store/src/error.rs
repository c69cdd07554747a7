//! Store error types.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Store error type.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid store path: {}", .0.display())]
    InvalidPath(PathBuf),

    #[error("corrupt store file {}: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("patch must be a JSON object")]
    InvalidPatch,

    #[error("lock expiry out of range for owner {0}")]
    LockOutOfRange(String),

    #[error("owner {owner_id} already has {max} records")]
    CapacityExceeded { owner_id: String, max: usize },
}

/// Result type alias using StoreError.
pub type StoreResult<T> = Result<T, StoreError>;
