//! Asset error types

use std::time::Duration;
use thiserror::Error;

/// Asset loading errors
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Image load timed out after {timeout:?}: {reference}")]
    ImageLoadTimeout { reference: String, timeout: Duration },

    #[error("Image load failed: {reference}: {reason}")]
    ImageLoadFailed { reference: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid manifest: {0}")]
    Manifest(String),
}

impl AssetError {
    pub(crate) fn failed(reference: &str, reason: impl ToString) -> Self {
        Self::ImageLoadFailed {
            reference: reference.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<serde_json::Error> for AssetError {
    fn from(err: serde_json::Error) -> Self {
        Self::Manifest(err.to_string())
    }
}

/// Result type for asset operations
pub type Result<T> = std::result::Result<T, AssetError>;
