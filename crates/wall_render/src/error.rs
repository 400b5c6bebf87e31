//! Render error types

use thiserror::Error;
use wall_asset::AssetError;

/// Rendering errors
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Encoding failed: {0}")]
    Encode(String),

    #[error("Screenshot composite failed for background '{reference}': {source}")]
    ScreenshotCompositeFailure {
        reference: String,
        #[source]
        source: AssetError,
    },
}

/// Result type for render operations
pub type Result<T> = std::result::Result<T, RenderError>;
