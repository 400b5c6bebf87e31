//! Wall error types

use thiserror::Error;
use wall_asset::AssetError;
use wall_layout::LayoutError;
use wall_render::RenderError;

/// Errors surfaced by the wall handle and binary
#[derive(Debug, Error)]
pub enum WallError {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for wall operations
pub type Result<T> = std::result::Result<T, WallError>;
