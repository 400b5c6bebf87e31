//! Layout error types

use thiserror::Error;
use wall_physics::PhysicsError;
use wall_render::RenderError;

/// Layout errors
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("Physics error: {0}")]
    Physics(#[from] PhysicsError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Scale {factor} outside [{min}, {max}]")]
    ScaleRejected { factor: f32, min: f32, max: f32 },

    #[error("Unknown item: {0}")]
    UnknownItem(String),

    #[error("Scene has been disposed")]
    Disposed,
}

/// Result type for layout operations
pub type Result<T> = std::result::Result<T, LayoutError>;
