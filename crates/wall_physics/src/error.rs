//! Physics error types

use crate::body::BodyHandle;
use thiserror::Error;

/// Errors raised by the physics world
#[derive(Debug, Error)]
pub enum PhysicsError {
    #[error("No body for handle {0:?}")]
    BodyNotFound(BodyHandle),

    #[error("Invalid physics configuration: {0}")]
    InvalidConfig(String),

    /// Outline whose hull has no area
    #[error("Outline of {points} points encloses no area")]
    DegenerateOutline { points: usize },

    /// Rapier refused the hull
    #[error("Failed to create collision shape: {0}")]
    ShapeCreationFailed(String),
}

/// Result type for physics operations
pub type Result<T> = std::result::Result<T, PhysicsError>;
