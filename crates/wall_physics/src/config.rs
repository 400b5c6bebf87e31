//! Physics configuration

use crate::error::{PhysicsError, Result};
use crate::material::PhysicsMaterial;
use serde::{Deserialize, Serialize};

/// Physics world configuration
///
/// Units are canvas pixels and seconds; y grows downward, so the default
/// gravity points along +y.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity vector in px/s²
    pub gravity: [f32; 2],

    /// Fixed timestep for physics simulation
    pub timestep: f32,

    /// Maximum number of substeps per frame
    pub max_substeps: u32,

    /// Solver iterations for velocity
    pub velocity_iterations: usize,

    /// Material applied to icon bodies
    pub material: PhysicsMaterial,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, 980.0],
            timestep: 1.0 / 60.0,
            max_substeps: 4,
            velocity_iterations: 4,
            material: PhysicsMaterial::default(),
        }
    }
}

impl PhysicsConfig {
    /// Set gravity
    pub fn with_gravity(mut self, x: f32, y: f32) -> Self {
        self.gravity = [x, y];
        self
    }

    /// Set timestep
    pub fn with_timestep(mut self, timestep: f32) -> Self {
        self.timestep = timestep;
        self
    }

    /// Set the icon material
    pub fn with_material(mut self, material: PhysicsMaterial) -> Self {
        self.material = material;
        self
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if !(self.timestep.is_finite() && self.timestep > 0.0) {
            return Err(PhysicsError::InvalidConfig(format!(
                "timestep must be positive, got {}",
                self.timestep
            )));
        }
        if self.velocity_iterations == 0 {
            return Err(PhysicsError::InvalidConfig(
                "velocity_iterations must be at least 1".to_string(),
            ));
        }
        if !(self.material.density.is_finite() && self.material.density > 0.0) {
            return Err(PhysicsError::InvalidConfig(format!(
                "density must be positive, got {}",
                self.material.density
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(PhysicsConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_timestep() {
        let config = PhysicsConfig::default().with_timestep(0.0);
        assert!(matches!(config.validate(), Err(PhysicsError::InvalidConfig(_))));
    }
}
