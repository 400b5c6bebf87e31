//! Surface and mass parameters for wall bodies

use serde::{Deserialize, Serialize};

/// Contact response and density of one body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsMaterial {
    pub friction: f32,
    /// 0 keeps icons from bouncing off each other
    pub restitution: f32,
    /// Mass per square pixel; also drives the recorded moment of inertia
    pub density: f32,
}

impl Default for PhysicsMaterial {
    /// Icon material: grippy so stacks settle, light enough to drag
    fn default() -> Self {
        Self {
            friction: 0.8,
            restitution: 0.0,
            density: 0.001,
        }
    }
}

impl PhysicsMaterial {
    /// Floor and side walls. Low friction lets icons slide off the edges.
    pub fn boundary() -> Self {
        Self {
            friction: 0.1,
            restitution: 0.0,
            density: 1.0,
        }
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction.max(0.0);
        self
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }
}
