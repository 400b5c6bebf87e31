//! Layout configuration

use serde::{Deserialize, Serialize};

/// Container, scheduling and interaction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Container width in pixels
    pub width: f32,
    /// Container height in pixels
    pub height: f32,
    /// Thickness of the floor and side walls
    pub wall_thickness: f32,
    /// New bodies spawn at least this far from either side
    pub spawn_margin: f32,
    /// Number of Gaussian segments used by rearrange
    pub segments: usize,
    /// Spread of the Gaussian, in segments
    pub sigma: f64,
    /// Sprite scale at body scale 1
    pub sprite_scale: f32,
    /// Drag spring stiffness
    pub drag_stiffness: f32,
    /// Smallest accepted body scale
    pub min_scale: f32,
    /// Largest accepted body scale
    pub max_scale: f32,
    /// Row step used when tracing icon outlines
    pub outline_step: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 500.0,
            wall_thickness: 100.0,
            spawn_margin: 50.0,
            segments: 10,
            sigma: 2.0,
            sprite_scale: 0.9,
            drag_stiffness: 0.2,
            min_scale: 1.0,
            max_scale: 3.0,
            outline_step: 5,
        }
    }
}

impl LayoutConfig {
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_segments(mut self, segments: usize, sigma: f64) -> Self {
        self.segments = segments;
        self.sigma = sigma;
        self
    }

    /// Offset that puts a wall's inner edge on the container edge
    pub fn wall_pad(&self) -> f32 {
        self.wall_thickness / 2.0 - 1.0
    }

    /// Canvas size in whole pixels
    pub fn canvas_size(&self) -> (u32, u32) {
        (self.width.max(0.0).round() as u32, self.height.max(0.0).round() as u32)
    }
}
