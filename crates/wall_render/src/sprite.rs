//! Body sprites

use image::{Rgba, RgbaImage};
use std::sync::Arc;

/// Visual paired with a body
#[derive(Debug, Clone)]
pub struct Sprite {
    /// Icon image; `None` draws the hull with `fill`
    pub texture: Option<Arc<RgbaImage>>,
    pub x_scale: f32,
    pub y_scale: f32,
    pub fill: Rgba<u8>,
}

impl Sprite {
    pub fn new(texture: Option<Arc<RgbaImage>>, scale: f32) -> Self {
        Self {
            texture,
            x_scale: scale,
            y_scale: scale,
            fill: Rgba([96, 96, 96, 255]),
        }
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.x_scale = scale;
        self.y_scale = scale;
    }
}
