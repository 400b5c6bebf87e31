//! Software canvas

use crate::error::{RenderError, Result};
use image::{ImageFormat, Pixel, Rgba, RgbaImage};
use std::io::Cursor;

/// CPU-side RGBA render target
#[derive(Debug, Clone)]
pub struct Canvas {
    pixels: RgbaImage,
    released: bool,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
            released: false,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Fill every pixel with `color`
    pub fn clear(&mut self, color: Rgba<u8>) {
        for pixel in self.pixels.pixels_mut() {
            *pixel = color;
        }
    }

    /// Draw `texture` centred on `center`, rotated by `angle` radians and
    /// scaled per axis. Nearest-neighbour sampling, source-over blending.
    pub fn draw_sprite(
        &mut self,
        texture: &RgbaImage,
        center: [f32; 2],
        angle: f32,
        x_scale: f32,
        y_scale: f32,
    ) {
        if x_scale <= 0.0 || y_scale <= 0.0 || texture.width() == 0 || texture.height() == 0 {
            return;
        }
        let (tw, th) = (texture.width() as f32, texture.height() as f32);
        let (hw, hh) = (tw * x_scale * 0.5, th * y_scale * 0.5);
        let (sin, cos) = angle.sin_cos();

        // Rotated rectangle extents
        let ex = (hw * cos).abs() + (hh * sin).abs();
        let ey = (hw * sin).abs() + (hh * cos).abs();
        let Some((x0, y0, x1, y1)) = self.clip(center[0] - ex, center[1] - ey, center[0] + ex, center[1] + ey)
        else {
            return;
        };

        for py in y0..y1 {
            for px in x0..x1 {
                let dx = px as f32 + 0.5 - center[0];
                let dy = py as f32 + 0.5 - center[1];
                let u = (dx * cos + dy * sin) / x_scale + tw * 0.5;
                let v = (-dx * sin + dy * cos) / y_scale + th * 0.5;
                if u < 0.0 || v < 0.0 || u >= tw || v >= th {
                    continue;
                }
                let src = *texture.get_pixel(u as u32, v as u32);
                self.pixels.get_pixel_mut(px, py).blend(&src);
            }
        }
    }

    /// Fill a polygon given in canvas coordinates (even-odd rule)
    pub fn fill_polygon(&mut self, points: &[[f32; 2]], color: Rgba<u8>) {
        if points.len() < 3 {
            return;
        }
        let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
        let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
        for p in points {
            min_x = min_x.min(p[0]);
            min_y = min_y.min(p[1]);
            max_x = max_x.max(p[0]);
            max_y = max_y.max(p[1]);
        }
        let Some((x0, y0, x1, y1)) = self.clip(min_x, min_y, max_x, max_y) else {
            return;
        };

        for py in y0..y1 {
            for px in x0..x1 {
                if contains_point(points, [px as f32 + 0.5, py as f32 + 0.5]) {
                    self.pixels.get_pixel_mut(px, py).blend(&color);
                }
            }
        }
    }

    /// Copy of the current pixels
    pub fn snapshot(&self) -> RgbaImage {
        self.pixels.clone()
    }

    /// Encode the current pixels as PNG
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        encode_png(&self.pixels)
    }

    /// Drop the pixel buffer
    pub fn release(&mut self) {
        self.pixels = RgbaImage::new(0, 0);
        self.released = true;
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    fn clip(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Option<(u32, u32, u32, u32)> {
        let (w, h) = (self.width() as f32, self.height() as f32);
        let x0 = min_x.floor().max(0.0);
        let y0 = min_y.floor().max(0.0);
        let x1 = max_x.ceil().min(w);
        let y1 = max_y.ceil().min(h);
        if !(x0 < x1 && y0 < y1) {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }
}

fn contains_point(points: &[[f32; 2]], p: [f32; 2]) -> bool {
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (a, b) = (points[i], points[j]);
        if (a[1] > p[1]) != (b[1] > p[1]) && p[0] < (b[0] - a[0]) * (p[1] - a[1]) / (b[1] - a[1]) + a[0] {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Encode an RGBA image as PNG bytes
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| RenderError::Encode(e.to_string()))?;
    Ok(buffer.into_inner())
}
