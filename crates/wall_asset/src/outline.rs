//! Collision outline extraction from an icon's alpha channel

use image::RgbaImage;

/// Trace the silhouette of the non-transparent pixels.
///
/// Every `step`-th row (and the last row) contributes its leftmost and
/// rightmost opaque pixel. The outline runs down the right edge and back up
/// the left edge, in image-pixel coordinates. Fully transparent images give
/// an empty outline.
pub fn extract_outline(image: &RgbaImage, step: u32) -> Vec<[f32; 2]> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Vec::new();
    }
    let step = step.max(1) as usize;

    let mut rows: Vec<u32> = (0..height).step_by(step).collect();
    if rows.last() != Some(&(height - 1)) {
        rows.push(height - 1);
    }

    let mut right = Vec::new();
    let mut left = Vec::new();
    for y in rows {
        let opaque = |x: &u32| image.get_pixel(*x, y)[3] > 0;
        let first = (0..width).find(opaque);
        let last = (0..width).rev().find(opaque);
        if let (Some(l), Some(r)) = (first, last) {
            left.push([l as f32, y as f32]);
            right.push([r as f32, y as f32]);
        }
    }

    right.extend(left.into_iter().rev());
    right
}
