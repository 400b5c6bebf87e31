//! Screenshot compositor
//!
//! Flat-colour backgrounds are already painted into the canvas, so the
//! capture is a single-layer encode. Image backgrounds are loaded at capture
//! time, stretched to the canvas size, and the foreground snapshot is drawn
//! over them.

use crate::background::Background;
use crate::canvas::encode_png;
use crate::error::{RenderError, Result};
use image::imageops::{self, FilterType};
use image::RgbaImage;
use std::sync::Arc;
use std::time::Duration;
use wall_asset::{load_image, ImageLoader, DEFAULT_LOAD_TIMEOUT};

/// Produces PNG screenshots of the wall
#[derive(Clone)]
pub struct ScreenshotCompositor {
    loader: Arc<dyn ImageLoader>,
    timeout: Duration,
}

impl ScreenshotCompositor {
    pub fn new(loader: Arc<dyn ImageLoader>) -> Self {
        Self {
            loader,
            timeout: DEFAULT_LOAD_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Encode `foreground` against `background`.
    ///
    /// `foreground` must be taken from the canvas before calling; the live
    /// canvas keeps repainting while the background loads.
    pub async fn capture(&self, foreground: RgbaImage, background: &Background) -> Result<Vec<u8>> {
        match background {
            Background::Color(_) => encode_png(&foreground),
            Background::Image(reference) => self.composite(foreground, reference).await,
        }
    }

    /// Two-layer path: background image under the foreground snapshot
    pub async fn composite(&self, foreground: RgbaImage, reference: &str) -> Result<Vec<u8>> {
        let background = load_image(self.loader.as_ref(), reference, self.timeout)
            .await
            .map_err(|source| {
                log::warn!("Screenshot background '{}' unavailable: {}", reference, source);
                RenderError::ScreenshotCompositeFailure {
                    reference: reference.to_string(),
                    source,
                }
            })?;

        encode_png(&composite_layers(&background, &foreground))
    }
}

/// Stretch `background` to the foreground's size and draw the foreground on top
pub fn composite_layers(background: &RgbaImage, foreground: &RgbaImage) -> RgbaImage {
    let (width, height) = foreground.dimensions();
    let mut out = if background.dimensions() == (width, height) {
        background.clone()
    } else {
        imageops::resize(background, width, height, FilterType::Triangle)
    };
    imageops::overlay(&mut out, foreground, 0, 0);
    out
}
