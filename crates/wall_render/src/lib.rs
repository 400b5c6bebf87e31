//! Wall Render - software rendering for the icon wall
//!
//! The wall draws into a CPU-side RGBA canvas. Each frame is cleared to the
//! flat background colour (transparent when the background is an image) and
//! every body's sprite is blitted on top. Screenshots either encode that
//! canvas as-is or composite it over the background image.

pub mod background;
pub mod canvas;
pub mod compositor;
pub mod error;
pub mod sprite;

pub mod prelude {
    //! Types most callers need
    pub use crate::background::Background;
    pub use crate::canvas::Canvas;
    pub use crate::compositor::ScreenshotCompositor;
    pub use crate::error::{RenderError, Result};
    pub use crate::sprite::Sprite;
}

pub use background::parse_hex_color;
pub use canvas::encode_png;
pub use compositor::composite_layers;
pub use prelude::*;
