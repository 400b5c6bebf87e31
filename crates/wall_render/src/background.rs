//! Wall background

use image::Rgba;
use wall_asset::is_hex_color;

/// What sits behind the icons
#[derive(Debug, Clone, PartialEq)]
pub enum Background {
    /// Flat colour painted straight into the canvas
    Color(Rgba<u8>),
    /// Image reference composited under the canvas at capture time
    Image(String),
}

impl Background {
    /// `#RRGGBB` becomes a colour, anything else an image reference
    pub fn parse(reference: &str) -> Self {
        match parse_hex_color(reference) {
            Some(color) => Self::Color(color),
            None => Self::Image(reference.to_string()),
        }
    }

    pub fn is_color(&self) -> bool {
        matches!(self, Self::Color(_))
    }

    /// Colour the live canvas is cleared to
    pub fn canvas_fill(&self) -> Rgba<u8> {
        match self {
            Self::Color(color) => *color,
            Self::Image(_) => Rgba([0, 0, 0, 0]),
        }
    }
}

impl Default for Background {
    fn default() -> Self {
        Self::Color(Rgba([255, 255, 255, 255]))
    }
}

/// Parse `#RRGGBB` into an opaque colour
pub fn parse_hex_color(value: &str) -> Option<Rgba<u8>> {
    if !is_hex_color(value) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&value[i..i + 2], 16).ok();
    Some(Rgba([channel(1)?, channel(3)?, channel(5)?, 255]))
}
