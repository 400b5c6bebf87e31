//! Icon manifest
//!
//! JSON document listing the icons that may appear on the wall and the
//! background frames that can sit behind them.

use crate::error::{AssetError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Metadata for one icon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconMeta {
    /// Unique name, also the body label
    pub name: String,
    pub width: f32,
    pub height: f32,
    /// Collision outline in image-pixel coordinates
    #[serde(default)]
    pub polygon: Vec<[f32; 2]>,
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default)]
    pub rotation_locked: bool,
    /// Explicit image reference; defaults to `resource/<name>.png`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

fn default_scale() -> f32 {
    1.0
}

impl IconMeta {
    pub fn new(name: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            polygon: Vec::new(),
            scale: 1.0,
            rotation_locked: false,
            image: None,
        }
    }

    pub fn with_polygon(mut self, polygon: Vec<[f32; 2]>) -> Self {
        self.polygon = polygon;
        self
    }

    /// Reference handed to the image loader
    pub fn image_reference(&self) -> String {
        self.image
            .clone()
            .unwrap_or_else(|| format!("resource/{}.png", self.name))
    }
}

/// Background frame descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub name: String,
    /// `#RRGGBB` colour or image reference
    pub background: String,
    #[serde(default)]
    pub left: f32,
    #[serde(default)]
    pub right: f32,
}

impl Frame {
    pub fn new(name: impl Into<String>, background: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            background: background.into(),
            left: 0.0,
            right: 0.0,
        }
    }

    /// Whether the background is a flat colour rather than an image
    pub fn is_color(&self) -> bool {
        is_hex_color(&self.background)
    }
}

/// True for exactly `#` followed by six hex digits
pub fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Icons and frames available to the wall
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IconManifest {
    #[serde(default)]
    pub icons: Vec<IconMeta>,
    #[serde(default)]
    pub frames: Vec<Frame>,
}

impl IconManifest {
    pub fn from_json(json: &str) -> Result<Self> {
        let manifest: Self = serde_json::from_str(json)?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        log::debug!("Loaded manifest from {}", path.display());
        Self::from_json(&json)
    }

    pub fn find(&self, name: &str) -> Option<&IconMeta> {
        self.icons.iter().find(|icon| icon.name == name)
    }

    fn validate(&self) -> Result<()> {
        for icon in &self.icons {
            if icon.name.is_empty() {
                return Err(AssetError::Manifest("icon with empty name".into()));
            }
            if !(icon.width > 0.0 && icon.height > 0.0) {
                return Err(AssetError::Manifest(format!(
                    "icon '{}' has non-positive size {}x{}",
                    icon.name, icon.width, icon.height
                )));
            }
        }
        Ok(())
    }
}
