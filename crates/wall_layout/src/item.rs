//! Wall items

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use wall_asset::{extract_outline, IconMeta, LoadedIcon};
use wall_physics::{BodyShape, Point};

/// One icon on the wall
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Unique name; also the body label
    pub name: String,
    pub width: f32,
    pub height: f32,
    /// Ordered collision outline
    pub polygon: Vec<Point>,
    /// Geometry scale relative to the base outline
    pub scale: f32,
    pub rotation_locked: bool,
    #[serde(skip)]
    pub texture: Option<Arc<RgbaImage>>,
}

impl Item {
    pub fn new(name: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            polygon: Vec::new(),
            scale: 1.0,
            rotation_locked: false,
            texture: None,
        }
    }

    pub fn with_polygon(mut self, polygon: Vec<Point>) -> Self {
        self.polygon = polygon;
        self
    }

    pub fn with_texture(mut self, texture: Arc<RgbaImage>) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn from_meta(meta: &IconMeta) -> Self {
        Self {
            name: meta.name.clone(),
            width: meta.width,
            height: meta.height,
            polygon: meta.polygon.clone(),
            scale: meta.scale,
            rotation_locked: meta.rotation_locked,
            texture: None,
        }
    }

    /// Item with its texture; an empty manifest outline is traced from the image
    pub fn from_icon(icon: &LoadedIcon, outline_step: u32) -> Self {
        let mut item = Self::from_meta(&icon.meta).with_texture(icon.image.clone());
        if item.polygon.is_empty() {
            item.polygon = extract_outline(&icon.image, outline_step);
        }
        item
    }

    /// Collision shape: the outline when usable, else the bounding rectangle
    pub fn shape(&self) -> BodyShape {
        if self.polygon.len() >= 3 {
            let outline = BodyShape::polygon(self.polygon.clone());
            if outline.local_hull().is_ok() {
                return outline;
            }
            log::debug!("Item '{}' outline is degenerate, using its rectangle", self.name);
        }
        BodyShape::rectangle(self.width, self.height)
    }
}
