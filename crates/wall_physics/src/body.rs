//! Rigid body types

use crate::material::PhysicsMaterial;
use crate::shape::{BodyShape, Point};
use rapier2d::prelude as rapier;
use serde::{Deserialize, Serialize};

/// Opaque id of a body; stays valid until the body is removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub(crate) rapier::RigidBodyHandle);

/// Whether the solver moves the body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BodyKind {
    /// Container walls: immovable and never picked
    Static,
    /// Icons
    #[default]
    Dynamic,
}

impl From<BodyKind> for rapier::RigidBodyType {
    fn from(kind: BodyKind) -> Self {
        match kind {
            BodyKind::Static => rapier::RigidBodyType::Fixed,
            BodyKind::Dynamic => rapier::RigidBodyType::Dynamic,
        }
    }
}

/// Everything needed to put one body into the world
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyDesc {
    pub kind: BodyKind,
    /// Collision shape
    pub shape: BodyShape,
    /// Label carried by the body (the item name for icon bodies)
    pub label: String,
    /// Initial position of the centroid
    pub position: Point,
    /// Initial angle in radians
    pub angle: f32,
    /// Surface material
    pub material: PhysicsMaterial,
}

impl BodyDesc {
    /// Immovable boundary piece
    pub fn fixed(shape: BodyShape) -> Self {
        Self {
            kind: BodyKind::Static,
            shape,
            label: String::new(),
            position: [0.0, 0.0],
            angle: 0.0,
            material: PhysicsMaterial::boundary(),
        }
    }

    /// Falling icon body
    pub fn dynamic(shape: BodyShape) -> Self {
        Self {
            kind: BodyKind::Dynamic,
            shape,
            label: String::new(),
            position: [0.0, 0.0],
            angle: 0.0,
            material: PhysicsMaterial::default(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Centroid position in canvas pixels
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = [x, y];
        self
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_material(mut self, material: PhysicsMaterial) -> Self {
        self.material = material;
        self
    }

    pub(crate) fn rigid_body(&self) -> rapier::RigidBodyBuilder {
        rapier::RigidBodyBuilder::new(self.kind.into())
            .translation(rapier::Vector::new(self.position[0], self.position[1]))
            .rotation(self.angle)
    }
}

/// Snapshot of a body's simulated state
#[derive(Debug, Clone, PartialEq)]
pub struct BodyState {
    pub kind: BodyKind,
    pub label: String,
    pub position: Point,
    pub angle: f32,
    pub linear_velocity: Point,
    pub angular_velocity: f32,
    /// Current moment of inertia; [`crate::LOCKED_INERTIA`] when rotation is locked
    pub inertia: f32,
    /// Geometry scale relative to the base hull
    pub scale: f32,
}

impl BodyState {
    pub fn is_static(&self) -> bool {
        self.kind == BodyKind::Static
    }
}
