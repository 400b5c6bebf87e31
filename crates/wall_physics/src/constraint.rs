//! Pointer drag constraint

use crate::body::BodyHandle;
use crate::shape::Point;

/// Spring-like link between a point on a body and the pointer position.
///
/// Each fixed step moves the grabbed point `stiffness` of the way toward the
/// target by overriding the body's linear velocity.
#[derive(Debug, Clone)]
pub struct DragConstraint {
    /// Stiffness in `(0, 1]`
    pub stiffness: f32,
    grab: Option<Grab>,
}

#[derive(Debug, Clone, Copy)]
struct Grab {
    body: BodyHandle,
    anchor: Point,
    target: Point,
}

impl DragConstraint {
    pub fn new(stiffness: f32) -> Self {
        Self {
            stiffness: stiffness.clamp(0.0, 1.0),
            grab: None,
        }
    }

    /// Attach to `body` at the body-local `anchor`
    pub fn attach(&mut self, body: BodyHandle, anchor: Point, target: Point) {
        self.grab = Some(Grab { body, anchor, target });
    }

    /// Move the pointer end of the spring
    pub fn set_target(&mut self, target: Point) {
        if let Some(grab) = &mut self.grab {
            grab.target = target;
        }
    }

    pub fn release(&mut self) {
        self.grab = None;
    }

    /// Grabbed body, if any
    pub fn body(&self) -> Option<BodyHandle> {
        self.grab.map(|g| g.body)
    }

    pub(crate) fn anchor(&self) -> Option<(BodyHandle, Point, Point)> {
        self.grab.map(|g| (g.body, g.anchor, g.target))
    }
}

impl Default for DragConstraint {
    fn default() -> Self {
        Self::new(0.2)
    }
}
