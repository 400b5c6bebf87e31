//! Wall Physics
//!
//! Rigid-body simulation behind the icon wall, on top of Rapier 2D. Units are
//! canvas pixels with y pointing down.
//!
//! Bodies are convex hulls of icon outlines, centred on their centroid. Next
//! to Rapier's own state the world records each body's base hull, current
//! scale and moment of inertia. Writing [`LOCKED_INERTIA`] as the inertia
//! locks rotation; writing any finite value back unlocks it.
//!
//! ```text
//!  BodyDesc ──create_body──▶ PhysicsWorld ──query()──▶ BodyQuery
//!                             │  rapier sets + records
//!  pointer ──begin_drag/drag_to──▶ DragConstraint ──▶ step()
//! ```
//!
//! ```ignore
//! use wall_physics::prelude::*;
//!
//! let mut world = PhysicsWorld::new(PhysicsConfig::default());
//! let icon = world.create_body(
//!     BodyDesc::dynamic(BodyShape::rectangle(40.0, 40.0))
//!         .with_label("rust")
//!         .with_position(100.0, 0.0),
//! )?;
//! world.set_inertia(icon, LOCKED_INERTIA)?;
//! world.step(1.0 / 60.0);
//! assert_eq!(world.query().first_dynamic_at([100.0, 5.0]).map(|h| h.body), Some(icon));
//! ```

pub mod body;
pub mod config;
pub mod constraint;
pub mod error;
pub mod material;
pub mod query;
pub mod shape;
pub mod world;

pub mod prelude {
    //! Types most callers need
    pub use crate::body::{BodyDesc, BodyHandle, BodyKind, BodyState};
    pub use crate::config::PhysicsConfig;
    pub use crate::constraint::DragConstraint;
    pub use crate::error::{PhysicsError, Result};
    pub use crate::material::PhysicsMaterial;
    pub use crate::query::{BodyQuery, PointHit};
    pub use crate::shape::{Aabb, BodyShape, Point};
    pub use crate::world::{PhysicsWorld, LOCKED_INERTIA};
}

pub use prelude::*;
