//! Wall Layout - the physics-backed icon wall core
//!
//! A [`Scene`] keeps one rigid body per [`Item`] inside a walled container and
//! offers the operations a host drives it with:
//!
//! - reconcile the wall against a desired item list
//! - rearrange it as a staggered Gaussian "waterfall"
//! - pick, drag and open a context menu on bodies
//! - lock rotation and rescale individual bodies
//!
//! The scene is synchronous. Stepping, rendering and batch release timers are
//! driven from outside (see `wall_runtime`).

pub mod config;
pub mod error;
pub mod interaction;
pub mod item;
pub mod registry;
pub mod scene;
pub mod scheduler;
pub mod transform;

pub mod prelude {
    //! Types most callers need
    pub use crate::config::LayoutConfig;
    pub use crate::error::{LayoutError, Result};
    pub use crate::interaction::{
        ContextMenu, InteractionController, MenuAction, PointerButton, PointerEvent, PointerKind,
        ScaleEdit,
    };
    pub use crate::item::Item;
    pub use crate::registry::{ItemRegistry, RegistryEntry};
    pub use crate::scene::{RearrangePlan, ReconcileReport, ReleaseTick, Scene};
    pub use crate::scheduler::{BatchScheduler, ReleaseSchedule};
    pub use crate::transform::RotationState;
}

pub use prelude::*;
pub use scheduler::{gaussian_weights, partition, segment_sizes};
