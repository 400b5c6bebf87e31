//! Wall Runtime - the icon wall as a running service
//!
//! [`Wall`] wraps a [`wall_layout::Scene`] with the tasks that keep it alive
//! and exposes the host-facing operations: reconcile, rearrange, background
//! selection, screenshots, pointer input and disposal.
//!
//! # Example
//!
//! ```ignore
//! let wall = Wall::create(WallConfig::load(), Arc::new(FsImageLoader::new(".")))?;
//! wall.set_background("#1e1e1e");
//! wall.reconcile(&items)?;
//! wall.rearrange(Duration::from_millis(800))?;
//! let png = wall.capture_screenshot().await?;
//! wall.dispose();
//! ```

pub mod config;
pub mod error;
pub mod wall;

pub mod prelude {
    //! Types most callers need
    pub use crate::config::WallConfig;
    pub use crate::error::{Result, WallError};
    pub use crate::wall::Wall;
}

pub use prelude::*;
