//! Wall Asset - icon metadata and image loading
//!
//! Everything the wall needs from the outside world before a body exists:
//!
//! - [`IconManifest`]: the desired item list and background frames (JSON)
//! - [`ImageLoader`]: async byte source for icon and background references
//! - [`load_image`] / [`load_icons`]: timeout-bounded decode, best-effort bulk load
//! - [`extract_outline`]: collision outline from an icon's alpha channel

pub mod error;
pub mod loader;
pub mod manifest;
pub mod outline;

pub mod prelude {
    //! Types most callers need
    pub use crate::error::{AssetError, Result};
    pub use crate::loader::{FsImageLoader, ImageLoader, LoadedIcon, MemoryImageLoader};
    pub use crate::manifest::{Frame, IconManifest, IconMeta};
}

pub use loader::{load_icons, load_image, DEFAULT_LOAD_TIMEOUT};
pub use manifest::is_hex_color;
pub use outline::extract_outline;
pub use prelude::*;
