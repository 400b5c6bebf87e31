//! Image loading
//!
//! Loads are bounded by a timeout; a bulk load is best-effort and drops the
//! icons that fail instead of aborting.

use crate::error::{AssetError, Result};
use crate::manifest::IconMeta;
use futures_util::future::join_all;
use image::RgbaImage;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Default bound for a single image load
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(5);

/// Source of raw image bytes
#[async_trait::async_trait]
pub trait ImageLoader: Send + Sync {
    /// Fetch the encoded bytes behind `reference`
    async fn fetch(&self, reference: &str) -> Result<Vec<u8>>;
}

/// Loads references as paths relative to a root directory
#[derive(Debug, Clone)]
pub struct FsImageLoader {
    root: PathBuf,
}

impl FsImageLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a reference to a filesystem path. `file://` prefixes are accepted.
    pub fn resolve(&self, reference: &str) -> PathBuf {
        let trimmed = reference.strip_prefix("file://").unwrap_or(reference);
        let path = Path::new(trimmed);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

#[async_trait::async_trait]
impl ImageLoader for FsImageLoader {
    async fn fetch(&self, reference: &str) -> Result<Vec<u8>> {
        let path = self.resolve(reference);
        log::trace!("Reading image {}", path.display());
        Ok(tokio::fs::read(&path).await?)
    }
}

/// In-memory loader keyed by reference
#[derive(Debug, Clone, Default)]
pub struct MemoryImageLoader {
    entries: HashMap<String, Arc<Vec<u8>>>,
}

impl MemoryImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register encoded bytes under `reference`
    pub fn with(mut self, reference: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.entries.insert(reference.into(), Arc::new(bytes));
        self
    }
}

#[async_trait::async_trait]
impl ImageLoader for MemoryImageLoader {
    async fn fetch(&self, reference: &str) -> Result<Vec<u8>> {
        self.entries
            .get(reference)
            .map(|bytes| bytes.as_ref().clone())
            .ok_or_else(|| AssetError::failed(reference, "not found"))
    }
}

/// Fetch and decode one image within `timeout`
pub async fn load_image(
    loader: &dyn ImageLoader,
    reference: &str,
    timeout: Duration,
) -> Result<RgbaImage> {
    let load = async {
        let bytes = loader
            .fetch(reference)
            .await
            .map_err(|e| AssetError::failed(reference, e))?;
        let decoded =
            image::load_from_memory(&bytes).map_err(|e| AssetError::failed(reference, e))?;
        Ok::<_, AssetError>(decoded.to_rgba8())
    };

    match tokio::time::timeout(timeout, load).await {
        Ok(result) => result,
        Err(_) => Err(AssetError::ImageLoadTimeout {
            reference: reference.to_string(),
            timeout,
        }),
    }
}

/// An icon whose image decoded successfully
#[derive(Debug, Clone)]
pub struct LoadedIcon {
    pub meta: IconMeta,
    pub image: Arc<RgbaImage>,
}

/// Load every icon concurrently. Failures are logged and left out; the
/// result keeps manifest order.
pub async fn load_icons(
    loader: &dyn ImageLoader,
    metas: &[IconMeta],
    timeout: Duration,
) -> Vec<LoadedIcon> {
    let loads = metas.iter().map(|meta| async move {
        let reference = meta.image_reference();
        (meta, load_image(loader, &reference, timeout).await)
    });

    let mut loaded = Vec::with_capacity(metas.len());
    for (meta, result) in join_all(loads).await {
        match result {
            Ok(image) => loaded.push(LoadedIcon {
                meta: meta.clone(),
                image: Arc::new(image),
            }),
            Err(e) => log::warn!("Skipping icon '{}': {}", meta.name, e),
        }
    }

    log::info!("Loaded {}/{} icons", loaded.len(), metas.len());
    loaded
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([255, 0, 0, 255]));
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    struct SlowLoader;

    #[async_trait::async_trait]
    impl ImageLoader for SlowLoader {
        async fn fetch(&self, _reference: &str) -> Result<Vec<u8>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(png_bytes(1, 1))
        }
    }

    #[test]
    fn test_resolve_strips_file_scheme() {
        let loader = FsImageLoader::new("/srv/icons");
        assert_eq!(loader.resolve("resource/rust.png"), PathBuf::from("/srv/icons/resource/rust.png"));
        assert_eq!(loader.resolve("file:///tmp/bg.png"), PathBuf::from("/tmp/bg.png"));
    }

    #[tokio::test]
    async fn test_load_image_decodes() {
        let loader = MemoryImageLoader::new().with("a.png", png_bytes(4, 3));
        let img = load_image(&loader, "a.png", DEFAULT_LOAD_TIMEOUT).await.unwrap();
        assert_eq!(img.dimensions(), (4, 3));
    }

    #[tokio::test]
    async fn test_missing_and_corrupt_images_fail() {
        let loader = MemoryImageLoader::new().with("bad.png", vec![1, 2, 3]);
        let missing = load_image(&loader, "nope.png", DEFAULT_LOAD_TIMEOUT).await;
        let corrupt = load_image(&loader, "bad.png", DEFAULT_LOAD_TIMEOUT).await;
        assert!(matches!(missing, Err(AssetError::ImageLoadFailed { .. })));
        assert!(matches!(corrupt, Err(AssetError::ImageLoadFailed { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_load_times_out() {
        let result = load_image(&SlowLoader, "slow.png", DEFAULT_LOAD_TIMEOUT).await;
        match result {
            Err(AssetError::ImageLoadTimeout { timeout, .. }) => assert_eq!(timeout, DEFAULT_LOAD_TIMEOUT),
            other => panic!("expected timeout, got {:?}", other.map(|i| i.dimensions())),
        }
    }

    #[tokio::test]
    async fn test_bulk_load_is_best_effort() {
        let loader = MemoryImageLoader::new()
            .with("resource/rust.png", png_bytes(8, 8))
            .with("resource/go.png", png_bytes(6, 6));
        let metas = vec![
            IconMeta::new("rust", 8.0, 8.0),
            IconMeta::new("missing", 8.0, 8.0),
            IconMeta::new("go", 6.0, 6.0),
        ];

        let loaded = load_icons(&loader, &metas, DEFAULT_LOAD_TIMEOUT).await;
        let names: Vec<&str> = loaded.iter().map(|icon| icon.meta.name.as_str()).collect();
        assert_eq!(names, vec!["rust", "go"]);
    }
}
