//! techwall - render an icon wall to a PNG
//!
//! Run with: cargo run -p wall_runtime -- <manifest.json> [output.png]

use std::sync::Arc;
use wall_asset::{load_icons, FsImageLoader, IconManifest, ImageLoader};
use wall_layout::Item;
use wall_runtime::prelude::*;

const USAGE: &str = "usage: techwall <manifest.json> [output.png]";

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run().await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let manifest_path = args.next().ok_or_else(|| WallError::Config(USAGE.into()))?;
    let output = args.next().unwrap_or_else(|| "techwall.png".to_string());

    let config = WallConfig::load();
    config.validate()?;
    let manifest = IconManifest::from_file(&manifest_path)?;

    let loader: Arc<dyn ImageLoader> = Arc::new(FsImageLoader::new(&config.asset_root));
    let icons = load_icons(loader.as_ref(), &manifest.icons, config.image_timeout()).await;
    let items: Vec<Item> = icons
        .iter()
        .map(|icon| Item::from_icon(icon, config.layout.outline_step))
        .collect();

    let wall = Wall::create(config.clone(), loader)?;
    if let Some(frame) = manifest.frames.first() {
        log::info!("Background frame '{}'", frame.name);
        wall.set_background(&frame.background);
    }

    wall.reconcile(&items)?;
    let plan = wall.rearrange(config.rearrange_period())?;

    // Let every batch land, then let the pile settle
    let drain = config.rearrange_period() * plan.batch_sizes.len() as u32;
    tokio::time::sleep(drain + config.settle_time()).await;

    let png = wall.capture_screenshot().await?;
    tokio::fs::write(&output, &png).await?;
    log::info!("Wrote {} ({} bytes, {} icons)", output, png.len(), items.len());

    wall.dispose();
    Ok(())
}
