use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use gridcache::layout::{ElementLocator, GridLayout, Rect};
use gridcache::store::MemoryAssetStore;
use gridcache::thumbnails::TrackingImageCache;
use gridcache::{AssetHandle, GridConfig, MediaGrid, MediaKind, TargetSize, ViewRenderer};

/// Number of assets in the scripted library.
const LIBRARY_SIZE: usize = 240;

/// Height of the simulated screen in points.
const SCREEN_HEIGHT: f64 = 568.0;

/// Renderer that keeps item geometry in a `GridLayout` and logs updates.
struct LoggingRenderer {
    layout: GridLayout,
}

impl ElementLocator for LoggingRenderer {
    fn indices_in_rect(&self, rect: Rect) -> Vec<usize> {
        self.layout.indices_in_rect(rect)
    }
}

impl ViewRenderer for LoggingRenderer {
    fn delete_items(&mut self, indices: &[usize]) {
        self.layout.item_count = self.layout.item_count.saturating_sub(indices.len());
        info!(?indices, "delete");
    }

    fn insert_items(&mut self, indices: &[usize]) {
        self.layout.item_count += indices.len();
        info!(?indices, "insert");
    }

    fn reload_items(&mut self, indices: &[usize]) {
        info!(?indices, "reload");
    }

    fn move_item(&mut self, from: usize, to: usize) {
        info!(from, to, "move");
    }

    fn reload_all(&mut self) {
        info!(items = self.layout.item_count, "reload all");
    }
}

fn library() -> Vec<AssetHandle> {
    (0..LIBRARY_SIZE)
        .map(|i| {
            let ext = if i % 7 == 0 { "mp4" } else { "jpg" };
            let kind = MediaKind::from_extension(ext).unwrap_or(MediaKind::Image);
            AssetHandle::new(format!("IMG_{i:04}.{ext}"), kind)
        })
        .collect()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gridcache=info".parse().context("invalid log directive")?),
        )
        .init();

    let store = Arc::new(MemoryAssetStore::new(library()).context("building demo library")?);
    let cache = Arc::new(TrackingImageCache::default());

    // Leading capture cell plus every asset
    let layout = GridLayout::new(4, 1.0, 320.0).with_item_count(LIBRARY_SIZE + 1);
    let config = GridConfig::builder()
        .leading_placeholder(true)
        .target_size(TargetSize::for_tile(layout.tile_side(), 2.0))
        .build();

    let mut grid = MediaGrid::new(
        Arc::clone(&store),
        Arc::clone(&cache),
        LoggingRenderer { layout },
        config,
    )
    .context("loading media grid")?;

    for step in 0..12 {
        let viewport = Rect::new(0.0, step as f64 * 150.0, 320.0, SCREEN_HEIGHT);
        if let Some(delta) = grid.on_scroll(viewport) {
            info!(
                y = viewport.y,
                started = delta.started.len(),
                stopped = delta.stopped.len(),
                cached = cache.len(),
                "scrolled"
            );
        }
    }

    let producer = {
        let store = Arc::clone(&store);
        thread::spawn(move || -> Result<()> {
            store
                .insert(0, AssetHandle::image("IMG_new.jpg"))
                .context("inserting new asset")?;
            store.remove(&AssetHandle::image("IMG_0003.jpg"));
            store.move_asset(10, 2);
            store.mark_changed(&AssetHandle::image("IMG_0005.jpg"));
            Ok(())
        })
    };

    while !producer.is_finished() {
        grid.pump_changes();
        thread::sleep(Duration::from_millis(1));
    }
    producer
        .join()
        .map_err(|_| anyhow::anyhow!("store producer panicked"))??;
    grid.pump_changes();

    info!(
        version = grid.version(),
        assets = grid.current_sequence().len(),
        cached = cache.len(),
        "session finished"
    );

    grid.on_scroll(Rect::new(0.0, 0.0, 320.0, SCREEN_HEIGHT));
    info!(cached = cache.len(), "re-preheated after changes");

    Ok(())
}
