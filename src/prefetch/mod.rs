//! Speculative thumbnail caching around the viewport.
//!
//! This module provides:
//! - `ViewportTracker` - Debounced preheat window from scroll positions
//! - `rect_diff::diff` - Regions entering and leaving the window
//! - `IndexResolver` - Regions to asset handles, honoring the index bias
//! - `PrefetchCacheController` - Start/stop requests against the image cache

pub mod controller;
pub mod rect_diff;
pub mod resolver;
pub mod viewport;

pub use controller::{CacheDelta, PrefetchCacheController};
pub use rect_diff::RegionSet;
pub use resolver::IndexResolver;
pub use viewport::{PreheatWindow, ViewportTracker};
