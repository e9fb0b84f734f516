//! Thumbnail caching for the grid.
//!
//! This module provides:
//! - `TrackingImageCache` - In-memory preheat cache with LRU eviction

pub mod tracking_cache;

pub use tracking_cache::{CachedEntry, TrackingImageCache};
