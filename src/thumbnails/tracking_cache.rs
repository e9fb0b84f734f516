//! In-memory image cache that tracks preheat requests.
//!
//! - Entries are keyed by asset and remember the size and mode they were
//!   requested at
//! - A memory budget bounds the estimated decoded size of all entries; the
//!   least recently requested entries are evicted first
//!
//! No pixels are decoded here. The cache exists so an embedding application
//! (or a test) can see exactly which assets the grid asked to keep warm.

use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::error::CacheError;
use crate::models::AssetHandle;
use crate::providers::{ContentMode, ImageCacheProvider, TargetSize};

/// Default memory budget in megabytes.
const DEFAULT_MAX_MEMORY_MB: usize = 192;

/// Minimum memory budget in megabytes.
const MIN_MEMORY_MB: usize = 16;

/// Maximum memory budget in megabytes.
const MAX_MEMORY_MB: usize = 512;

/// Estimated bytes per pixel for RGBA images.
const BYTES_PER_PIXEL: usize = 4;

/// Upper bound on the number of entries regardless of budget.
const DEFAULT_LRU_CAPACITY: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachedEntry {
    pub size: TargetSize,
    pub mode: ContentMode,
}

impl CachedEntry {
    fn memory_bytes(&self) -> usize {
        self.size.width as usize * self.size.height as usize * BYTES_PER_PIXEL
    }
}

struct CacheState {
    entries: LruCache<AssetHandle, CachedEntry>,
    current_bytes: usize,
    available: bool,
}

pub struct TrackingImageCache {
    state: RwLock<CacheState>,
    max_memory_bytes: usize,
}

impl TrackingImageCache {
    /// Creates a cache with a memory budget, clamped to a sane range.
    pub fn new(max_memory_mb: usize) -> Self {
        let max_memory_mb = max_memory_mb.clamp(MIN_MEMORY_MB, MAX_MEMORY_MB);
        debug!(max_memory_mb, "Created tracking image cache");
        Self {
            state: RwLock::new(CacheState {
                entries: LruCache::new(
                    NonZeroUsize::new(DEFAULT_LRU_CAPACITY).unwrap_or(NonZeroUsize::MIN),
                ),
                current_bytes: 0,
                available: true,
            }),
            max_memory_bytes: max_memory_mb * 1024 * 1024,
        }
    }

    /// While unavailable every request fails with `CacheError::Unavailable`.
    pub fn set_available(&self, available: bool) {
        self.state.write().available = available;
    }

    pub fn is_cached(&self, handle: &AssetHandle) -> bool {
        self.state.read().entries.contains(handle)
    }

    pub fn entry(&self, handle: &AssetHandle) -> Option<CachedEntry> {
        self.state.read().entries.peek(handle).copied()
    }

    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().entries.is_empty()
    }

    /// Estimated memory held by cached entries.
    pub fn memory_usage(&self) -> usize {
        self.state.read().current_bytes
    }

    pub fn max_memory(&self) -> usize {
        self.max_memory_bytes
    }

    fn evict_if_needed(&self, state: &mut CacheState, needed_bytes: usize) {
        while state.current_bytes + needed_bytes > self.max_memory_bytes {
            let Some((handle, entry)) = state.entries.pop_lru() else {
                break;
            };
            state.current_bytes = state.current_bytes.saturating_sub(entry.memory_bytes());
            trace!(id = handle.id(), "Evicted cached image");
        }
    }
}

impl Default for TrackingImageCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MEMORY_MB)
    }
}

impl ImageCacheProvider for TrackingImageCache {
    fn start_caching(
        &self,
        handles: &[AssetHandle],
        size: TargetSize,
        mode: ContentMode,
    ) -> Result<(), CacheError> {
        let mut state = self.state.write();
        if !state.available {
            return Err(CacheError::Unavailable);
        }
        for handle in handles {
            let entry = CachedEntry { size, mode };
            if let Some(old) = state.entries.pop(handle) {
                state.current_bytes = state.current_bytes.saturating_sub(old.memory_bytes());
            }
            self.evict_if_needed(&mut state, entry.memory_bytes());
            state.current_bytes += entry.memory_bytes();
            if let Some((evicted, old)) = state.entries.push(handle.clone(), entry) {
                // Entry-count cap reached
                state.current_bytes = state.current_bytes.saturating_sub(old.memory_bytes());
                trace!(id = evicted.id(), "Evicted cached image");
            }
        }
        trace!(count = handles.len(), "Started caching");
        Ok(())
    }

    fn stop_caching(
        &self,
        handles: &[AssetHandle],
        size: TargetSize,
        mode: ContentMode,
    ) -> Result<(), CacheError> {
        let mut state = self.state.write();
        if !state.available {
            return Err(CacheError::Unavailable);
        }
        for handle in handles {
            // Only drop requests made with the same parameters
            if state.entries.peek(handle) == Some(&CachedEntry { size, mode }) {
                if let Some(old) = state.entries.pop(handle) {
                    state.current_bytes = state.current_bytes.saturating_sub(old.memory_bytes());
                }
            }
        }
        trace!(count = handles.len(), "Stopped caching");
        Ok(())
    }

    fn stop_all(&self) -> Result<(), CacheError> {
        let mut state = self.state.write();
        if !state.available {
            return Err(CacheError::Unavailable);
        }
        let count = state.entries.len();
        state.entries.clear();
        state.current_bytes = 0;
        debug!(count, "Cleared image cache");
        Ok(())
    }
}
