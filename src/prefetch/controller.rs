//! Keeps the image cache warm for the current preheat window.
//!
//! - Start requests for assets entering the window
//! - Stop requests for assets leaving it
//! - A full stop whenever the backing sequence is replaced
//!
//! The controller remembers which assets it asked the cache to preheat, so
//! repeated requests for the same asset are never issued.

use std::collections::HashSet;

use tracing::{debug, trace, warn};

use crate::config::GridConfig;
use crate::layout::ElementLocator;
use crate::models::AssetHandle;
use crate::prefetch::{IndexResolver, PreheatWindow, RegionSet};
use crate::providers::{ContentMode, ImageCacheProvider, TargetSize};

/// Cache requests issued for one window change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheDelta {
    pub started: Vec<AssetHandle>,
    pub stopped: Vec<AssetHandle>,
}

impl CacheDelta {
    pub fn is_empty(&self) -> bool {
        self.started.is_empty() && self.stopped.is_empty()
    }
}

pub struct PrefetchCacheController<C> {
    cache: C,
    target_size: TargetSize,
    content_mode: ContentMode,
    /// Assets the cache was asked to preheat and not yet told to drop.
    preheated: HashSet<AssetHandle>,
}

impl<C: ImageCacheProvider> PrefetchCacheController<C> {
    pub fn new(cache: C, target_size: TargetSize, content_mode: ContentMode) -> Self {
        Self {
            cache,
            target_size,
            content_mode,
            preheated: HashSet::new(),
        }
    }

    pub fn from_config(cache: C, config: &GridConfig) -> Self {
        Self::new(cache, config.target_size, config.content_mode)
    }

    /// Issues stop and start requests for a window change.
    ///
    /// `window` is the window the regions were computed against. Assets still
    /// intersecting it are never stopped, and an asset is never both started
    /// and stopped in one call.
    pub fn on_regions_changed<L: ElementLocator + ?Sized>(
        &mut self,
        regions: &RegionSet,
        window: &PreheatWindow,
        resolver: &IndexResolver<'_, L>,
    ) -> CacheDelta {
        if regions.is_empty() {
            return CacheDelta::default();
        }

        let entering = resolver.handles_for_regions(&regions.added);
        let mut keep: HashSet<&AssetHandle> = entering.iter().collect();
        let in_window = if regions.removed.is_empty() {
            Vec::new()
        } else {
            resolver.handles_for_region(window.rect())
        };
        keep.extend(in_window.iter());

        let stopped: Vec<AssetHandle> = resolver
            .handles_for_regions(&regions.removed)
            .into_iter()
            .filter(|h| !keep.contains(h) && self.preheated.contains(h))
            .collect();
        let started: Vec<AssetHandle> = entering
            .iter()
            .filter(|h| !self.preheated.contains(*h))
            .cloned()
            .collect();

        self.stop(&stopped);
        self.start(&started);

        debug!(
            started = started.len(),
            stopped = stopped.len(),
            preheated = self.preheated.len(),
            "Updated preheated assets"
        );
        CacheDelta { started, stopped }
    }

    /// Drops every preheat request, including ones issued by other means.
    pub fn reset_all(&mut self) {
        if let Err(e) = self.cache.stop_all() {
            warn!(error = %e, "Image cache rejected stop-all request");
        }
        let dropped = self.preheated.len();
        self.preheated.clear();
        debug!(dropped, "Reset preheated assets");
    }

    fn start(&mut self, handles: &[AssetHandle]) {
        if handles.is_empty() {
            return;
        }
        match self
            .cache
            .start_caching(handles, self.target_size, self.content_mode)
        {
            Ok(()) => {
                trace!(count = handles.len(), "Started caching");
                self.preheated.extend(handles.iter().cloned());
            }
            Err(e) => warn!(count = handles.len(), error = %e, "Image cache rejected start request"),
        }
    }

    fn stop(&mut self, handles: &[AssetHandle]) {
        if handles.is_empty() {
            return;
        }
        if let Err(e) = self
            .cache
            .stop_caching(handles, self.target_size, self.content_mode)
        {
            warn!(count = handles.len(), error = %e, "Image cache rejected stop request");
        } else {
            trace!(count = handles.len(), "Stopped caching");
        }
        for handle in handles {
            self.preheated.remove(handle);
        }
    }

    pub fn is_preheated(&self, handle: &AssetHandle) -> bool {
        self.preheated.contains(handle)
    }

    pub fn preheated_count(&self) -> usize {
        self.preheated.len()
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }
}
