//! Collaborators the grid core talks to but does not implement.
//!
//! - `AssetStoreProvider` - the media library: initial fetch plus a change feed
//! - `ImageCacheProvider` - thumbnail cache that can be asked to preheat assets
//! - `ViewRenderer` - the on-screen grid: batch updates plus item geometry
//!
//! `store::MemoryAssetStore` and `thumbnails::TrackingImageCache` are in-process
//! implementations of the first two.

use std::sync::Arc;

use crate::error::{CacheError, StoreError};
use crate::layout::ElementLocator;
use crate::models::{AssetHandle, AssetSequence, MediaKind};
use crate::sync::{ChangeSender, SubscriptionId};

/// Which media kinds a grid shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssetFilter {
    #[default]
    All,
    Images,
    Videos,
}

impl AssetFilter {
    pub fn allows(self, kind: MediaKind) -> bool {
        match self {
            Self::All => true,
            Self::Images => kind == MediaKind::Image,
            Self::Videos => kind == MediaKind::Video,
        }
    }
}

/// Pixel size thumbnails are requested at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

impl TargetSize {
    pub fn square(side: u32) -> Self {
        Self {
            width: side,
            height: side,
        }
    }

    /// Square thumbnail size for a tile of `side_points` on a display with the
    /// given scale factor.
    pub fn for_tile(side_points: f64, scale: f64) -> Self {
        let side = (side_points * scale).round().max(1.0) as u32;
        Self::square(side)
    }
}

impl Default for TargetSize {
    fn default() -> Self {
        Self::square(200)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContentMode {
    #[default]
    AspectFill,
    AspectFit,
}

/// The media library backing a grid.
///
/// Stores may mutate from any thread, so change notifications arrive through a
/// `ChangeSender` rather than a direct callback into the grid.
pub trait AssetStoreProvider: Send + Sync {
    /// Snapshot of the library, restricted to `filter`.
    fn fetch_sequence(&self, filter: AssetFilter) -> Result<AssetSequence, StoreError>;

    /// Registers `sender` for changes to the sequence `filter` selects.
    ///
    /// `baseline` is the snapshot the subscriber currently shows. The first
    /// ChangeSet delivered is relative to it, so mutations landing between the
    /// fetch and this call are not lost. Index details refer to the filtered
    /// sequence.
    fn subscribe(
        &self,
        filter: AssetFilter,
        baseline: &AssetSequence,
        sender: ChangeSender,
    ) -> SubscriptionId;

    /// Stops notifying the subscriber. Unknown ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId);

    /// Queues changes held back while the subscriber's feed was full. Returns
    /// true when something was queued.
    fn flush(&self, _id: SubscriptionId) -> bool {
        false
    }
}

/// Thumbnail cache that can be asked to preheat assets.
///
/// Requests are fire-and-forget. A returned error only means the request was
/// not accepted; callers log it and carry on.
pub trait ImageCacheProvider {
    fn start_caching(
        &self,
        handles: &[AssetHandle],
        size: TargetSize,
        mode: ContentMode,
    ) -> Result<(), CacheError>;

    fn stop_caching(
        &self,
        handles: &[AssetHandle],
        size: TargetSize,
        mode: ContentMode,
    ) -> Result<(), CacheError>;

    fn stop_all(&self) -> Result<(), CacheError>;
}

impl<T: ImageCacheProvider + ?Sized> ImageCacheProvider for Arc<T> {
    fn start_caching(
        &self,
        handles: &[AssetHandle],
        size: TargetSize,
        mode: ContentMode,
    ) -> Result<(), CacheError> {
        (**self).start_caching(handles, size, mode)
    }

    fn stop_caching(
        &self,
        handles: &[AssetHandle],
        size: TargetSize,
        mode: ContentMode,
    ) -> Result<(), CacheError> {
        (**self).stop_caching(handles, size, mode)
    }

    fn stop_all(&self) -> Result<(), CacheError> {
        (**self).stop_all()
    }
}

/// The on-screen grid.
///
/// Item indices are in UI space. Incremental updates are bracketed by
/// `begin_updates`/`end_updates` and must be interpreted in call order.
pub trait ViewRenderer: ElementLocator {
    fn begin_updates(&mut self) {}

    fn delete_items(&mut self, indices: &[usize]);

    fn insert_items(&mut self, indices: &[usize]);

    fn reload_items(&mut self, indices: &[usize]);

    fn move_item(&mut self, from: usize, to: usize);

    fn end_updates(&mut self) {}

    /// Discards all rows and asks the data source again.
    fn reload_all(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_allows() {
        assert!(AssetFilter::All.allows(MediaKind::Video));
        assert!(AssetFilter::Images.allows(MediaKind::Image));
        assert!(!AssetFilter::Images.allows(MediaKind::Video));
        assert!(!AssetFilter::Videos.allows(MediaKind::Image));
    }

    #[test]
    fn test_target_size_for_tile() {
        assert_eq!(TargetSize::for_tile(93.5, 2.0), TargetSize::square(187));
        assert_eq!(TargetSize::for_tile(0.0, 3.0), TargetSize::square(1));
    }
}
