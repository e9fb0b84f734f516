//! Thumbnail-grid core for a media picker.
//!
//! - `prefetch` keeps an image cache warm for a debounced window around the
//!   viewport
//! - `sync` applies incremental store changes to the grid in order
//! - `grid::MediaGrid` ties both to an asset store, a cache and a renderer

pub mod config;
pub mod error;
pub mod grid;
pub mod layout;
pub mod models;
pub mod prefetch;
pub mod providers;
pub mod store;
pub mod sync;
pub mod thumbnails;

#[cfg(test)]
mod test_support;

pub use config::{ContractPolicy, GridConfig, GridConfigBuilder};
pub use error::{CacheError, ChangeSetError, FeedError, GridError, SequenceError, StoreError};
pub use grid::MediaGrid;
pub use layout::{ElementLocator, GridLayout, Rect};
pub use models::{AssetHandle, AssetSequence, ChangeSet, IndexBias, MediaKind};
pub use providers::{
    AssetFilter, AssetStoreProvider, ContentMode, ImageCacheProvider, TargetSize, ViewRenderer,
};
