//! Recording doubles for the renderer and the image cache.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::error::CacheError;
use crate::layout::{ElementLocator, GridLayout, Rect};
use crate::models::AssetHandle;
use crate::providers::{ContentMode, ImageCacheProvider, TargetSize, ViewRenderer};
use crate::sync::RenderOp;

/// Renderer that lays items out with a `GridLayout` and records every call.
pub struct RecordingRenderer {
    pub layout: GridLayout,
    pub ops: Vec<RenderOp>,
    /// Number of begin/end update pairs seen.
    pub batches: usize,
    in_batch: bool,
}

impl RecordingRenderer {
    pub fn new(layout: GridLayout) -> Self {
        Self {
            layout,
            ops: Vec::new(),
            batches: 0,
            in_batch: false,
        }
    }
}

impl ElementLocator for RecordingRenderer {
    fn indices_in_rect(&self, rect: Rect) -> Vec<usize> {
        self.layout.indices_in_rect(rect)
    }
}

impl ViewRenderer for RecordingRenderer {
    fn begin_updates(&mut self) {
        assert!(!self.in_batch, "nested update batch");
        self.in_batch = true;
    }

    fn delete_items(&mut self, indices: &[usize]) {
        self.layout.item_count = self.layout.item_count.saturating_sub(indices.len());
        self.ops.push(RenderOp::Delete(indices.to_vec()));
    }

    fn insert_items(&mut self, indices: &[usize]) {
        self.layout.item_count += indices.len();
        self.ops.push(RenderOp::Insert(indices.to_vec()));
    }

    fn reload_items(&mut self, indices: &[usize]) {
        self.ops.push(RenderOp::Reload(indices.to_vec()));
    }

    fn move_item(&mut self, from: usize, to: usize) {
        self.ops.push(RenderOp::Move { from, to });
    }

    fn end_updates(&mut self) {
        assert!(self.in_batch, "end without begin");
        self.in_batch = false;
        self.batches += 1;
    }

    fn reload_all(&mut self) {
        self.ops.push(RenderOp::ReloadAll);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheCall {
    Start(Vec<String>),
    Stop(Vec<String>),
    StopAll,
}

/// Image cache that records requests and can be told to reject them.
#[derive(Default)]
pub struct RecordingCache {
    calls: Mutex<Vec<CacheCall>>,
    rejecting: AtomicBool,
}

impl RecordingCache {
    pub fn calls(&self) -> Vec<CacheCall> {
        self.calls.lock().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    pub fn set_rejecting(&self, rejecting: bool) {
        self.rejecting.store(rejecting, Ordering::Relaxed);
    }

    fn record(&self, call: CacheCall) -> Result<(), CacheError> {
        self.calls.lock().push(call);
        if self.rejecting.load(Ordering::Relaxed) {
            Err(CacheError::Rejected {
                reason: "test double".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

fn ids(handles: &[AssetHandle]) -> Vec<String> {
    handles.iter().map(|h| h.id().to_string()).collect()
}

impl ImageCacheProvider for RecordingCache {
    fn start_caching(
        &self,
        handles: &[AssetHandle],
        _size: TargetSize,
        _mode: ContentMode,
    ) -> Result<(), CacheError> {
        self.record(CacheCall::Start(ids(handles)))
    }

    fn stop_caching(
        &self,
        handles: &[AssetHandle],
        _size: TargetSize,
        _mode: ContentMode,
    ) -> Result<(), CacheError> {
        self.record(CacheCall::Stop(ids(handles)))
    }

    fn stop_all(&self) -> Result<(), CacheError> {
        self.record(CacheCall::StopAll)
    }
}
