//! The grid façade wiring scroll tracking, preheating and store sync together.
//!
//! `MediaGrid` lives on the rendering thread. Scroll events arrive through
//! `on_scroll`; store changes are queued on the change feed by any thread and
//! applied in receipt order by `pump_changes`.

use std::sync::Arc;

use tracing::{debug, info, trace};

use crate::config::GridConfig;
use crate::error::GridError;
use crate::layout::Rect;
use crate::models::{AssetSequence, ChangeSet};
use crate::prefetch::{
    rect_diff, CacheDelta, IndexResolver, PrefetchCacheController, PreheatWindow, ViewportTracker,
};
use crate::providers::{AssetStoreProvider, ImageCacheProvider, ViewRenderer};
use crate::sync::{ApplyOutcome, ChangeFeed, ChangeSender, ChangeSynchronizer, Subscription};

pub struct MediaGrid<S, C, R>
where
    S: AssetStoreProvider + ?Sized,
    C: ImageCacheProvider,
    R: ViewRenderer,
{
    config: GridConfig,
    tracker: ViewportTracker,
    controller: PrefetchCacheController<C>,
    synchronizer: ChangeSynchronizer,
    renderer: R,
    feed: ChangeFeed,
    subscription: Subscription<S>,
}

impl<S, C, R> MediaGrid<S, C, R>
where
    S: AssetStoreProvider + ?Sized,
    C: ImageCacheProvider,
    R: ViewRenderer,
{
    /// Loads the initial sequence from `store` and subscribes to its changes.
    ///
    /// Any earlier preheat requests are dropped and the renderer is told to
    /// reload before the subscription starts. The fetched snapshot is handed
    /// to the store as the subscription baseline, so a mutation racing the
    /// fetch arrives as an ordinary ChangeSet.
    pub fn new(
        store: Arc<S>,
        cache: C,
        mut renderer: R,
        config: GridConfig,
    ) -> Result<Self, GridError> {
        let sequence = store
            .fetch_sequence(config.filter)
            .map_err(GridError::InitialFetch)?;

        let mut controller = PrefetchCacheController::from_config(cache, &config);
        controller.reset_all();
        renderer.reload_all();

        let feed = ChangeFeed::new(config.feed_capacity);
        let subscription = Subscription::new(store, config.filter, &sequence, feed.sender());

        info!(
            count = sequence.len(),
            filter = ?config.filter,
            bias = config.index_bias.value(),
            "Media grid loaded"
        );

        Ok(Self {
            tracker: ViewportTracker::from_config(&config),
            synchronizer: ChangeSynchronizer::from_config(sequence, &config),
            controller,
            renderer,
            feed,
            subscription,
            config,
        })
    }

    /// Feeds a new viewport. Returns the cache requests issued, or `None` when
    /// the window did not move far enough (or there is nothing to preheat).
    pub fn on_scroll(&mut self, viewport: Rect) -> Option<CacheDelta> {
        if self.synchronizer.sequence().is_empty() {
            trace!("Skipping scroll update for empty sequence");
            return None;
        }

        let previous = self.tracker.window();
        let window = self.tracker.record_scroll(viewport)?;
        let regions = rect_diff::diff(previous.rect(), window.rect());
        debug!(
            added = regions.added.len(),
            removed = regions.removed.len(),
            mid_y = window.rect().mid_y(),
            "Preheat window moved"
        );

        let resolver = IndexResolver::new(
            &self.renderer,
            self.synchronizer.sequence(),
            self.config.index_bias,
        );
        Some(self.controller.on_regions_changed(&regions, &window, &resolver))
    }

    /// Applies one ChangeSet on the calling (rendering) thread.
    pub fn on_change_notification(&mut self, change: ChangeSet) -> ApplyOutcome {
        let outcome = self
            .synchronizer
            .apply(change, &mut self.renderer, &mut self.controller);
        if outcome != ApplyOutcome::Unchanged {
            self.tracker.reset();
        }
        outcome
    }

    /// Applies every queued ChangeSet in receipt order, releasing producers
    /// blocked in `deliver_and_wait`. Once the feed is empty the store is asked
    /// for anything it held back while the feed was full. Returns the number
    /// applied.
    pub fn pump_changes(&mut self) -> usize {
        let mut applied = 0;
        loop {
            while let Some(pending) = self.feed.try_next() {
                let (change, ack) = pending.into_parts();
                self.on_change_notification(change);
                ack.complete();
                applied += 1;
            }
            if !self.subscription.flush() {
                break;
            }
        }
        if applied > 0 {
            trace!(applied, "Drained change feed");
        }
        applied
    }

    /// Another handle onto this grid's change feed.
    pub fn change_sender(&self) -> ChangeSender {
        self.feed.sender()
    }

    pub fn current_sequence(&self) -> AssetSequence {
        self.synchronizer.current_sequence()
    }

    /// Number of snapshots applied since the initial load.
    pub fn version(&self) -> u64 {
        self.synchronizer.version()
    }

    pub fn window(&self) -> PreheatWindow {
        self.tracker.window()
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn controller(&self) -> &PrefetchCacheController<C> {
        &self.controller
    }
}

impl<S, C, R> Drop for MediaGrid<S, C, R>
where
    S: AssetStoreProvider + ?Sized,
    C: ImageCacheProvider,
    R: ViewRenderer,
{
    fn drop(&mut self) {
        self.controller.reset_all();
        info!(subscription = ?self.subscription.id(), "Media grid torn down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::layout::GridLayout;
    use crate::models::AssetHandle;
    use crate::providers::AssetFilter;
    use crate::store::MemoryAssetStore;
    use crate::sync::RenderOp;
    use crate::test_support::{CacheCall, RecordingCache, RecordingRenderer};
    use std::thread;

    type TestGrid = MediaGrid<MemoryAssetStore, Arc<RecordingCache>, RecordingRenderer>;

    fn handles(ids: &[&str]) -> Vec<AssetHandle> {
        ids.iter().map(|id| AssetHandle::image(*id)).collect()
    }

    fn seq(ids: &[&str]) -> AssetSequence {
        AssetSequence::new(handles(ids)).unwrap()
    }

    fn ids(sequence: &AssetSequence) -> Vec<String> {
        sequence.iter().map(|h| h.id().to_string()).collect()
    }

    fn strings(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    /// One 100pt column with no spacing: item `i` spans y `100*i..100*(i+1)`.
    fn grid_with(
        store: &Arc<MemoryAssetStore>,
        ui_items: usize,
        config: GridConfig,
    ) -> (TestGrid, Arc<RecordingCache>) {
        let cache = Arc::new(RecordingCache::default());
        let layout = GridLayout::new(1, 0.0, 100.0).with_item_count(ui_items);
        let renderer = RecordingRenderer::new(layout);
        let mut grid =
            MediaGrid::new(Arc::clone(store), Arc::clone(&cache), renderer, config).unwrap();
        grid.renderer_mut().ops.clear();
        cache.clear();
        (grid, cache)
    }

    fn store(ids: &[&str]) -> Arc<MemoryAssetStore> {
        Arc::new(MemoryAssetStore::new(handles(ids)).unwrap())
    }

    #[test]
    fn test_initial_load_resets_and_subscribes() {
        let store = store(&["a", "b"]);
        let cache = Arc::new(RecordingCache::default());
        let grid = MediaGrid::new(
            Arc::clone(&store),
            Arc::clone(&cache),
            RecordingRenderer::new(GridLayout::default()),
            GridConfig::default(),
        )
        .unwrap();

        assert_eq!(cache.calls(), vec![CacheCall::StopAll]);
        assert_eq!(grid.renderer().ops, vec![RenderOp::ReloadAll]);
        assert_eq!(store.subscriber_count(), 1);
        assert_eq!(grid.current_sequence().len(), 2);
        assert_eq!(grid.version(), 0);
    }

    #[test]
    fn test_initial_fetch_failure() {
        let store = store(&["a"]);
        store.set_available(false);
        let result = MediaGrid::new(
            Arc::clone(&store),
            RecordingCache::default(),
            RecordingRenderer::new(GridLayout::default()),
            GridConfig::default(),
        );
        assert!(matches!(
            result,
            Err(GridError::InitialFetch(StoreError::Unavailable))
        ));
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn test_scroll_past_window_stops_then_starts() {
        let store = store(&["a", "b", "c", "d", "e"]);
        let (mut grid, cache) = grid_with(&store, 5, GridConfig::default());

        let first = grid.on_scroll(Rect::new(0.0, 0.0, 100.0, 100.0)).unwrap();
        assert_eq!(grid.window().rect(), Rect::new(0.0, -50.0, 100.0, 200.0));
        assert_eq!(first.started, handles(&["a", "b"]));
        assert!(first.stopped.is_empty());
        cache.clear();

        let delta = grid.on_scroll(Rect::new(0.0, 500.0, 100.0, 100.0)).unwrap();
        assert_eq!(
            cache.calls(),
            vec![
                CacheCall::Stop(strings(&["a", "b"])),
                CacheCall::Start(strings(&["e"])),
            ]
        );
        assert_eq!(delta.stopped, handles(&["a", "b"]));
        assert_eq!(delta.started, handles(&["e"]));
    }

    #[test]
    fn test_small_scroll_is_debounced() {
        let store = store(&["a", "b", "c"]);
        let (mut grid, cache) = grid_with(&store, 3, GridConfig::default());

        grid.on_scroll(Rect::new(0.0, 0.0, 100.0, 100.0)).unwrap();
        cache.clear();
        assert!(grid.on_scroll(Rect::new(0.0, 30.0, 100.0, 100.0)).is_none());
        assert!(cache.calls().is_empty());
    }

    #[test]
    fn test_empty_sequence_skips_scroll() {
        let store = store(&[]);
        let (mut grid, cache) = grid_with(&store, 0, GridConfig::default());

        assert!(grid.on_scroll(Rect::new(0.0, 500.0, 100.0, 100.0)).is_none());
        assert_eq!(grid.window(), PreheatWindow::ZERO);
        assert!(cache.calls().is_empty());
    }

    #[test]
    fn test_replacement_with_placeholder_resets_caching() {
        let store = store(&["a", "b", "c", "d", "e"]);
        let config = GridConfig::builder().leading_placeholder(true).build();
        let (mut grid, cache) = grid_with(&store, 6, config);

        grid.on_scroll(Rect::new(0.0, 0.0, 100.0, 100.0)).unwrap();
        // UI index 0 is the placeholder, so only "a" is preheated
        assert_eq!(cache.calls(), vec![CacheCall::Start(strings(&["a"]))]);
        cache.clear();

        let change = ChangeSet::incremental(seq(&["a", "c2", "d", "e"]))
            .with_removed([1])
            .with_inserted([1]);
        assert_eq!(grid.on_change_notification(change), ApplyOutcome::Incremental);

        assert_eq!(
            grid.renderer().ops,
            vec![RenderOp::Delete(vec![2]), RenderOp::Insert(vec![2])]
        );
        assert_eq!(cache.calls(), vec![CacheCall::StopAll]);
        assert_eq!(grid.window(), PreheatWindow::ZERO);
        assert_eq!(grid.controller().preheated_count(), 0);
        assert_eq!(grid.version(), 1);
    }

    #[test]
    fn test_current_snapshot_change_keeps_window() {
        let store = store(&["a", "b"]);
        let (mut grid, cache) = grid_with(&store, 2, GridConfig::default());
        grid.on_scroll(Rect::new(0.0, 0.0, 100.0, 100.0)).unwrap();
        cache.clear();

        let window = grid.window();
        let change = ChangeSet::incremental(grid.current_sequence()).with_changed([0]);
        assert_eq!(grid.on_change_notification(change), ApplyOutcome::Unchanged);
        assert_eq!(grid.window(), window);
        assert!(cache.calls().is_empty());
        assert!(grid.renderer().ops.is_empty());
    }

    #[test]
    fn test_store_mutations_apply_on_pump() {
        let store = store(&["a", "b", "c"]);
        let (mut grid, cache) = grid_with(&store, 3, GridConfig::default());

        store.insert(0, AssetHandle::image("x")).unwrap();
        assert!(store.remove(&AssetHandle::image("c")));
        assert!(store.move_asset(0, 2));
        assert_eq!(ids(&grid.current_sequence()), vec!["a", "b", "c"]);

        assert_eq!(grid.pump_changes(), 3);
        assert_eq!(
            grid.renderer().ops,
            vec![
                RenderOp::Insert(vec![0]),
                RenderOp::Delete(vec![3]),
                RenderOp::Move { from: 0, to: 2 },
            ]
        );
        assert_eq!(grid.renderer().batches, 3);
        assert_eq!(
            cache.calls(),
            vec![CacheCall::StopAll, CacheCall::StopAll, CacheCall::StopAll]
        );
        assert_eq!(ids(&grid.current_sequence()), vec!["a", "b", "x"]);
        assert_eq!(grid.pump_changes(), 0);
    }

    #[test]
    fn test_filtered_grid_only_sees_its_kind() {
        let store = Arc::new(
            MemoryAssetStore::new(vec![
                AssetHandle::image("a"),
                AssetHandle::video("v1"),
            ])
            .unwrap(),
        );
        let config = GridConfig::builder().filter(AssetFilter::Videos).build();
        let (mut grid, _cache) = grid_with(&store, 1, config);

        assert_eq!(grid.current_sequence().len(), 1);
        store.insert(0, AssetHandle::image("b")).unwrap();
        assert_eq!(grid.pump_changes(), 0);
    }

    #[test]
    fn test_deliver_and_wait_blocks_until_applied() {
        let store = store(&["a"]);
        let (mut grid, _cache) = grid_with(&store, 1, GridConfig::default());
        let sender = grid.change_sender();

        let producer = thread::spawn(move || {
            sender.deliver_and_wait(ChangeSet::full_reload(seq(&["a", "b"])))
        });
        while !producer.is_finished() {
            grid.pump_changes();
            thread::yield_now();
        }

        assert!(producer.join().unwrap().is_ok());
        assert_eq!(grid.current_sequence().len(), 2);
        assert_eq!(grid.renderer().ops, vec![RenderOp::ReloadAll]);
    }

    #[test]
    fn test_drop_stops_caching_and_unsubscribes() {
        let store = store(&["a"]);
        let (grid, cache) = grid_with(&store, 1, GridConfig::default());
        assert_eq!(store.subscriber_count(), 1);

        drop(grid);
        assert_eq!(cache.calls(), vec![CacheCall::StopAll]);
        assert_eq!(store.subscriber_count(), 0);
    }

    /// Store whose library changes while a grid is subscribing.
    struct RacingStore {
        inner: MemoryAssetStore,
    }

    impl AssetStoreProvider for RacingStore {
        fn fetch_sequence(&self, filter: AssetFilter) -> Result<AssetSequence, StoreError> {
            self.inner.fetch_sequence(filter)
        }

        fn subscribe(
            &self,
            filter: AssetFilter,
            baseline: &AssetSequence,
            sender: ChangeSender,
        ) -> crate::sync::SubscriptionId {
            self.inner.insert(0, AssetHandle::image("x")).unwrap();
            self.inner.subscribe(filter, baseline, sender)
        }

        fn unsubscribe(&self, id: crate::sync::SubscriptionId) {
            self.inner.unsubscribe(id)
        }

        fn flush(&self, id: crate::sync::SubscriptionId) -> bool {
            self.inner.flush(id)
        }
    }

    #[test]
    fn test_mutation_during_subscribe_keeps_rows_in_step() {
        let store = Arc::new(RacingStore {
            inner: MemoryAssetStore::new(handles(&["a", "b", "c"])).unwrap(),
        });
        let layout = GridLayout::new(1, 0.0, 100.0).with_item_count(3);
        let mut grid = MediaGrid::new(
            Arc::clone(&store),
            RecordingCache::default(),
            RecordingRenderer::new(layout),
            GridConfig::default(),
        )
        .unwrap();
        grid.renderer_mut().ops.clear();

        assert!(store.inner.remove(&AssetHandle::image("a")));
        assert_eq!(grid.pump_changes(), 2);

        assert_eq!(
            grid.renderer().ops,
            vec![RenderOp::Insert(vec![0]), RenderOp::Delete(vec![1])]
        );
        assert_eq!(ids(&grid.current_sequence()), vec!["x", "b", "c"]);
        assert_eq!(grid.renderer().layout.item_count, grid.current_sequence().len());
    }

    #[test]
    fn test_mutations_beyond_feed_capacity_do_not_block() {
        let store = store(&["a"]);
        let config = GridConfig::builder().feed_capacity(1).build();
        let (mut grid, _cache) = grid_with(&store, 1, config);

        store.insert(1, AssetHandle::image("b")).unwrap();
        store.insert(2, AssetHandle::image("c")).unwrap();
        assert!(store.remove(&AssetHandle::image("a")));
        assert_eq!(store.len(), 2);

        assert_eq!(grid.pump_changes(), 2);
        assert_eq!(
            grid.renderer().ops,
            vec![
                RenderOp::Insert(vec![1]),
                RenderOp::Delete(vec![0]),
                RenderOp::Insert(vec![1]),
            ]
        );
        assert_eq!(ids(&grid.current_sequence()), vec!["b", "c"]);
        assert_eq!(grid.renderer().layout.item_count, 2);
    }
}
