//! Hand-off of ChangeSets from store threads to the rendering thread.
//!
//! - Stores hold a cloneable `ChangeSender` and may deliver from any thread
//! - The rendering thread owns the `ChangeFeed` and drains it in receipt order
//! - `Subscription` ties a store registration to a scope
//!
//! Uses flume for communication between the store and the rendering thread.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use flume::{Receiver, Sender, TrySendError};
use tracing::{debug, trace};

use crate::error::FeedError;
use crate::models::{AssetSequence, ChangeSet};
use crate::providers::{AssetFilter, AssetStoreProvider};

static NEXT_SUBSCRIPTION_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one registration with an asset store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn next() -> Self {
        Self(NEXT_SUBSCRIPTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

struct Envelope {
    change: ChangeSet,
    ack: Option<Sender<()>>,
}

/// Completion signal for a producer waiting in `deliver_and_wait`.
pub struct Ack(Option<Sender<()>>);

impl Ack {
    /// Releases the waiting producer, if any.
    pub fn complete(self) {
        if let Some(tx) = self.0 {
            let _ = tx.send(());
        }
    }
}

/// A ChangeSet waiting on the rendering thread.
pub struct PendingChange {
    envelope: Envelope,
}

impl PendingChange {
    pub fn into_parts(self) -> (ChangeSet, Ack) {
        (self.envelope.change, Ack(self.envelope.ack))
    }
}

/// Producer side of the feed.
#[derive(Clone)]
pub struct ChangeSender {
    tx: Sender<Envelope>,
}

impl ChangeSender {
    /// Queues a change without waiting for it to be applied.
    ///
    /// Blocks while the feed is full, so producers running on the rendering
    /// thread itself must keep the feed drained.
    pub fn deliver(&self, change: ChangeSet) -> Result<(), FeedError> {
        self.tx
            .send(Envelope { change, ack: None })
            .map_err(|_| FeedError::Disconnected)
    }

    /// Queues a change unless the feed is full. Returns the change back when
    /// it could not be queued.
    pub fn try_deliver(&self, change: ChangeSet) -> Result<(), (ChangeSet, FeedError)> {
        match self.tx.try_send(Envelope { change, ack: None }) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(envelope)) => {
                trace!("Change feed full");
                Err((envelope.change, FeedError::Full))
            }
            Err(TrySendError::Disconnected(envelope)) => {
                Err((envelope.change, FeedError::Disconnected))
            }
        }
    }

    /// Queues a change and blocks until the rendering thread has applied it.
    ///
    /// Must not be called from the thread that drains the feed.
    pub fn deliver_and_wait(&self, change: ChangeSet) -> Result<(), FeedError> {
        let (ack_tx, ack_rx) = flume::bounded(1);
        self.tx
            .send(Envelope {
                change,
                ack: Some(ack_tx),
            })
            .map_err(|_| FeedError::Disconnected)?;
        ack_rx.recv().map_err(|_| FeedError::Disconnected)
    }

    pub fn is_connected(&self) -> bool {
        !self.tx.is_disconnected()
    }
}

/// Consumer side of the feed, owned by the rendering thread.
pub struct ChangeFeed {
    tx: Sender<Envelope>,
    rx: Receiver<Envelope>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = flume::bounded(capacity.max(1));
        Self { tx, rx }
    }

    pub fn sender(&self) -> ChangeSender {
        ChangeSender {
            tx: self.tx.clone(),
        }
    }

    /// Next queued change, without blocking.
    pub fn try_next(&self) -> Option<PendingChange> {
        self.rx
            .try_recv()
            .ok()
            .map(|envelope| PendingChange { envelope })
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

/// Store registration that is released when dropped.
pub struct Subscription<S: AssetStoreProvider + ?Sized> {
    store: Arc<S>,
    id: SubscriptionId,
}

impl<S: AssetStoreProvider + ?Sized> Subscription<S> {
    pub fn new(
        store: Arc<S>,
        filter: AssetFilter,
        baseline: &AssetSequence,
        sender: ChangeSender,
    ) -> Self {
        let id = store.subscribe(filter, baseline, sender);
        debug!(?id, ?filter, baseline = baseline.len(), "Subscribed to asset store");
        Self { store, id }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Asks the store to queue anything it held back for this subscription.
    pub fn flush(&self) -> bool {
        self.store.flush(self.id)
    }
}

impl<S: AssetStoreProvider + ?Sized> Drop for Subscription<S> {
    fn drop(&mut self) {
        self.store.unsubscribe(self.id);
        debug!(id = ?self.id, "Unsubscribed from asset store");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AssetHandle, AssetSequence};
    use std::thread;

    fn change(ids: &[&str]) -> ChangeSet {
        let seq =
            AssetSequence::new(ids.iter().map(|id| AssetHandle::image(*id)).collect()).unwrap();
        ChangeSet::full_reload(seq)
    }

    #[test]
    fn test_changes_drain_in_receipt_order() {
        let feed = ChangeFeed::new(8);
        let sender = feed.sender();
        sender.deliver(change(&["a"])).unwrap();
        sender.deliver(change(&["a", "b"])).unwrap();

        let mut lengths = Vec::new();
        while let Some(pending) = feed.try_next() {
            let (change, ack) = pending.into_parts();
            lengths.push(change.resulting.len());
            ack.complete();
        }
        assert_eq!(lengths, vec![1, 2]);
    }

    #[test]
    fn test_try_deliver_reports_full_feed() {
        let feed = ChangeFeed::new(1);
        let sender = feed.sender();
        sender.try_deliver(change(&["a"])).unwrap();
        let (returned, err) = sender.try_deliver(change(&["b"])).unwrap_err();
        assert_eq!(err, FeedError::Full);
        assert_eq!(returned.resulting[0].id(), "b");
        assert_eq!(feed.pending(), 1);
    }

    #[test]
    fn test_deliver_and_wait_blocks_until_acknowledged() {
        let feed = ChangeFeed::new(4);
        let sender = feed.sender();

        let producer = thread::spawn(move || sender.deliver_and_wait(change(&["a"])));

        let pending = loop {
            if let Some(pending) = feed.try_next() {
                break pending;
            }
            thread::yield_now();
        };
        let (_, ack) = pending.into_parts();
        ack.complete();

        assert_eq!(producer.join().unwrap(), Ok(()));
    }

    #[test]
    fn test_dropped_feed_disconnects_senders() {
        let feed = ChangeFeed::new(4);
        let sender = feed.sender();
        drop(feed);
        assert!(!sender.is_connected());
        assert_eq!(sender.deliver(change(&["a"])), Err(FeedError::Disconnected));
    }
}
