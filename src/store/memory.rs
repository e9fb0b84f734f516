//! In-process asset library that publishes ChangeSets.
//!
//! `MemoryAssetStore` keeps the full ordered library and a list of
//! subscribers, each with its own media filter and the snapshot it was last
//! sent. ChangeSets are computed against that snapshot, in the subscriber's
//! filtered index space.
//!
//! Delivery never blocks. When a subscriber's feed is full the change is held
//! back and later folded into one catch-up ChangeSet, either on the next
//! mutation or when the subscriber calls `flush`.

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, trace};

use crate::error::{FeedError, SequenceError, StoreError};
use crate::models::{AssetHandle, AssetSequence, ChangeSet};
use crate::providers::{AssetFilter, AssetStoreProvider};
use crate::sync::{ChangeSender, SubscriptionId};

/// How one mutation should be described to subscribers.
enum Mutation {
    /// Derive removals/insertions by comparing snapshots.
    Diff { changed: Vec<AssetHandle> },
    /// One asset moved; report it as a move.
    Move(AssetHandle),
    /// Describe as a full reload.
    Replace,
}

impl Mutation {
    fn changed(&self) -> &[AssetHandle] {
        match self {
            Self::Diff { changed } => changed,
            _ => &[],
        }
    }
}

struct Subscriber {
    id: SubscriptionId,
    filter: AssetFilter,
    sender: ChangeSender,
    /// Snapshot the subscriber will hold once its queued changes are applied.
    delivered: AssetSequence,
    /// A change could not be queued; `delivered` lags the library.
    held_back: bool,
    /// Handles reported changed while held back.
    held_changed: Vec<AssetHandle>,
}

impl Subscriber {
    /// Describes `before -> after` for this subscriber. Returns false once the
    /// subscriber is gone.
    fn publish(
        &mut self,
        before: &AssetSequence,
        after: &AssetSequence,
        mutation: &Mutation,
    ) -> bool {
        let current = MemoryAssetStore::filtered(after, self.filter);
        let change = match mutation {
            Mutation::Replace => ChangeSet::full_reload(current),
            _ if self.held_back => {
                let mut changed = self.held_changed.clone();
                changed.extend_from_slice(mutation.changed());
                ChangeSet::between(&self.delivered, &current, &changed)
            }
            Mutation::Diff { changed } => ChangeSet::between(&self.delivered, &current, changed),
            Mutation::Move(handle) => {
                let before = MemoryAssetStore::filtered(before, self.filter);
                match (before.position(handle), current.position(handle)) {
                    (Some(from), Some(to)) if from != to => {
                        ChangeSet::incremental(current).with_move(from, to)
                    }
                    _ => ChangeSet::incremental(current),
                }
            }
        };
        self.send(change, mutation.changed())
    }

    /// Sends one catch-up ChangeSet from `delivered` to `current`.
    fn resync(&mut self, current: AssetSequence) -> bool {
        let change = ChangeSet::between(&self.delivered, &current, &self.held_changed);
        self.send(change, &[])
    }

    fn send(&mut self, change: ChangeSet, changed: &[AssetHandle]) -> bool {
        if change.is_empty() {
            trace!(id = ?self.id, "Mutation not visible to subscriber");
            self.delivered = change.resulting;
            self.held_back = false;
            self.held_changed.clear();
            return true;
        }

        let resulting = change.resulting.clone();
        match self.sender.try_deliver(change) {
            Ok(()) => {
                self.delivered = resulting;
                self.held_back = false;
                self.held_changed.clear();
                true
            }
            Err((_, FeedError::Full)) => {
                if !self.held_back {
                    debug!(id = ?self.id, "Subscriber feed full, holding changes back");
                }
                self.held_back = true;
                self.held_changed.extend_from_slice(changed);
                true
            }
            Err((_, FeedError::Disconnected)) => {
                debug!(id = ?self.id, "Dropping disconnected subscriber");
                false
            }
        }
    }
}

struct LibraryState {
    library: AssetSequence,
    available: bool,
}

/// In-process asset library.
///
/// Lock order is `subscribers` then `state`. The library lock is never held
/// while sending, so reads proceed while changes are being delivered; the
/// subscriber lock keeps every subscriber's changes in mutation order.
pub struct MemoryAssetStore {
    state: RwLock<LibraryState>,
    subscribers: Mutex<Vec<Subscriber>>,
}

impl MemoryAssetStore {
    pub fn new(handles: Vec<AssetHandle>) -> Result<Self, SequenceError> {
        let library = AssetSequence::new(handles)?;
        info!(count = library.len(), "Created in-memory asset store");
        Ok(Self {
            state: RwLock::new(LibraryState {
                library,
                available: true,
            }),
            subscribers: Mutex::new(Vec::new()),
        })
    }

    /// Simulates the library becoming unreachable for new fetches.
    pub fn set_available(&self, available: bool) {
        self.state.write().available = available;
    }

    pub fn len(&self) -> usize {
        self.state.read().library.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().library.is_empty()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    /// Inserts `handle` at `index` (clamped to the end of the library).
    pub fn insert(&self, index: usize, handle: AssetHandle) -> Result<(), SequenceError> {
        self.commit(|library| {
            let mut handles = library.as_slice().to_vec();
            handles.insert(index.min(handles.len()), handle);
            let after = AssetSequence::new(handles)?;
            Ok(Some((after, Mutation::Diff { changed: Vec::new() })))
        })
        .map(|_| ())
    }

    /// Removes `handle`. Returns false when it is not in the library.
    pub fn remove(&self, handle: &AssetHandle) -> bool {
        self.commit_infallible(|library| {
            let index = library.position(handle)?;
            let mut handles = library.as_slice().to_vec();
            handles.remove(index);
            Some((
                AssetSequence::from_unique(handles),
                Mutation::Diff { changed: Vec::new() },
            ))
        })
    }

    /// Moves the asset at `from` so it ends up at `to`.
    pub fn move_asset(&self, from: usize, to: usize) -> bool {
        self.commit_infallible(|library| {
            let len = library.len();
            if from >= len || to >= len || from == to {
                return None;
            }
            let mut handles = library.as_slice().to_vec();
            let moved = handles.remove(from);
            handles.insert(to, moved.clone());
            Some((AssetSequence::from_unique(handles), Mutation::Move(moved)))
        })
    }

    /// Reports `handle` as modified in place (for example re-edited).
    pub fn mark_changed(&self, handle: &AssetHandle) -> bool {
        self.commit_infallible(|library| {
            library.position(handle)?;
            let after = AssetSequence::from_unique(library.as_slice().to_vec());
            Some((
                after,
                Mutation::Diff {
                    changed: vec![handle.clone()],
                },
            ))
        })
    }

    /// Replaces the whole library; subscribers get a full reload.
    pub fn replace_all(&self, handles: Vec<AssetHandle>) -> Result<(), SequenceError> {
        let after = AssetSequence::new(handles)?;
        self.commit(|_| Ok(Some((after, Mutation::Replace)))).map(|_| ())
    }

    fn commit_infallible<F>(&self, build: F) -> bool
    where
        F: FnOnce(&AssetSequence) -> Option<(AssetSequence, Mutation)>,
    {
        matches!(self.commit(|library| Ok(build(library))), Ok(true))
    }

    /// Installs the snapshot `build` derives from the library and publishes
    /// it. Returns false when `build` declined to change anything.
    fn commit<F>(&self, build: F) -> Result<bool, SequenceError>
    where
        F: FnOnce(&AssetSequence) -> Result<Option<(AssetSequence, Mutation)>, SequenceError>,
    {
        let mut subscribers = self.subscribers.lock();
        let (before, after, mutation) = {
            let mut state = self.state.write();
            let Some((after, mutation)) = build(&state.library)? else {
                return Ok(false);
            };
            let before = std::mem::replace(&mut state.library, after.clone());
            (before, after, mutation)
        };

        subscribers.retain_mut(|sub| sub.publish(&before, &after, &mutation));
        Ok(true)
    }

    fn filtered(library: &AssetSequence, filter: AssetFilter) -> AssetSequence {
        if filter == AssetFilter::All {
            return library.clone();
        }
        AssetSequence::from_unique(
            library
                .iter()
                .filter(|h| filter.allows(h.kind()))
                .cloned()
                .collect(),
        )
    }

    fn current(&self, filter: AssetFilter) -> AssetSequence {
        Self::filtered(&self.state.read().library, filter)
    }
}

impl AssetStoreProvider for MemoryAssetStore {
    fn fetch_sequence(&self, filter: AssetFilter) -> Result<AssetSequence, StoreError> {
        let state = self.state.read();
        if !state.available {
            return Err(StoreError::Unavailable);
        }
        Ok(Self::filtered(&state.library, filter))
    }

    fn subscribe(
        &self,
        filter: AssetFilter,
        baseline: &AssetSequence,
        sender: ChangeSender,
    ) -> SubscriptionId {
        let id = SubscriptionId::next();
        let mut subscribers = self.subscribers.lock();
        let current = self.current(filter);
        let mut sub = Subscriber {
            id,
            filter,
            sender,
            delivered: baseline.clone(),
            held_back: false,
            held_changed: Vec::new(),
        };

        if !baseline.same_contents(&current) {
            debug!(?id, "Library changed since fetch, sending catch-up");
            if !sub.resync(current) {
                return id;
            }
        }
        subscribers.push(sub);
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers.lock().retain(|sub| sub.id != id);
    }

    fn flush(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.lock();
        let Some(index) = subscribers.iter().position(|sub| sub.id == id) else {
            return false;
        };
        if !subscribers[index].held_back {
            return false;
        }

        let current = self.current(subscribers[index].filter);
        let sub = &mut subscribers[index];
        let queued = sub.resync(current).then(|| !sub.held_back);
        match queued {
            Some(queued) => queued,
            None => {
                subscribers.remove(index);
                false
            }
        }
    }
}
