//! Incremental synchronization with the asset store.
//!
//! This module provides:
//! - `ChangeSynchronizer` - Applies ChangeSets in order, single writer
//! - `RenderBatch` - Ordered renderer calls for one ChangeSet
//! - `ChangeFeed` / `ChangeSender` - Store-to-rendering-thread hand-off
//! - `Subscription` - Scoped store registration

pub mod batch;
pub mod feed;
pub mod synchronizer;

pub use batch::{RenderBatch, RenderOp};
pub use feed::{Ack, ChangeFeed, ChangeSender, PendingChange, Subscription, SubscriptionId};
pub use synchronizer::{ApplyOutcome, ChangeSynchronizer, SyncState};
