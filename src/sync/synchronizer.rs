//! Applies store ChangeSets to the grid's sequence and renderer.
//!
//! Every application runs to completion before the next starts: replace the
//! snapshot, replay the renderer calls in their mandated order, then drop all
//! preheat requests, since the old window no longer maps onto the new indices.

use tracing::{debug, trace, warn};

use crate::config::{ContractPolicy, GridConfig};
use crate::models::{AssetSequence, ChangeSet, IndexBias};
use crate::prefetch::PrefetchCacheController;
use crate::providers::{ImageCacheProvider, ViewRenderer};
use crate::sync::RenderBatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Applying,
}

/// What `apply` did with a ChangeSet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The ChangeSet carried the current snapshot; nothing happened.
    Unchanged,
    Incremental,
    FullReload,
    /// The ChangeSet was inconsistent and a full reload was issued instead.
    Degraded,
}

pub struct ChangeSynchronizer {
    current: AssetSequence,
    version: u64,
    state: SyncState,
    bias: IndexBias,
    policy: ContractPolicy,
}

impl ChangeSynchronizer {
    pub fn new(initial: AssetSequence, bias: IndexBias, policy: ContractPolicy) -> Self {
        Self {
            current: initial,
            version: 0,
            state: SyncState::Idle,
            bias,
            policy,
        }
    }

    pub fn from_config(initial: AssetSequence, config: &GridConfig) -> Self {
        Self::new(initial, config.index_bias, config.contract_policy)
    }

    /// Read-only snapshot of the current sequence.
    pub fn current_sequence(&self) -> AssetSequence {
        self.current.clone()
    }

    pub fn sequence(&self) -> &AssetSequence {
        &self.current
    }

    /// Number of snapshots installed since construction.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Installs a new snapshot wholesale, without renderer or cache calls.
    pub fn replace(&mut self, sequence: AssetSequence) {
        self.current = sequence;
        self.version += 1;
    }

    /// Applies one ChangeSet.
    ///
    /// # Panics
    ///
    /// Under `ContractPolicy::Panic`, when the ChangeSet references an index
    /// outside the sequence it describes.
    pub fn apply<R, C>(
        &mut self,
        change: ChangeSet,
        renderer: &mut R,
        cache: &mut PrefetchCacheController<C>,
    ) -> ApplyOutcome
    where
        R: ViewRenderer + ?Sized,
        C: ImageCacheProvider,
    {
        if change.resulting.is_same_snapshot(&self.current) {
            trace!(version = self.version, "ChangeSet carries current snapshot");
            return ApplyOutcome::Unchanged;
        }

        debug_assert_eq!(self.state, SyncState::Idle);
        self.state = SyncState::Applying;

        let prior_len = self.current.len();
        let (batch, outcome) = if !change.has_incremental_changes {
            (RenderBatch::full_reload(), ApplyOutcome::FullReload)
        } else {
            match change.validate(prior_len) {
                Ok(()) => (
                    RenderBatch::incremental(&change, self.bias),
                    ApplyOutcome::Incremental,
                ),
                Err(err) => match self.policy {
                    ContractPolicy::Panic => {
                        panic!("asset store delivered an inconsistent ChangeSet: {err}")
                    }
                    ContractPolicy::FullReload => {
                        warn!(error = %err, "Inconsistent ChangeSet, reloading grid");
                        (RenderBatch::full_reload(), ApplyOutcome::Degraded)
                    }
                },
            }
        };

        self.replace(change.resulting);
        batch.emit(renderer);
        cache.reset_all();
        self.state = SyncState::Idle;

        debug!(
            version = self.version,
            prior_len,
            len = self.current.len(),
            ?outcome,
            "Applied ChangeSet"
        );
        outcome
    }
}
