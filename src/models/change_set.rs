use std::collections::{BTreeSet, HashMap, HashSet};

use crate::error::{ChangeSetError, IndexKind};
use crate::models::{AssetHandle, AssetSequence};

/// How an ordered collection changed between two observations of the store.
///
/// `removed` indices refer to the sequence before the change; `inserted`,
/// `changed` and move destinations refer to `resulting`. Moves are kept in the
/// order the store reported them.
#[derive(Debug, Clone)]
pub struct ChangeSet {
    pub removed: BTreeSet<usize>,
    pub inserted: BTreeSet<usize>,
    pub changed: BTreeSet<usize>,
    pub moves: Vec<(usize, usize)>,
    pub resulting: AssetSequence,
    pub has_incremental_changes: bool,
}

impl ChangeSet {
    /// An incremental change with no index details yet; fill in with the
    /// `with_*` methods.
    pub fn incremental(resulting: AssetSequence) -> Self {
        Self {
            removed: BTreeSet::new(),
            inserted: BTreeSet::new(),
            changed: BTreeSet::new(),
            moves: Vec::new(),
            resulting,
            has_incremental_changes: true,
        }
    }

    /// A change the store could not describe incrementally.
    pub fn full_reload(resulting: AssetSequence) -> Self {
        Self {
            has_incremental_changes: false,
            ..Self::incremental(resulting)
        }
    }

    pub fn with_removed(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.removed.extend(indices);
        self
    }

    pub fn with_inserted(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.inserted.extend(indices);
        self
    }

    pub fn with_changed(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.changed.extend(indices);
        self
    }

    pub fn with_move(mut self, from: usize, to: usize) -> Self {
        self.moves.push((from, to));
        self
    }

    /// True when an incremental change carries no index details at all.
    pub fn is_empty(&self) -> bool {
        self.has_incremental_changes
            && self.removed.is_empty()
            && self.inserted.is_empty()
            && self.changed.is_empty()
            && self.moves.is_empty()
    }

    /// Derives a ChangeSet for stores that only hand out before/after snapshots.
    ///
    /// Removals and insertions come from set membership. `changed` handles that
    /// survive the transition are reported at their new index. If the surviving
    /// handles were reordered the result is a full reload, since moves cannot be
    /// recovered unambiguously from two snapshots.
    pub fn between(before: &AssetSequence, after: &AssetSequence, changed: &[AssetHandle]) -> Self {
        let before_ids: HashSet<&AssetHandle> = before.iter().collect();
        let after_pos: HashMap<&AssetHandle, usize> =
            after.iter().enumerate().map(|(i, h)| (h, i)).collect();

        let removed: BTreeSet<usize> = before
            .iter()
            .enumerate()
            .filter(|(_, h)| !after_pos.contains_key(h))
            .map(|(i, _)| i)
            .collect();
        let inserted: BTreeSet<usize> = after
            .iter()
            .enumerate()
            .filter(|(_, h)| !before_ids.contains(h))
            .map(|(i, _)| i)
            .collect();

        let survivors_before = before.iter().filter(|h| after_pos.contains_key(h));
        let survivors_after = after.iter().filter(|h| before_ids.contains(h));
        if !survivors_before.eq(survivors_after) {
            return Self::full_reload(after.clone());
        }

        let changed = changed
            .iter()
            .filter(|h| before_ids.contains(h))
            .filter_map(|h| after_pos.get(h).copied());

        Self::incremental(after.clone())
            .with_removed(removed)
            .with_inserted(inserted)
            .with_changed(changed)
    }

    /// Checks every index against the sequence it refers to.
    ///
    /// Removed indices and move sources are bounded by the prior length;
    /// inserted, changed and move destinations by the resulting length.
    pub fn validate(&self, prior_len: usize) -> Result<(), ChangeSetError> {
        let resulting_len = self.resulting.len();
        let check = |kind: IndexKind, index: usize, len: usize| {
            if index < len {
                Ok(())
            } else {
                Err(ChangeSetError::IndexOutOfBounds { kind, index, len })
            }
        };

        for &index in &self.removed {
            check(IndexKind::Removed, index, prior_len)?;
        }
        for &index in &self.inserted {
            check(IndexKind::Inserted, index, resulting_len)?;
        }
        for &index in &self.changed {
            check(IndexKind::Changed, index, resulting_len)?;
        }
        for &(from, to) in &self.moves {
            check(IndexKind::MoveFrom, from, prior_len)?;
            check(IndexKind::MoveTo, to, resulting_len)?;
        }
        Ok(())
    }
}
