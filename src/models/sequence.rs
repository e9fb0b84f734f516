//! Immutable ordered snapshot of the assets a grid displays.
//!
//! A snapshot never changes after construction. Replacing the grid's contents
//! means swapping in a new `AssetSequence`; clones share the same backing
//! storage, so "same snapshot" is a pointer comparison.

use std::collections::HashSet;
use std::ops::Index;
use std::sync::Arc;

use crate::error::SequenceError;
use crate::models::AssetHandle;

#[derive(Debug, Clone)]
pub struct AssetSequence {
    handles: Arc<[AssetHandle]>,
}

impl AssetSequence {
    /// Builds a snapshot, rejecting duplicate handles.
    pub fn new(handles: Vec<AssetHandle>) -> Result<Self, SequenceError> {
        let mut seen = HashSet::with_capacity(handles.len());
        for handle in &handles {
            if !seen.insert(handle) {
                return Err(SequenceError::DuplicateHandle {
                    id: handle.id().to_owned(),
                });
            }
        }
        Ok(Self {
            handles: handles.into(),
        })
    }

    /// Builds a snapshot from handles taken out of an existing snapshot.
    pub(crate) fn from_unique(handles: Vec<AssetHandle>) -> Self {
        debug_assert_eq!(
            handles.iter().collect::<HashSet<_>>().len(),
            handles.len(),
            "handles must be unique"
        );
        Self {
            handles: handles.into(),
        }
    }

    pub fn empty() -> Self {
        Self {
            handles: Arc::from(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Returns the handle at `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<&AssetHandle> {
        self.handles.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AssetHandle> {
        self.handles.iter()
    }

    pub fn as_slice(&self) -> &[AssetHandle] {
        &self.handles
    }

    pub fn position(&self, handle: &AssetHandle) -> Option<usize> {
        self.handles.iter().position(|h| h == handle)
    }

    /// True when both values are the same snapshot, not merely equal contents.
    pub fn is_same_snapshot(&self, other: &AssetSequence) -> bool {
        Arc::ptr_eq(&self.handles, &other.handles)
    }

    /// Element-wise comparison of two snapshots.
    pub(crate) fn same_contents(&self, other: &AssetSequence) -> bool {
        self.handles[..] == other.handles[..]
    }
}

impl Default for AssetSequence {
    fn default() -> Self {
        Self::empty()
    }
}

impl Index<usize> for AssetSequence {
    type Output = AssetHandle;

    fn index(&self, index: usize) -> &AssetHandle {
        &self.handles[index]
    }
}

impl<'a> IntoIterator for &'a AssetSequence {
    type Item = &'a AssetHandle;
    type IntoIter = std::slice::Iter<'a, AssetHandle>;

    fn into_iter(self) -> Self::IntoIter {
        self.handles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handles(ids: &[&str]) -> Vec<AssetHandle> {
        ids.iter().map(|id| AssetHandle::image(*id)).collect()
    }

    #[test]
    fn test_rejects_duplicates() {
        let err = AssetSequence::new(handles(&["a", "b", "a"])).unwrap_err();
        assert_eq!(
            err,
            SequenceError::DuplicateHandle {
                id: "a".to_string()
            }
        );
    }

    #[test]
    fn test_index_access_and_bounds() {
        let seq = AssetSequence::new(handles(&["a", "b", "c"])).unwrap();
        assert_eq!(seq.len(), 3);
        assert_eq!(seq[1].id(), "b");
        assert!(seq.get(3).is_none());
        assert_eq!(seq.position(&AssetHandle::image("c")), Some(2));
    }

    #[test]
    fn test_snapshot_identity() {
        let seq = AssetSequence::new(handles(&["a", "b"])).unwrap();
        let alias = seq.clone();
        let rebuilt = AssetSequence::new(handles(&["a", "b"])).unwrap();

        assert!(seq.is_same_snapshot(&alias));
        assert!(!seq.is_same_snapshot(&rebuilt));
        assert!(seq.same_contents(&rebuilt));
    }

    #[test]
    fn test_empty_snapshots_are_distinct() {
        let a = AssetSequence::empty();
        let b = AssetSequence::empty();
        assert!(a.is_empty());
        assert!(a.is_same_snapshot(&a.clone()));
        assert!(a.same_contents(&b));
    }
}
