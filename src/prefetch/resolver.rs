use std::collections::BTreeSet;

use tracing::trace;

use crate::layout::{ElementLocator, Rect};
use crate::models::{AssetHandle, AssetSequence, IndexBias};

/// Maps regions of the content area to the assets displayed there.
///
/// Borrowed for the duration of one lookup pass so it always sees the
/// sequence snapshot the caller is working against.
pub struct IndexResolver<'a, L: ?Sized> {
    locator: &'a L,
    sequence: &'a AssetSequence,
    bias: IndexBias,
}

impl<'a, L: ElementLocator + ?Sized> IndexResolver<'a, L> {
    pub fn new(locator: &'a L, sequence: &'a AssetSequence, bias: IndexBias) -> Self {
        Self {
            locator,
            sequence,
            bias,
        }
    }

    /// Data indices of the assets intersecting `rect`.
    ///
    /// UI indices that fall on synthetic leading cells or past the end of the
    /// sequence are dropped.
    pub fn data_indices_for_region(&self, rect: Rect) -> BTreeSet<usize> {
        let len = self.sequence.len();
        let mut dropped = 0usize;
        let indices = self
            .locator
            .indices_in_rect(rect)
            .into_iter()
            .filter_map(|ui_index| {
                let data_index = self.bias.to_data(ui_index).filter(|&i| i < len);
                if data_index.is_none() {
                    dropped += 1;
                }
                data_index
            })
            .collect();
        if dropped > 0 {
            trace!(dropped, "Skipped UI indices without a backing asset");
        }
        indices
    }

    pub fn handles_for_region(&self, rect: Rect) -> Vec<AssetHandle> {
        self.collect_handles(self.data_indices_for_region(rect))
    }

    /// Union of the assets intersecting any of `rects`, in sequence order.
    pub fn handles_for_regions(&self, rects: &[Rect]) -> Vec<AssetHandle> {
        let indices = rects
            .iter()
            .flat_map(|rect| self.data_indices_for_region(*rect))
            .collect::<BTreeSet<_>>();
        self.collect_handles(indices)
    }

    fn collect_handles(&self, indices: BTreeSet<usize>) -> Vec<AssetHandle> {
        indices
            .into_iter()
            .filter_map(|i| self.sequence.get(i).cloned())
            .collect()
    }
}
