//! Geometric difference between two preheat windows.
//!
//! Windows only ever move along the scroll axis, so the difference of two
//! overlapping windows is at most one strip at each end.

use crate::layout::Rect;

/// Regions that entered (`added`) and left (`removed`) the preheat window.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegionSet {
    pub added: Vec<Rect>,
    pub removed: Vec<Rect>,
}

impl RegionSet {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Computes the regions gained and lost when the window moves from `old` to
/// `new`.
///
/// Overlapping windows yield strips spanning `new`'s horizontal extent.
/// Disjoint windows, including a zero-area `old`, yield `([new], [old])`.
pub fn diff(old: Rect, new: Rect) -> RegionSet {
    if old == new {
        return RegionSet::default();
    }

    if !old.intersects(&new) {
        return RegionSet {
            added: vec![new],
            removed: vec![old],
        };
    }

    let strip = |from_y: f64, to_y: f64| Rect::new(new.x, from_y, new.width, to_y - from_y);

    let mut added = Vec::with_capacity(2);
    if new.max_y() > old.max_y() {
        added.push(strip(old.max_y(), new.max_y()));
    }
    if old.min_y() > new.min_y() {
        added.push(strip(new.min_y(), old.min_y()));
    }

    let mut removed = Vec::with_capacity(2);
    if new.max_y() < old.max_y() {
        removed.push(strip(new.max_y(), old.max_y()));
    }
    if old.min_y() < new.min_y() {
        removed.push(strip(old.min_y(), new.min_y()));
    }

    RegionSet { added, removed }
}
