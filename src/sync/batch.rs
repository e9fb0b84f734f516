use std::collections::BTreeSet;

use crate::models::{ChangeSet, IndexBias};
use crate::providers::ViewRenderer;

/// One renderer call, with indices already in UI space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOp {
    Delete(Vec<usize>),
    Insert(Vec<usize>),
    Reload(Vec<usize>),
    Move { from: usize, to: usize },
    ReloadAll,
}

/// Renderer calls for one ChangeSet, in the order the renderer must see them.
///
/// Deletions, insertions and reloads come first and moves last, because the
/// renderer resolves row bookkeeping for the first three before it interprets
/// any move. Empty groups are left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderBatch {
    ops: Vec<RenderOp>,
}

impl RenderBatch {
    pub fn full_reload() -> Self {
        Self {
            ops: vec![RenderOp::ReloadAll],
        }
    }

    /// Translates the incremental details of `change` into UI space.
    pub fn incremental(change: &ChangeSet, bias: IndexBias) -> Self {
        let to_ui = |indices: &BTreeSet<usize>| -> Vec<usize> {
            indices.iter().map(|&i| bias.to_ui(i)).collect()
        };

        let mut ops = Vec::with_capacity(3 + change.moves.len());
        if !change.removed.is_empty() {
            ops.push(RenderOp::Delete(to_ui(&change.removed)));
        }
        if !change.inserted.is_empty() {
            ops.push(RenderOp::Insert(to_ui(&change.inserted)));
        }
        if !change.changed.is_empty() {
            ops.push(RenderOp::Reload(to_ui(&change.changed)));
        }
        ops.extend(change.moves.iter().map(|&(from, to)| RenderOp::Move {
            from: bias.to_ui(from),
            to: bias.to_ui(to),
        }));
        Self { ops }
    }

    pub fn ops(&self) -> &[RenderOp] {
        &self.ops
    }

    pub fn is_full_reload(&self) -> bool {
        self.ops == [RenderOp::ReloadAll]
    }

    /// Plays the batch into `renderer`. Incremental batches are wrapped in a
    /// single begin/end update pair.
    pub fn emit<R: ViewRenderer + ?Sized>(&self, renderer: &mut R) {
        if self.is_full_reload() {
            renderer.reload_all();
            return;
        }
        if self.ops.is_empty() {
            return;
        }

        renderer.begin_updates();
        for op in &self.ops {
            match op {
                RenderOp::Delete(indices) => renderer.delete_items(indices),
                RenderOp::Insert(indices) => renderer.insert_items(indices),
                RenderOp::Reload(indices) => renderer.reload_items(indices),
                RenderOp::Move { from, to } => renderer.move_item(*from, *to),
                RenderOp::ReloadAll => renderer.reload_all(),
            }
        }
        renderer.end_updates();
    }
}
