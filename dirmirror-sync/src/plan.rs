//! Per-cycle planning: turn two snapshots into delete, copy and resolve sets.

use std::path::PathBuf;

use dirmirror_core::{Action, ActionSet, MirrorRoots, Snapshot};

use crate::{difference, resolvable_differences, StalePairs};

/// The three action sets of one cycle, all computed from the same snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CyclePlan {
    pub roots: MirrorRoots,
    /// Target files with no source counterpart, longest path first.
    pub delete: Vec<PathBuf>,
    /// Source files with no target counterpart, longest path first.
    pub copy: Vec<PathBuf>,
    /// Target files older than their source counterpart.
    pub stale: StalePairs,
}

impl CyclePlan {
    pub fn is_empty(&self) -> bool {
        self.delete.is_empty() && self.copy.is_empty() && self.stale.is_empty()
    }

    /// One action per non-empty set, in delete, copy, resolve order.
    pub fn into_actions(self) -> Vec<Action> {
        let mut actions = Vec::with_capacity(3);
        if !self.delete.is_empty() {
            actions.push(Action::new(
                self.roots.clone(),
                ActionSet::Delete(self.delete),
            ));
        }
        if !self.copy.is_empty() {
            actions.push(Action::new(self.roots.clone(), ActionSet::Copy(self.copy)));
        }
        if !self.stale.is_empty() {
            let (add, delete) = self.stale.into_lists();
            actions.push(Action::new(self.roots, ActionSet::Resolve { add, delete }));
        }
        actions
    }
}

/// Compute the delete, copy and resolve sets for `source` → `target`.
///
/// Stats every non-directory entry; a stat failure empties only the set whose
/// computation hit it.
pub fn plan_cycle(source: &Snapshot, target: &Snapshot) -> CyclePlan {
    tracing::info!("looking for files to delete");
    let delete = difference(&target.entries, &source.entries, &target.root, &source.root);
    if !delete.is_empty() {
        tracing::info!(count = delete.len(), "found files to delete");
    }

    tracing::info!("looking for files to copy");
    let copy = difference(&source.entries, &target.entries, &source.root, &target.root);
    if !copy.is_empty() {
        tracing::info!(count = copy.len(), "found files to copy");
    }

    let stale = resolvable_differences(&source.entries, &target.entries, &source.root, &target.root);
    if !stale.is_empty() {
        tracing::info!(count = stale.len(), "found stale files to update");
    }

    CyclePlan {
        roots: MirrorRoots::new(source.root.clone(), target.root.clone()),
        delete,
        copy,
        stale,
    }
}
