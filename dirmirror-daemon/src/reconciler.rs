//! Concurrent dispatch of one cycle's action sets.
//!
//! Planning runs on a blocking worker; each non-empty set then gets its own
//! blocking task in a [`JoinSet`]. Tasks are not ordered against each other
//! and may touch the same directories: a delete task can find a directory
//! non-empty because a copy task just populated it, and fail on the prune.

use dirmirror_core::{ActionKind, Snapshot};
use dirmirror_sync::{execute, plan_cycle, ActionReport};
use tokio::task::JoinSet;

use crate::error::DaemonError;

/// Aggregated result of one reconciliation.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    pub planned_delete: usize,
    pub planned_copy: usize,
    pub planned_resolve: usize,
    /// One report per dispatched action, in completion order.
    pub actions: Vec<ActionReport>,
    /// Executor tasks that panicked or were cancelled.
    pub lost_tasks: usize,
}

impl ReconcileReport {
    pub fn action(&self, kind: ActionKind) -> Option<&ActionReport> {
        self.actions.iter().find(|report| report.kind == kind)
    }

    pub fn failed_actions(&self) -> usize {
        self.actions.iter().filter(|r| !r.is_success()).count() + self.lost_tasks
    }

    pub fn is_noop(&self) -> bool {
        self.planned_delete == 0 && self.planned_copy == 0 && self.planned_resolve == 0
    }
}

/// Reconcile `target` towards `source` and wait for every dispatched task.
///
/// A failing action is recorded in its [`ActionReport`] and never cancels the
/// others. Only a panic while planning is returned as an error.
pub async fn reconcile(source: Snapshot, target: Snapshot) -> Result<ReconcileReport, DaemonError> {
    let plan = tokio::task::spawn_blocking(move || plan_cycle(&source, &target))
        .await
        .map_err(|err| DaemonError::Join(format!("planning: {err}")))?;

    let mut report = ReconcileReport {
        planned_delete: plan.delete.len(),
        planned_copy: plan.copy.len(),
        planned_resolve: plan.stale.len(),
        ..ReconcileReport::default()
    };

    let mut tasks = JoinSet::new();
    for action in plan.into_actions() {
        tasks.spawn_blocking(move || execute(&action));
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(action_report) => report.actions.push(action_report),
            Err(err) => {
                tracing::error!(error = %err, "executor task did not complete");
                report.lost_tasks += 1;
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use std::time::{Duration, SystemTime};

    use filetime::{set_file_mtime, FileTime};
    use tempfile::TempDir;

    use crate::lister::list_snapshot;

    fn write(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, body).expect("write");
    }

    async fn reconcile_dirs(src: &Path, tgt: &Path) -> ReconcileReport {
        let source = list_snapshot(src).expect("source");
        let target = list_snapshot(tgt).expect("target");
        reconcile(source, target).await.expect("reconcile")
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn dispatches_all_three_action_kinds() {
        let src = TempDir::new().expect("src");
        let tgt = TempDir::new().expect("tgt");
        write(src.path(), "new/a.txt", "a");
        write(src.path(), "shared.txt", "v2");
        write(tgt.path(), "shared.txt", "v1");
        write(tgt.path(), "orphan/b.txt", "b");
        let old = FileTime::from_system_time(SystemTime::now() - Duration::from_secs(3600));
        set_file_mtime(tgt.path().join("shared.txt"), old).expect("age");

        let report = reconcile_dirs(src.path(), tgt.path()).await;

        assert_eq!(report.actions.len(), 3);
        assert_eq!(report.failed_actions(), 0);
        for kind in [ActionKind::Delete, ActionKind::Copy, ActionKind::Resolve] {
            assert!(report.action(kind).is_some(), "missing {kind} report");
        }
        assert_eq!(
            fs::read_to_string(tgt.path().join("shared.txt")).expect("read"),
            "v2"
        );
        assert!(tgt.path().join("new/a.txt").exists());
        assert!(!tgt.path().join("orphan").exists());
    }

    #[tokio::test]
    async fn empty_sets_dispatch_nothing() {
        let src = TempDir::new().expect("src");
        let tgt = TempDir::new().expect("tgt");

        let report = reconcile_dirs(src.path(), tgt.path()).await;
        assert!(report.is_noop());
        assert!(report.actions.is_empty());
    }

    #[tokio::test]
    async fn failing_action_does_not_block_others() {
        let src = TempDir::new().expect("src");
        let tgt = TempDir::new().expect("tgt");
        write(src.path(), "good.txt", "ok");
        write(src.path(), "real.txt", "r");
        std::os::unix::fs::symlink(src.path().join("real.txt"), src.path().join("zz-link.txt"))
            .expect("symlink");
        write(tgt.path(), "stale-extra.txt", "x");

        let report = reconcile_dirs(src.path(), tgt.path()).await;

        let copy = report.action(ActionKind::Copy).expect("copy report");
        assert!(!copy.is_success(), "symlink copy should fail");
        let delete = report.action(ActionKind::Delete).expect("delete report");
        assert!(delete.is_success());
        assert!(!tgt.path().join("stale-extra.txt").exists());
        assert_eq!(report.failed_actions(), 1);
    }

    #[tokio::test]
    async fn second_reconcile_is_a_no_op() {
        let src = TempDir::new().expect("src");
        let tgt = TempDir::new().expect("tgt");
        write(src.path(), "a/b/c.txt", "c");
        write(src.path(), "d.txt", "d");
        write(tgt.path(), "gone.txt", "g");

        reconcile_dirs(src.path(), tgt.path()).await;
        let second = reconcile_dirs(src.path(), tgt.path()).await;
        assert!(second.is_noop(), "got: {second:?}");
    }
}
