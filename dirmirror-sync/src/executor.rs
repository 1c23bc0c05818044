//! Filesystem executor for a single [`Action`].
//!
//! Delete and copy are fail-fast: the first error stops the list and the rest
//! is left untouched. Resolve deletes the stale files, then copies the newer
//! ones even if the delete step failed.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use dirmirror_core::{Action, ActionKind, ActionSet, RelativeName};

use crate::error::{io_err, SyncError};

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Outcome of executing one action.
#[derive(Debug)]
pub struct ActionReport {
    pub kind: ActionKind,
    /// Files the action was asked to handle.
    pub requested: usize,
    pub deleted: usize,
    pub pruned_dirs: usize,
    pub copied: usize,
    pub bytes_copied: u64,
    /// Errors that stopped a step. Resolve can carry one per step.
    pub errors: Vec<SyncError>,
}

impl ActionReport {
    pub fn new(kind: ActionKind, requested: usize) -> Self {
        Self {
            kind,
            requested,
            deleted: 0,
            pruned_dirs: 0,
            copied: 0,
            bytes_copied: 0,
            errors: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    fn fail(&mut self, err: SyncError) {
        tracing::error!(action = %self.kind, error = %err, "action step aborted");
        self.errors.push(err);
    }
}

// ---------------------------------------------------------------------------
// execute
// ---------------------------------------------------------------------------

/// Apply `action` to the filesystem and report what happened.
///
/// Errors are recorded in the report, never returned, so one failing action
/// cannot stop its siblings.
pub fn execute(action: &Action) -> ActionReport {
    let roots = &action.roots;
    let mut report = ActionReport::new(action.kind(), action.set.len());

    match &action.set {
        ActionSet::Delete(paths) => {
            tracing::info!(count = paths.len(), "deleting files");
            if let Err(err) = delete_files(paths, &roots.target, &mut report) {
                report.fail(err);
            }
        }
        ActionSet::Copy(paths) => {
            tracing::info!(count = paths.len(), "copying files");
            if let Err(err) = copy_files(paths, &roots.source, &roots.target, &mut report) {
                report.fail(err);
            }
        }
        ActionSet::Resolve { add, delete } => {
            tracing::info!(count = add.len(), "updating files");
            if let Err(err) = delete_files(delete, &roots.target, &mut report) {
                report.fail(err);
            }
            if let Err(err) = copy_files(add, &roots.source, &roots.target, &mut report) {
                report.fail(err);
            }
        }
    }

    tracing::info!(
        action = %report.kind,
        deleted = report.deleted,
        pruned_dirs = report.pruned_dirs,
        copied = report.copied,
        bytes = report.bytes_copied,
        ok = report.is_success(),
        "action finished",
    );
    report
}

fn delete_files(
    paths: &[PathBuf],
    target_root: &Path,
    report: &mut ActionReport,
) -> Result<(), SyncError> {
    for path in paths {
        tracing::debug!(path = %path.display(), "removing");
        remove_entry(path)?;
        report.deleted += 1;
        if prune_empty_parent(path, target_root)? {
            report.pruned_dirs += 1;
        }
    }
    Ok(())
}

fn copy_files(
    paths: &[PathBuf],
    source_root: &Path,
    target_root: &Path,
    report: &mut ActionReport,
) -> Result<(), SyncError> {
    for path in paths {
        tracing::debug!(path = %path.display(), "copying");
        let bytes = copy_file(path, source_root, target_root)?;
        report.copied += 1;
        report.bytes_copied += bytes;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Single-file operations
// ---------------------------------------------------------------------------

/// Remove a file, or an empty directory standing where a file is expected.
pub fn remove_entry(path: &Path) -> Result<(), SyncError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) => match fs::symlink_metadata(path) {
            Ok(meta) if meta.is_dir() => fs::remove_dir(path).map_err(|e| io_err(path, e)),
            _ => Err(io_err(path, err)),
        },
    }
}

/// Remove the parent of a just-deleted `path` if it is now empty.
///
/// Only the immediate parent is considered, and never `target_root` itself.
/// Returns whether a directory was removed.
pub fn prune_empty_parent(path: &Path, target_root: &Path) -> Result<bool, SyncError> {
    let Some(parent) = path.parent() else {
        return Ok(false);
    };
    if parent == target_root || !is_empty_dir(parent)? {
        return Ok(false);
    }
    fs::remove_dir(parent).map_err(|e| io_err(parent, e))?;
    tracing::debug!(dir = %parent.display(), "pruned empty directory");
    Ok(true)
}

/// Whether `dir` has no entries, reading at most one.
pub fn is_empty_dir(dir: &Path) -> Result<bool, SyncError> {
    let mut entries = fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    match entries.next() {
        None => Ok(true),
        Some(Ok(_)) => Ok(false),
        Some(Err(e)) => Err(io_err(dir, e)),
    }
}

/// Where `src` lands under `target_root`.
pub fn destination_path(src: &Path, source_root: &Path, target_root: &Path) -> PathBuf {
    RelativeName::strip(src, source_root).rebase(target_root)
}

/// Copy one regular file into the target tree, creating missing parents and
/// truncating any existing destination. Returns the number of bytes copied.
pub fn copy_file(src: &Path, source_root: &Path, target_root: &Path) -> Result<u64, SyncError> {
    let meta = fs::symlink_metadata(src).map_err(|e| io_err(src, e))?;
    if !meta.file_type().is_file() {
        return Err(SyncError::NotRegularFile {
            path: src.to_path_buf(),
        });
    }

    let mut reader = File::open(src).map_err(|e| io_err(src, e))?;

    let dest = destination_path(src, source_root, target_root);
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    let mut writer = File::create(&dest).map_err(|e| io_err(&dest, e))?;
    io::copy(&mut reader, &mut writer).map_err(|e| io_err(&dest, e))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
