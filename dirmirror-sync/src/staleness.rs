//! Modification-time staleness between matched snapshot entries.
//!
//! A target file is stale when the source file with the same relative name
//! has a strictly later mtime. Entries present on one side only belong to the
//! differ.

use std::path::{Path, PathBuf};

use dirmirror_core::RelativeName;

use crate::differ::{index_by_name, stat};
use crate::error::{io_err, SyncError};

/// Paired stale files: `add()[i]` replaces `delete()[i]`.
///
/// Pairs are only ever pushed together, so both lists have the same length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StalePairs {
    add: Vec<PathBuf>,
    delete: Vec<PathBuf>,
}

impl StalePairs {
    pub fn push(&mut self, newer: PathBuf, stale: PathBuf) {
        self.add.push(newer);
        self.delete.push(stale);
    }

    pub fn add(&self) -> &[PathBuf] {
        &self.add
    }

    pub fn delete(&self) -> &[PathBuf] {
        &self.delete
    }

    pub fn len(&self) -> usize {
        self.add.len()
    }

    pub fn is_empty(&self) -> bool {
        self.add.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, &PathBuf)> {
        self.add.iter().zip(self.delete.iter())
    }

    pub fn into_lists(self) -> (Vec<PathBuf>, Vec<PathBuf>) {
        (self.add, self.delete)
    }
}

/// Files of `original` whose match in `copies` has an older mtime.
///
/// Any stat failure yields empty pairs; use [`try_resolvable_differences`] to
/// see the error.
pub fn resolvable_differences(
    original: &[PathBuf],
    copies: &[PathBuf],
    original_root: &Path,
    copy_root: &Path,
) -> StalePairs {
    match try_resolvable_differences(original, copies, original_root, copy_root) {
        Ok(pairs) => pairs,
        Err(err) => {
            tracing::warn!(
                error = %err,
                root = %original_root.display(),
                "staleness check aborted, treating as no stale files"
            );
            StalePairs::default()
        }
    }
}

/// [`resolvable_differences`], surfacing the first stat failure.
pub fn try_resolvable_differences(
    original: &[PathBuf],
    copies: &[PathBuf],
    original_root: &Path,
    copy_root: &Path,
) -> Result<StalePairs, SyncError> {
    let index = index_by_name(copies, copy_root);
    let mut pairs = StalePairs::default();

    for path in original {
        let meta = stat(path)?;
        if meta.is_dir() {
            continue;
        }
        let name = RelativeName::strip(path, original_root);
        let Some(counterpart) = index.get(&name) else {
            continue;
        };

        let original_mtime = meta.modified().map_err(|e| io_err(path, e))?;
        let copy_mtime = stat(counterpart)?
            .modified()
            .map_err(|e| io_err(*counterpart, e))?;
        if original_mtime > copy_mtime {
            pairs.push(path.clone(), (*counterpart).clone());
        }
    }

    Ok(pairs)
}
