//! One-directional snapshot difference.
//!
//! Entries are matched by [`RelativeName`]. Whether an entry is a directory is
//! decided by a fresh `stat` at call time, not by the file type the walk saw:
//! an entry that turned into a directory since the walk is skipped, and an
//! entry that vanished fails the whole call.

use std::collections::HashMap;
use std::fs::Metadata;
use std::path::{Path, PathBuf};

use dirmirror_core::RelativeName;

use crate::error::{io_err, SyncError};

/// Entries of `original` (walked from `original_root`) whose relative name is
/// absent from `copies` (walked from `copy_root`), longest path first.
///
/// Directories are never reported. Any stat failure discards the partial
/// result and yields an empty list; use [`try_difference`] to see the error.
pub fn difference(
    original: &[PathBuf],
    copies: &[PathBuf],
    original_root: &Path,
    copy_root: &Path,
) -> Vec<PathBuf> {
    match try_difference(original, copies, original_root, copy_root) {
        Ok(missing) => missing,
        Err(err) => {
            tracing::warn!(
                error = %err,
                root = %original_root.display(),
                "difference aborted, treating as no differences"
            );
            Vec::new()
        }
    }
}

/// [`difference`], surfacing the first stat failure instead of swallowing it.
pub fn try_difference(
    original: &[PathBuf],
    copies: &[PathBuf],
    original_root: &Path,
    copy_root: &Path,
) -> Result<Vec<PathBuf>, SyncError> {
    let index = index_by_name(copies, copy_root);
    let mut missing = Vec::new();

    for path in original {
        if stat(path)?.is_dir() {
            continue;
        }
        let name = RelativeName::strip(path, original_root);
        if !index.contains_key(&name) {
            missing.push(path.clone());
        }
    }

    // Deeper paths first so a parent is probed for emptiness after its
    // children are gone. Stable: equal lengths keep snapshot order.
    missing.sort_by(|a, b| path_len(b).cmp(&path_len(a)));
    Ok(missing)
}

/// Index `entries` by relative name. The first entry with a given name wins.
pub(crate) fn index_by_name<'a>(
    entries: &'a [PathBuf],
    root: &Path,
) -> HashMap<RelativeName<'a>, &'a PathBuf> {
    let mut index = HashMap::with_capacity(entries.len());
    for entry in entries {
        index
            .entry(RelativeName::strip(entry, root))
            .or_insert(entry);
    }
    index
}

/// Fresh `stat`, following symlinks.
pub(crate) fn stat(path: &Path) -> Result<Metadata, SyncError> {
    std::fs::metadata(path).map_err(|e| io_err(path, e))
}

fn path_len(path: &Path) -> usize {
    path.as_os_str().len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tree(files: &[&str], dirs: &[&str]) -> (TempDir, Vec<PathBuf>) {
        let root = TempDir::new().expect("root");
        let mut entries = vec![root.path().to_path_buf()];
        for dir in dirs {
            let path = root.path().join(dir);
            fs::create_dir_all(&path).expect("mkdir");
            entries.push(path);
        }
        for file in files {
            let path = root.path().join(file);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("mkdir parent");
            }
            fs::write(&path, file.as_bytes()).expect("write");
            entries.push(path);
        }
        (root, entries)
    }

    #[test]
    fn reports_files_missing_from_copy() {
        let (src, src_entries) = tree(&["a.txt", "keep.txt"], &[]);
        let (tgt, tgt_entries) = tree(&["keep.txt"], &[]);

        let missing = difference(&src_entries, &tgt_entries, src.path(), tgt.path());
        assert_eq!(missing, vec![src.path().join("a.txt")]);
    }

    #[test]
    fn empty_when_every_file_has_a_match() {
        let (src, src_entries) = tree(&["a.txt", "x/b.txt"], &["x"]);
        let (tgt, tgt_entries) = tree(&["a.txt", "x/b.txt"], &["x"]);

        let missing = difference(&src_entries, &tgt_entries, src.path(), tgt.path());
        assert!(missing.is_empty(), "got: {missing:?}");
    }

    #[test]
    fn directories_are_never_reported() {
        let (src, src_entries) = tree(&[], &["only/in/source"]);
        let (tgt, tgt_entries) = tree(&[], &[]);

        let missing = difference(&src_entries, &tgt_entries, src.path(), tgt.path());
        assert!(missing.is_empty(), "got: {missing:?}");
    }

    #[test]
    fn result_is_sorted_longest_first() {
        let (src, src_entries) = tree(&["a", "deep/er/file.txt", "mid/f.txt"], &[]);
        let (tgt, tgt_entries) = tree(&[], &[]);

        let missing = difference(&src_entries, &tgt_entries, src.path(), tgt.path());
        assert_eq!(
            missing,
            vec![
                src.path().join("deep/er/file.txt"),
                src.path().join("mid/f.txt"),
                src.path().join("a"),
            ]
        );
    }

    #[test]
    fn equal_lengths_keep_snapshot_order() {
        let (src, src_entries) = tree(&["b.txt", "a.txt"], &[]);
        let (tgt, tgt_entries) = tree(&[], &[]);

        let missing = difference(&src_entries, &tgt_entries, src.path(), tgt.path());
        assert_eq!(
            missing,
            vec![src.path().join("b.txt"), src.path().join("a.txt")]
        );
    }

    #[test]
    fn directions_are_independent() {
        let (src, src_entries) = tree(&["only_src.txt", "both.txt"], &[]);
        let (tgt, tgt_entries) = tree(&["only_tgt.txt", "both.txt"], &[]);

        let to_copy = difference(&src_entries, &tgt_entries, src.path(), tgt.path());
        let to_delete = difference(&tgt_entries, &src_entries, tgt.path(), src.path());
        assert_eq!(to_copy, vec![src.path().join("only_src.txt")]);
        assert_eq!(to_delete, vec![tgt.path().join("only_tgt.txt")]);
    }

    #[test]
    fn directory_in_copy_matches_file_in_original() {
        let (src, src_entries) = tree(&["name"], &[]);
        let (tgt, tgt_entries) = tree(&[], &["name"]);

        let missing = difference(&src_entries, &tgt_entries, src.path(), tgt.path());
        assert!(missing.is_empty(), "names match regardless of file type");
    }

    #[test]
    fn stat_failure_discards_all_results() {
        let (src, mut src_entries) = tree(&["a.txt", "b.txt"], &[]);
        let (tgt, tgt_entries) = tree(&[], &[]);
        src_entries.push(src.path().join("vanished.txt"));

        let missing = difference(&src_entries, &tgt_entries, src.path(), tgt.path());
        assert!(missing.is_empty(), "partial results must be dropped");

        let err = try_difference(&src_entries, &tgt_entries, src.path(), tgt.path())
            .expect_err("stat of vanished entry should fail");
        assert!(err.to_string().contains("vanished.txt"), "got: {err}");
    }

    #[test]
    fn index_keeps_first_duplicate() {
        let entries = vec![PathBuf::from("/r/a"), PathBuf::from("/r/a")];
        let index = index_by_name(&entries, Path::new("/r"));
        assert_eq!(index.len(), 1);
        let first = index
            .get(&RelativeName::strip(Path::new("/r/a"), Path::new("/r")))
            .expect("entry");
        assert!(std::ptr::eq(*first, &entries[0]));
    }
}
