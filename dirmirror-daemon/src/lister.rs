//! Snapshot lister: flatten a directory tree into absolute paths.

use std::path::Path;

use dirmirror_core::{MirrorRoots, Snapshot};
use walkdir::WalkDir;

use crate::error::DaemonError;

/// Walk `root` and return every entry under it, the root included.
///
/// Entries are in lexical order per directory; symlinks are listed but not
/// followed. Any walk error fails the whole listing.
pub fn list_snapshot(root: &Path) -> Result<Snapshot, DaemonError> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|source| DaemonError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        entries.push(entry.into_path());
    }
    Ok(Snapshot::new(root, entries))
}

/// List source and target concurrently on blocking workers.
pub async fn take_snapshots(roots: &MirrorRoots) -> Result<(Snapshot, Snapshot), DaemonError> {
    let source_root = roots.source.clone();
    let target_root = roots.target.clone();

    let source = tokio::task::spawn_blocking(move || list_snapshot(&source_root));
    let target = tokio::task::spawn_blocking(move || list_snapshot(&target_root));
    let (source, target) = tokio::join!(source, target);

    let source = source.map_err(|err| DaemonError::Join(format!("source listing: {err}")))??;
    let target = target.map_err(|err| DaemonError::Join(format!("target listing: {err}")))??;
    Ok((source, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn lists_root_directories_and_files_in_lexical_order() {
        let root = TempDir::new().expect("root");
        fs::create_dir_all(root.path().join("b/inner")).expect("mkdir");
        fs::write(root.path().join("b/inner/z.txt"), "z").expect("write");
        fs::write(root.path().join("a.txt"), "a").expect("write");

        let snapshot = list_snapshot(root.path()).expect("list");
        assert_eq!(snapshot.root, root.path());
        assert_eq!(
            snapshot.entries,
            vec![
                root.path().to_path_buf(),
                root.path().join("a.txt"),
                root.path().join("b"),
                root.path().join("b/inner"),
                root.path().join("b/inner/z.txt"),
            ]
        );
    }

    #[test]
    fn empty_root_lists_only_itself() {
        let root = TempDir::new().expect("root");
        let snapshot = list_snapshot(root.path()).expect("list");
        assert_eq!(snapshot.entries, vec![root.path().to_path_buf()]);
    }

    #[test]
    fn missing_root_is_a_walk_error() {
        let root = TempDir::new().expect("root");
        let missing = root.path().join("does-not-exist");

        let err = list_snapshot(&missing).unwrap_err();
        match err {
            DaemonError::Walk { root, .. } => assert_eq!(root, missing),
            other => panic!("expected walk error, got {other:?}"),
        }
    }

    #[test]
    fn symlinked_directories_are_not_followed() {
        let root = TempDir::new().expect("root");
        let outside = TempDir::new().expect("outside");
        fs::write(outside.path().join("secret.txt"), "s").expect("write");
        std::os::unix::fs::symlink(outside.path(), root.path().join("link")).expect("symlink");

        let snapshot = list_snapshot(root.path()).expect("list");
        assert!(snapshot.entries.contains(&root.path().join("link")));
        assert!(!snapshot
            .entries
            .contains(&root.path().join("link/secret.txt")));
    }

    #[tokio::test]
    async fn takes_both_snapshots() {
        let src = TempDir::new().expect("src");
        let tgt = TempDir::new().expect("tgt");
        fs::write(src.path().join("a.txt"), "a").expect("write");

        let roots = MirrorRoots::new(src.path(), tgt.path());
        let (source, target) = take_snapshots(&roots).await.expect("snapshots");
        assert_eq!(source.entries.len(), 2);
        assert_eq!(target.entries.len(), 1);
        assert_eq!(target.root, tgt.path());
    }

    #[tokio::test]
    async fn missing_target_fails_the_pair() {
        let src = TempDir::new().expect("src");
        let tgt = TempDir::new().expect("tgt");
        let roots = MirrorRoots::new(src.path(), tgt.path().join("absent"));

        let err = take_snapshots(&roots).await.unwrap_err();
        assert!(matches!(err, DaemonError::Walk { .. }), "got: {err}");
    }
}
