//! Domain types shared by the planner, executor and daemon.
//!
//! Every value here lives for one reconciliation cycle: built from fresh
//! snapshots, consumed by the executor, then dropped.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// One walk of a root directory.
///
/// `entries` keeps walk order, is not deduplicated and includes the root and
/// every directory below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub root: PathBuf,
    pub entries: Vec<PathBuf>,
}

impl Snapshot {
    pub fn new(root: impl Into<PathBuf>, entries: Vec<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entries,
        }
    }
}

// ---------------------------------------------------------------------------
// RelativeName
// ---------------------------------------------------------------------------

/// A snapshot entry with its root removed, used to match entries across
/// snapshots.
///
/// The root is removed as a literal byte prefix, not path-aware: with root
/// `/a/b` the entry `/a/bc/x` becomes `c/x`. An entry that does not start with
/// the root is kept whole. Equality is plain byte equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RelativeName<'a>(&'a [u8]);

impl<'a> RelativeName<'a> {
    pub fn strip(path: &'a Path, root: &Path) -> Self {
        let bytes = path.as_os_str().as_bytes();
        let root = root.as_os_str().as_bytes();
        Self(bytes.strip_prefix(root).unwrap_or(bytes))
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.0
    }

    /// Concatenate `root` and this name byte for byte.
    ///
    /// This is not [`Path::join`]: a name starting with `/` is appended, not
    /// treated as a new absolute path.
    pub fn rebase(&self, root: &Path) -> PathBuf {
        let mut joined = OsString::from(root.as_os_str());
        joined.push(OsStr::from_bytes(self.0));
        PathBuf::from(joined)
    }
}

impl fmt::Display for RelativeName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        String::from_utf8_lossy(self.0).fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Roots
// ---------------------------------------------------------------------------

/// The pair of absolute roots one mirror operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorRoots {
    pub source: PathBuf,
    pub target: PathBuf,
}

impl MirrorRoots {
    pub fn new(source: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// The three kinds of work a cycle can dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Delete,
    Copy,
    Resolve,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Delete => write!(f, "delete"),
            ActionKind::Copy => write!(f, "copy"),
            ActionKind::Resolve => write!(f, "resolve"),
        }
    }
}

/// The path lists of one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionSet {
    /// Absolute target paths to remove.
    Delete(Vec<PathBuf>),
    /// Absolute source paths to copy into the target root.
    Copy(Vec<PathBuf>),
    /// Stale target files: `delete[i]` is replaced by a copy of `add[i]`.
    Resolve {
        add: Vec<PathBuf>,
        delete: Vec<PathBuf>,
    },
}

impl ActionSet {
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionSet::Delete(_) => ActionKind::Delete,
            ActionSet::Copy(_) => ActionKind::Copy,
            ActionSet::Resolve { .. } => ActionKind::Resolve,
        }
    }

    /// Number of files the action touches; a resolve pair counts once.
    pub fn len(&self) -> usize {
        match self {
            ActionSet::Delete(paths) | ActionSet::Copy(paths) => paths.len(),
            ActionSet::Resolve { add, .. } => add.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A unit of executor work: an action set and the roots it applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub roots: MirrorRoots,
    pub set: ActionSet,
}

impl Action {
    pub fn new(roots: MirrorRoots, set: ActionSet) -> Self {
        Self { roots, set }
    }

    pub fn kind(&self) -> ActionKind {
        self.set.kind()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
