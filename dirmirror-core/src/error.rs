//! Error types for dirmirror-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while validating a mirror configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A root was given as a relative path.
    #[error("{role} root must be an absolute path, got {path}")]
    RelativeRoot { role: &'static str, path: PathBuf },

    /// A root ends in a separator. Relative names are computed by literal
    /// prefix stripping, so such a root would place copies outside the target.
    #[error("{role} root must not end with a path separator, got {path}")]
    TrailingSeparator { role: &'static str, path: PathBuf },

    /// The polling interval was zero.
    #[error("polling interval must be at least one second")]
    ZeroInterval,

    /// Source and target name the same directory.
    #[error("source and target are the same directory: {path}")]
    SameRoot { path: PathBuf },

    /// One root lies inside the other; each walk would see the other tree.
    #[error("roots must not be nested: {inner} is inside {outer}")]
    NestedRoots { outer: PathBuf, inner: PathBuf },
}
