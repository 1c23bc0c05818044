//! Error types for dirmirror-sync.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from diffing and executing actions.
///
/// Not-found, permission and other I/O failures share one variant; callers
/// treat them alike.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A copy source is a symlink, device, socket or directory.
    #[error("{path} is not a regular file")]
    NotRegularFile { path: PathBuf },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
