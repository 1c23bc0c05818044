//! Validated runtime configuration.
//!
//! The daemon takes no config file; [`MirrorConfig`] is built once from
//! process arguments and handed to each entry point.

use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::types::MirrorRoots;

/// Default polling interval in seconds.
pub const DEFAULT_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorConfig {
    pub roots: MirrorRoots,
    /// Pause between the end of one cycle and the start of the next.
    pub interval: Duration,
    /// Emit per-path and snapshot detail at debug level.
    pub verbose: bool,
}

impl MirrorConfig {
    /// Validate roots and interval.
    ///
    /// Roots are kept exactly as given. Relative names are computed by
    /// literal prefix stripping, so a root ending in a separator is rejected:
    /// with source `/p/src/` a copy of `/p/src/a.txt` would land at
    /// `/p/tgta.txt`, beside the target root.
    pub fn new(
        source: impl Into<PathBuf>,
        target: impl Into<PathBuf>,
        interval_secs: u64,
        verbose: bool,
    ) -> Result<Self, ConfigError> {
        let source = source.into();
        let target = target.into();

        check_absolute("source", &source)?;
        check_absolute("target", &target)?;
        check_no_trailing_separator("source", &source)?;
        check_no_trailing_separator("target", &target)?;

        if interval_secs == 0 {
            return Err(ConfigError::ZeroInterval);
        }

        if source == target {
            return Err(ConfigError::SameRoot { path: source });
        }
        if target.starts_with(&source) {
            return Err(ConfigError::NestedRoots {
                outer: source,
                inner: target,
            });
        }
        if source.starts_with(&target) {
            return Err(ConfigError::NestedRoots {
                outer: target,
                inner: source,
            });
        }

        Ok(Self {
            roots: MirrorRoots { source, target },
            interval: Duration::from_secs(interval_secs),
            verbose,
        })
    }
}

fn check_absolute(role: &'static str, path: &Path) -> Result<(), ConfigError> {
    if path.is_absolute() {
        Ok(())
    } else {
        Err(ConfigError::RelativeRoot {
            role,
            path: path.to_path_buf(),
        })
    }
}

fn check_no_trailing_separator(role: &'static str, path: &Path) -> Result<(), ConfigError> {
    let raw = path.as_os_str().as_bytes();
    if raw.len() > 1 && raw.ends_with(b"/") {
        Err(ConfigError::TrailingSeparator {
            role,
            path: path.to_path_buf(),
        })
    } else {
        Ok(())
    }
}
