//! dirmirror core library — domain types, configuration, errors.
//!
//! Public API surface:
//! - [`types`] — snapshots, relative names and action sets
//! - [`config`] — validated [`MirrorConfig`]
//! - [`error`] — [`ConfigError`]
//!
//! Relative names compare raw path bytes, so the crate targets Unix.

pub mod config;
pub mod error;
pub mod types;

pub use config::{MirrorConfig, DEFAULT_INTERVAL_SECS};
pub use error::ConfigError;
pub use types::{Action, ActionKind, ActionSet, MirrorRoots, RelativeName, Snapshot};
