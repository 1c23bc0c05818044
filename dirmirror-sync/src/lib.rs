//! # dirmirror-sync
//!
//! Reconciliation engine: snapshot diffing, staleness detection and the
//! filesystem executor.
//!
//! Call [`plan_cycle`] with a source and target [`Snapshot`] to get the
//! delete/copy/resolve sets of one cycle, then hand each [`Action`] from
//! [`CyclePlan::into_actions`] to [`execute`]. Everything here blocks on the
//! filesystem; concurrency lives in the daemon.
//!
//! [`Snapshot`]: dirmirror_core::Snapshot
//! [`Action`]: dirmirror_core::Action

pub mod differ;
pub mod error;
pub mod executor;
pub mod plan;
pub mod staleness;

pub use differ::{difference, try_difference};
pub use error::SyncError;
pub use executor::{execute, ActionReport};
pub use plan::{plan_cycle, CyclePlan};
pub use staleness::{resolvable_differences, try_resolvable_differences, StalePairs};
