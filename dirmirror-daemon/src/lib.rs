//! Mirror daemon runtime: snapshot lister + concurrent reconciler + interval
//! scheduler.

mod error;
pub mod lister;
pub mod reconciler;
mod runtime;

pub use error::DaemonError;
pub use lister::{list_snapshot, take_snapshots};
pub use reconciler::{reconcile, ReconcileReport};
pub use runtime::{init_tracing, run, run_cycle, run_once_blocking, start_blocking, CycleSummary};
