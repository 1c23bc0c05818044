use std::time::Instant;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use dirmirror_core::{ActionKind, MirrorConfig, Snapshot};

use crate::error::{io_err, DaemonError};
use crate::lister::take_snapshots;
use crate::reconciler::{reconcile, ReconcileReport};

/// What one cycle saw and did.
#[derive(Debug)]
pub struct CycleSummary {
    pub started_at: DateTime<Utc>,
    pub source_entries: usize,
    pub target_entries: usize,
    pub report: ReconcileReport,
    pub duration_ms: u128,
}

impl CycleSummary {
    /// Stale files replaced by the resolve action.
    pub fn updated(&self) -> usize {
        self.report
            .action(ActionKind::Resolve)
            .map_or(0, |resolve| resolve.copied)
    }

    /// Files deleted because they were missing from the source.
    pub fn deleted(&self) -> usize {
        self.report
            .action(ActionKind::Delete)
            .map_or(0, |delete| delete.deleted)
    }

    /// Files copied because they were missing from the target.
    pub fn copied(&self) -> usize {
        self.report
            .action(ActionKind::Copy)
            .map_or(0, |copy| copy.copied)
    }
}

/// Start the mirror daemon and block the current thread until Ctrl-C or a
/// fatal walk error.
pub fn start_blocking(config: MirrorConfig) -> Result<(), DaemonError> {
    init_tracing(config.verbose);
    let runtime = build_runtime()?;
    runtime.block_on(async move {
        let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
        let signal_handle = tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("received ctrl-c, shutting down after the current cycle");
                    let _ = shutdown_tx.send(());
                }
                Err(err) => {
                    tracing::warn!(error = %err, "ctrl-c handler failed, running until killed");
                    // This task owns the sender; parking it keeps the channel
                    // open, since a closed channel also stops the scheduler.
                    std::future::pending::<()>().await;
                }
            }
        });

        let result = run(config, shutdown_rx).await;
        signal_handle.abort();
        result
    })
}

/// Run a single cycle on a fresh runtime.
pub fn run_once_blocking(config: MirrorConfig) -> Result<CycleSummary, DaemonError> {
    init_tracing(config.verbose);
    let runtime = build_runtime()?;
    runtime.block_on(run_cycle(&config))
}

/// Run cycles back to back, sleeping `config.interval` between them, until a
/// message arrives on `shutdown` or its sender is dropped.
///
/// A cycle is never interrupted; shutdown takes effect once it completes. A
/// walk failure ends the loop with an error.
pub async fn run(
    config: MirrorConfig,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    tracing::info!(
        source = %config.roots.source.display(),
        target = %config.roots.target.display(),
        interval_secs = config.interval.as_secs(),
        "mirror daemon started",
    );

    loop {
        run_cycle(&config).await?;

        tokio::select! {
            _ = shutdown.recv() => break,
            _ = tokio::time::sleep(config.interval) => {}
        }
    }

    tracing::info!("mirror daemon stopped");
    Ok(())
}

/// Snapshot both roots, reconcile, and summarize.
pub async fn run_cycle(config: &MirrorConfig) -> Result<CycleSummary, DaemonError> {
    let started_at = Utc::now();
    let started = Instant::now();
    tracing::info!(at = %started_at.format("%Y-%m-%d %H:%M:%S"), "cycle started");

    let (source, target) = take_snapshots(&config.roots).await?;
    if tracing::enabled!(tracing::Level::DEBUG) {
        log_snapshot("source", &source);
        log_snapshot("target", &target);
    }

    let source_entries = source.entries.len();
    let target_entries = target.entries.len();
    let report = reconcile(source, target).await?;

    let summary = CycleSummary {
        started_at,
        source_entries,
        target_entries,
        report,
        duration_ms: started.elapsed().as_millis(),
    };

    tracing::info!(
        deleted = summary.deleted(),
        copied = summary.copied(),
        updated = summary.updated(),
        failed_actions = summary.report.failed_actions(),
        duration_ms = summary.duration_ms,
        "cycle finished",
    );
    Ok(summary)
}

/// Install the global fmt subscriber. `RUST_LOG` wins over `verbose`.
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn build_runtime() -> Result<tokio::runtime::Runtime, DaemonError> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))
}

fn log_snapshot(side: &'static str, snapshot: &Snapshot) {
    tracing::debug!(side, root = %snapshot.root.display(), entries = snapshot.entries.len(), "snapshot");
    for entry in &snapshot.entries {
        tracing::debug!(side, path = %entry.display());
    }
}
