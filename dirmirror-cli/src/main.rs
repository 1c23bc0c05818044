//! dirmirror — one-way periodic directory mirror.
//!
//! # Usage
//!
//! ```text
//! dirmirror -s <source> -t <target> [-i <seconds>] [-d] [--once]
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use dirmirror_core::{MirrorConfig, DEFAULT_INTERVAL_SECS};
use dirmirror_daemon::{run_once_blocking, start_blocking, CycleSummary};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "dirmirror",
    version,
    about = "Keep a target directory's files in sync with a source directory",
    long_about = None,
)]
struct Cli {
    /// Absolute path of the directory to mirror from.
    #[arg(short = 's', long = "source", value_name = "PATH")]
    source: PathBuf,

    /// Absolute path of the directory to mirror into.
    #[arg(short = 't', long = "target", value_name = "PATH")]
    target: PathBuf,

    /// Seconds to wait between cycles.
    #[arg(short = 'i', long = "interval", value_name = "SECONDS", default_value_t = DEFAULT_INTERVAL_SECS)]
    interval: u64,

    /// Log snapshots and every file operation.
    #[arg(short = 'd', long = "debug")]
    debug: bool,

    /// Run a single cycle, print a summary and exit.
    #[arg(long)]
    once: bool,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = MirrorConfig::new(cli.source, cli.target, cli.interval, cli.debug)
        .context("invalid arguments")?;

    if cli.once {
        let summary = run_once_blocking(config).context("mirror cycle failed")?;
        print_summary(&summary);
    } else {
        start_blocking(config).context("mirror daemon exited with error")?;
    }
    Ok(())
}

fn print_summary(summary: &CycleSummary) {
    let failed = summary.report.failed_actions();
    let mark = if failed == 0 {
        "✓".green()
    } else {
        "✗".red()
    };

    if summary.report.is_noop() {
        println!("{mark} already in sync ({} ms)", summary.duration_ms);
        return;
    }

    println!(
        "{mark} cycle finished in {} ms ({} copied, {} updated, {} deleted)",
        summary.duration_ms,
        summary.copied(),
        summary.updated(),
        summary.deleted(),
    );

    for action in &summary.report.actions {
        for err in &action.errors {
            println!("  {} {}: {err}", "!".yellow(), action.kind);
        }
    }
    if failed > 0 {
        println!("  {failed} action(s) stopped early; see log for details");
    }
}
