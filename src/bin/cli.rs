//! cantine-watch CLI
//!
//! One invocation is one run: snapshot the registry, diff against the
//! previous snapshot, notify subscribers. Exit code is non-zero when the
//! fetch yields zero records.

use std::path::PathBuf;

use clap::Parser;

use cantine_watch::{
    config,
    error::Result,
    pipeline::{self, RunOptions},
    services::{HttpNotifier, HttpPageSource, RegistryFetcher},
    storage::LocalStorage,
};

/// cantine-watch - Canteen registry change watcher
#[derive(Parser, Debug)]
#[command(
    name = "cantine-watch",
    version,
    about = "Watches the public canteen registry and mails scoped change digests"
)]
struct Cli {
    /// Path to storage directory containing config files and the snapshot
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Compute and report changes without sending notifications
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("cantine-watch starting...");

    let (config, subscriber_config) = config::load_all(&cli.storage_dir)?;
    log::info!(
        "Loaded configuration from {} ({} subscriber(s))",
        cli.storage_dir.display(),
        subscriber_config.subscribers.len()
    );

    let storage = LocalStorage::new(&cli.storage_dir);
    let source = HttpPageSource::new(&config.api)?;
    let fetcher = RegistryFetcher::new(source, &config.api);
    let notifier = HttpNotifier::new(&config.notify, subscriber_config.sender.clone())?;

    let summary = pipeline::run_once(
        &config,
        &subscriber_config,
        &fetcher,
        &storage,
        &notifier,
        &RunOptions {
            dry_run: cli.dry_run,
        },
    )
    .await?;

    if summary.first_run {
        log::info!("Baseline seeded with {} records", summary.record_count);
    } else {
        log::info!(
            "Run complete: {} added, {} modified, {} removed; {} notification(s) sent, {} failed",
            summary.added,
            summary.modified,
            summary.removed,
            summary.sent,
            summary.failed
        );
    }

    Ok(())
}
