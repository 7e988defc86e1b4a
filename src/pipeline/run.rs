// src/pipeline/run.rs

//! One full watch run: fetch, diff, persist, notify.

use std::time::Duration;

use crate::error::{AppError, Result};
use crate::models::{AppConfig, SubscriberConfig};
use crate::pipeline::diff;
use crate::services::{Notifier, PageSource, RegistryFetcher, dispatch};
use crate::storage::SnapshotStore;

/// Options for a single run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Compute and persist the change report but skip delivery
    pub dry_run: bool,
}

/// Outcome of a single run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunSummary {
    /// Records in the saved snapshot
    pub record_count: usize,
    /// No baseline existed; the snapshot was seeded without a report
    pub first_run: bool,
    pub added: usize,
    pub modified: usize,
    pub removed: usize,
    pub sent: usize,
    pub failed: usize,
}

/// Run the watcher once.
///
/// An empty fetch is fatal: persisting it would read as "everything
/// removed" on the next run, so the baseline is left untouched and the
/// error propagates to a non-zero exit.
pub async fn run_once<S: PageSource>(
    config: &AppConfig,
    subscriber_config: &SubscriberConfig,
    fetcher: &RegistryFetcher<S>,
    storage: &dyn SnapshotStore,
    notifier: &dyn Notifier,
    options: &RunOptions,
) -> Result<RunSummary> {
    log::info!("Fetching the canteen registry...");
    let records = fetcher.fetch_all().await?;
    if records.is_empty() {
        return Err(AppError::EmptyFetch);
    }
    log::info!("Fetched {} records", records.len());

    let Some(previous) = storage.load().await? else {
        let snapshot = storage.save(&records).await?;
        log::info!(
            "First run: baseline saved with {} records, nothing to compare",
            snapshot.len()
        );
        return Ok(RunSummary {
            record_count: snapshot.len(),
            first_run: true,
            ..RunSummary::default()
        });
    };

    let changes = diff(&previous, &records);
    let report_path = storage.save_report(&changes).await?;
    let snapshot = storage.save(&records).await?;

    log::info!(
        "Diff: {} added, {} modified, {} removed (report: {})",
        changes.added.len(),
        changes.modified.len(),
        changes.removed.len(),
        report_path.display()
    );

    let mut summary = RunSummary {
        record_count: snapshot.len(),
        added: changes.added.len(),
        modified: changes.modified.len(),
        removed: changes.removed.len(),
        ..RunSummary::default()
    };

    if !changes.has_changes() {
        log::info!("No changes since the previous snapshot");
        return Ok(summary);
    }

    if options.dry_run {
        log::info!("Dry run: skipping notification delivery");
        return Ok(summary);
    }

    let outcome = dispatch(
        notifier,
        &subscriber_config.subscribers,
        &changes,
        &subscriber_config.subject_prefix,
        Duration::from_millis(config.notify.send_delay_ms),
    )
    .await;

    log::info!(
        "Delivery: {} sent, {} failed, {} skipped",
        outcome.sent,
        outcome.failed,
        outcome.skipped
    );

    summary.sent = outcome.sent;
    summary.failed = outcome.failed;
    Ok(summary)
}
