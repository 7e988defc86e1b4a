//! Storage abstractions for snapshot and report persistence.
//!
//! The snapshot is the comparison baseline for the next run; it is only
//! ever replaced wholesale after a complete fetch. Change reports are
//! write-only audit artifacts, one per run date.

pub mod local;

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ChangeSet, Record, Snapshot};

// Re-export for convenience
pub use local::LocalStorage;

/// Trait for snapshot storage backends.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the previous snapshot.
    ///
    /// `None` signals a first run: either no snapshot exists or the file
    /// is unreadable. Corruption is logged and treated as absent, never
    /// surfaced as an error.
    async fn load(&self) -> Result<Option<Snapshot>>;

    /// Index the records by id, persist them atomically, and return the
    /// indexed snapshot so the caller need not re-derive it.
    async fn save(&self, records: &[Record]) -> Result<Snapshot>;

    /// Persist the full unfiltered change set for this run's date and
    /// return where it was written.
    async fn save_report(&self, changes: &ChangeSet) -> Result<PathBuf>;
}
