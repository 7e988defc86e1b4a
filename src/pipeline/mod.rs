//! Pipeline entry points for watcher operations.
//!
//! - `diff`: Compute the change set between two snapshots
//! - `filter_for_scope`: Restrict a change set to a subscriber's scope
//! - `run_once`: One full watch run, fetch through notification

pub mod diff;
pub mod run;
pub mod scope;

pub use diff::diff;
pub use run::{RunOptions, RunSummary, run_once};
pub use scope::filter_for_scope;
