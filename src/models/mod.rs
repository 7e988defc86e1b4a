//! Data structures for records, change sets, subscribers, and configuration.

pub mod changes;
pub mod config;
pub mod record;
pub mod subscriber;

pub use changes::{ChangeEntry, ChangeSet, FieldChange, ModifiedEntry, TransitionKind};
pub use config::{ApiConfig, AppConfig, NotifyConfig};
pub use record::{MONITORED_FIELDS, Record, Snapshot, field_label, index_by_id, normalize};
pub use subscriber::{SCOPE_ALL, Sender, Subscriber, SubscriberConfig};
