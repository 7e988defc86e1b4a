//! Change set structures produced by the diff engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::record::Record;

/// One field-level modification on a record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldChange {
    /// Raw field name
    pub field: String,
    /// Display label
    pub label: String,
    /// Previous normalized value
    pub old: String,
    /// Current normalized value
    pub new: String,
}

/// An added or removed record, with the scope fields denormalized so the
/// filter never has to re-derive them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEntry {
    pub record: Record,
    pub supervising_authority: String,
    pub region: String,
}

impl ChangeEntry {
    pub fn new(record: Record) -> Self {
        Self {
            supervising_authority: record.supervising_authority(),
            region: record.region(),
            record,
        }
    }
}

/// A modified record with its field-level changes.
///
/// `previous_authority` is kept so detachments stay visible to subscribers
/// scoped to the authority the record just left.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifiedEntry {
    pub record: Record,
    pub supervising_authority: String,
    pub region: String,
    pub previous_authority: String,
    pub changes: Vec<FieldChange>,
}

impl ModifiedEntry {
    /// Derived classification of the supervising-authority change, if any.
    ///
    /// Never stored; recomputed wherever rendering needs it so the field
    /// deltas stay the single source of truth.
    pub fn authority_transition(&self) -> Option<TransitionKind> {
        let previous = self.previous_authority.as_str();
        let current = self.supervising_authority.as_str();
        match (previous.is_empty(), current.is_empty()) {
            (true, false) => Some(TransitionKind::Attachment),
            (false, true) => Some(TransitionKind::Detachment),
            (false, false) if previous != current => Some(TransitionKind::Transfer),
            _ => None,
        }
    }
}

/// Kind of supervising-authority transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// Previously unattached, now supervised
    Attachment,
    /// Previously supervised, now unattached
    Detachment,
    /// Moved from one authority to another
    Transfer,
}

/// The result of diffing two snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeSet {
    /// When the diff was computed
    pub generated_at: DateTime<Utc>,
    pub added: Vec<ChangeEntry>,
    pub modified: Vec<ModifiedEntry>,
    pub removed: Vec<ChangeEntry>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self {
            generated_at: Utc::now(),
            added: Vec::new(),
            modified: Vec::new(),
            removed: Vec::new(),
        }
    }

    /// Check if there are any changes.
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.modified.is_empty() || !self.removed.is_empty()
    }

    /// Get the total number of changed records.
    pub fn change_count(&self) -> usize {
        self.added.len() + self.modified.len() + self.removed.len()
    }
}

impl Default for ChangeSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modified_entry(previous: &str, current: &str) -> ModifiedEntry {
        ModifiedEntry {
            record: Record::default(),
            supervising_authority: current.to_string(),
            region: String::new(),
            previous_authority: previous.to_string(),
            changes: vec![FieldChange {
                field: "supervising_authority".to_string(),
                label: "Ministère de tutelle".to_string(),
                old: previous.to_string(),
                new: current.to_string(),
            }],
        }
    }

    #[test]
    fn test_attachment() {
        let entry = modified_entry("", "Justice");
        assert_eq!(entry.authority_transition(), Some(TransitionKind::Attachment));
    }

    #[test]
    fn test_detachment() {
        let entry = modified_entry("Justice", "");
        assert_eq!(entry.authority_transition(), Some(TransitionKind::Detachment));
    }

    #[test]
    fn test_transfer() {
        let entry = modified_entry("Justice", "Culture");
        assert_eq!(entry.authority_transition(), Some(TransitionKind::Transfer));
    }

    #[test]
    fn test_no_transition_when_authority_unchanged() {
        assert_eq!(modified_entry("Justice", "Justice").authority_transition(), None);
        assert_eq!(modified_entry("", "").authority_transition(), None);
    }

    #[test]
    fn test_change_count() {
        let mut changes = ChangeSet::new();
        assert!(!changes.has_changes());
        changes.modified.push(modified_entry("", "Justice"));
        assert!(changes.has_changes());
        assert_eq!(changes.change_count(), 1);
    }
}
