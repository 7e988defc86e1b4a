// src/pipeline/diff.rs

//! Field-level diff between the previous snapshot and a fresh fetch.
//!
//! Classification is id-keyed: current records absent from the baseline
//! are added, baseline ids absent from the fetch are removed, and records
//! present in both with at least one differing monitored field are
//! modified. Field values are normalized before comparison, so `null`,
//! absent, and `""` are equivalent, as are `100` and `"100"`.

use std::collections::HashMap;

use crate::models::{
    ChangeEntry, ChangeSet, FieldChange, MONITORED_FIELDS, ModifiedEntry, Record, Snapshot,
    field_label,
};

/// Calculate the change set between the previous snapshot and the current
/// record sequence.
///
/// Records without an identifier are silently excluded. `added` and
/// `modified` follow the page order of `current`; `removed` follows the
/// baseline's key order.
pub fn diff(previous: &Snapshot, current: &[Record]) -> ChangeSet {
    let mut index: HashMap<String, &Record> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for record in current {
        let Some(id) = record.id() else { continue };
        if !index.contains_key(&id) {
            order.push(id.clone());
        }
        // Most recently observed record wins for a duplicated id
        index.insert(id, record);
    }

    let mut changes = ChangeSet::new();

    for id in &order {
        let record = index[id];
        match previous.get(id) {
            None => changes.added.push(ChangeEntry::new(record.clone())),
            Some(prev) => {
                let field_changes = compare_fields(prev, record);
                if !field_changes.is_empty() {
                    changes.modified.push(ModifiedEntry {
                        supervising_authority: record.supervising_authority(),
                        region: record.region(),
                        previous_authority: prev.supervising_authority(),
                        record: record.clone(),
                        changes: field_changes,
                    });
                }
            }
        }
    }

    for (id, record) in previous {
        if !index.contains_key(id) {
            changes.removed.push(ChangeEntry::new(record.clone()));
        }
    }

    changes
}

/// Compare every monitored field, normalized.
fn compare_fields(previous: &Record, current: &Record) -> Vec<FieldChange> {
    MONITORED_FIELDS
        .iter()
        .filter_map(|field| {
            let old = previous.text(field);
            let new = current.text(field);
            (old != new).then(|| FieldChange {
                field: field.to_string(),
                label: field_label(field).to_string(),
                old,
                new,
            })
        })
        .collect()
}
