// src/pipeline/scope.rs

//! Per-subscriber scope filtering of a change set.

use crate::models::{ChangeSet, SCOPE_ALL};

/// Keep only the entries relevant to the given scope tokens.
///
/// The wildcard "ALL" keeps everything. Otherwise an entry is retained
/// when its current supervising authority or region matches a token;
/// modified entries also match on their previous authority, so a
/// detachment stays visible to whoever watched the old authority.
/// Relative order of the input sequences is preserved.
pub fn filter_for_scope(changes: &ChangeSet, scopes: &[String]) -> ChangeSet {
    if scopes.iter().any(|scope| scope == SCOPE_ALL) {
        return changes.clone();
    }

    let in_scope = |value: &str| scopes.iter().any(|scope| scope == value);

    ChangeSet {
        generated_at: changes.generated_at,
        added: changes
            .added
            .iter()
            .filter(|entry| in_scope(&entry.supervising_authority) || in_scope(&entry.region))
            .cloned()
            .collect(),
        modified: changes
            .modified
            .iter()
            .filter(|entry| {
                in_scope(&entry.supervising_authority)
                    || in_scope(&entry.region)
                    || in_scope(&entry.previous_authority)
            })
            .cloned()
            .collect(),
        removed: changes
            .removed
            .iter()
            .filter(|entry| in_scope(&entry.supervising_authority) || in_scope(&entry.region))
            .cloned()
            .collect(),
    }
}
