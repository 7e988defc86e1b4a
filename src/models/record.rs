//! Canteen record and snapshot structures.
//!
//! A record is one institution from the registry. Only the monitored
//! fields participate in diffing; any other keys the API returns are
//! carried along opaquely so the persisted snapshot stays faithful.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fields whose change classifies a record as modified.
pub const MONITORED_FIELDS: &[&str] = &[
    "name",
    "siret",
    "city",
    "department",
    "region",
    "supervising_authority",
    "sector",
    "daily_meal_count",
    "yearly_meal_count",
    "production_type",
    "management_type",
    "economic_model",
    "active",
];

/// Human-readable (French) labels for monitored fields.
const FIELD_LABELS: &[(&str, &str)] = &[
    ("name", "Nom"),
    ("siret", "SIRET"),
    ("city", "Ville"),
    ("department", "Département"),
    ("region", "Région"),
    ("supervising_authority", "Ministère de tutelle"),
    ("sector", "Secteur"),
    ("daily_meal_count", "Repas par jour"),
    ("yearly_meal_count", "Repas par an"),
    ("production_type", "Type de production"),
    ("management_type", "Mode de gestion"),
    ("economic_model", "Modèle économique"),
    ("active", "Actif"),
];

/// Look up the display label for a field, falling back to the raw name.
pub fn field_label(field: &str) -> &str {
    FIELD_LABELS
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, label)| *label)
        .unwrap_or(field)
}

/// Normalize a field value to its comparison form.
///
/// `null`, absent, and `""` all collapse to the empty string, and numbers
/// and booleans stringify, so `100` and `"100"` compare equal. This is a
/// deliberately lossy rule; stored reports depend on it staying as is.
pub fn normalize(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

/// One institution from the registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    /// Raw value of a field, if present.
    pub fn raw(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Normalized string value of a field.
    pub fn text(&self, field: &str) -> String {
        normalize(self.raw(field))
    }

    /// Normalized identifier; `None` when missing or empty.
    pub fn id(&self) -> Option<String> {
        let id = self.text("id");
        (!id.is_empty()).then_some(id)
    }

    /// Current supervising authority (empty string when unattached).
    pub fn supervising_authority(&self) -> String {
        self.text("supervising_authority")
    }

    /// Current region.
    pub fn region(&self) -> String {
        self.text("region")
    }
}

/// The complete keyed record set at one point in time.
///
/// Sorted keys keep `removed` ordering deterministic across runs.
pub type Snapshot = BTreeMap<String, Record>;

/// Index records by id. Records without an identifier are dropped; for a
/// duplicated id the most recently observed record wins.
pub fn index_by_id(records: &[Record]) -> Snapshot {
    records
        .iter()
        .filter_map(|record| record.id().map(|id| (id, record.clone())))
        .collect()
}
