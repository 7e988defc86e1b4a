//! Subscriber configuration structures.
//!
//! The subscriber file is externally owned; its French keys are a fixed
//! contract and the watcher only reads it.

use serde::{Deserialize, Serialize};

/// Wildcard scope token matching every change.
pub const SCOPE_ALL: &str = "ALL";

/// One notification recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscriber {
    /// Destination address
    pub email: String,

    /// Display name used in the greeting
    #[serde(rename = "nom", default)]
    pub name: String,

    /// Scope tokens: authority names, region names, or "ALL"
    #[serde(rename = "perimetres", default)]
    pub scopes: Vec<String>,

    /// Inactive subscribers are skipped without being removed from the file
    #[serde(rename = "actif", default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Sender identity for outgoing notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sender {
    pub email: String,

    #[serde(rename = "nom", default)]
    pub name: String,
}

/// The full subscriber file: global mail parameters plus the flat list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriberConfig {
    #[serde(rename = "expediteur")]
    pub sender: Sender,

    #[serde(rename = "prefixe_sujet", default = "default_subject_prefix")]
    pub subject_prefix: String,

    #[serde(rename = "abonnes", default)]
    pub subscribers: Vec<Subscriber>,
}

fn default_subject_prefix() -> String {
    "[Registre des cantines]".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_french_keys() {
        let config: SubscriberConfig = serde_json::from_value(json!({
            "expediteur": {"email": "veille@example.org", "nom": "Veille cantines"},
            "prefixe_sujet": "[Cantines]",
            "abonnes": [
                {"email": "a@example.org", "nom": "Alice", "perimetres": ["Justice"], "actif": true},
                {"email": "b@example.org", "nom": "Benoît", "perimetres": ["ALL"]}
            ]
        }))
        .unwrap();

        assert_eq!(config.sender.email, "veille@example.org");
        assert_eq!(config.subject_prefix, "[Cantines]");
        assert_eq!(config.subscribers.len(), 2);
        assert_eq!(config.subscribers[0].scopes, vec!["Justice"]);
        // actif defaults to true when omitted
        assert!(config.subscribers[1].active);
    }

    #[test]
    fn test_subject_prefix_default() {
        let config: SubscriberConfig = serde_json::from_value(json!({
            "expediteur": {"email": "veille@example.org"},
            "abonnes": []
        }))
        .unwrap();
        assert!(!config.subject_prefix.is_empty());
    }
}
