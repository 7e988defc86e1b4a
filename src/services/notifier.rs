// src/services/notifier.rs

//! Notification delivery.
//!
//! Delivery is sequential with a fixed inter-send delay to respect the
//! provider's rate limits. A failure for one subscriber is logged and
//! never blocks delivery to the others; the watcher does not retry a
//! failed send within a run.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::error::{AppError, Result};
use crate::models::{ChangeSet, NotifyConfig, Sender, Subscriber};
use crate::pipeline::filter_for_scope;
use crate::services::render;

/// Trait for notification transports.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Attempt one delivery.
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<()>;
}

/// Notifier backed by a transactional-mail HTTP API.
pub struct HttpNotifier {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    sender: Sender,
}

impl HttpNotifier {
    pub fn new(config: &NotifyConfig, sender: Sender) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            sender,
        })
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<()> {
        let payload = json!({
            "sender": { "email": self.sender.email, "name": self.sender.name },
            "to": [{ "email": to }],
            "subject": subject,
            "htmlContent": html,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("api-key", &self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::notify(
                to,
                format!("provider returned {}", response.status()),
            ));
        }
        Ok(())
    }
}

/// Per-run delivery statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub sent: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Deliver the change set to every subscriber, filtered by scope.
///
/// Inactive subscribers and subscribers whose filtered set is empty are
/// skipped without a send.
pub async fn dispatch(
    notifier: &dyn Notifier,
    subscribers: &[Subscriber],
    changes: &ChangeSet,
    subject_prefix: &str,
    send_delay: Duration,
) -> DispatchOutcome {
    let mut outcome = DispatchOutcome::default();

    for subscriber in subscribers {
        if !subscriber.active {
            outcome.skipped += 1;
            continue;
        }

        let scoped = filter_for_scope(changes, &subscriber.scopes);
        if !scoped.has_changes() {
            outcome.skipped += 1;
            continue;
        }

        let subject = render::subject(subject_prefix, &scoped);
        let html = render::body(&subscriber.name, &scoped);

        match notifier.send(&subscriber.email, &subject, &html).await {
            Ok(()) => {
                log::info!(
                    "Notified {} ({} change(s))",
                    subscriber.email,
                    scoped.change_count()
                );
                outcome.sent += 1;
            }
            Err(e) => {
                log::error!("Delivery to {} failed: {}", subscriber.email, e);
                outcome.failed += 1;
            }
        }

        if !send_delay.is_zero() {
            tokio::time::sleep(send_delay).await;
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChangeEntry, Record};
    use serde_json::json;
    use std::sync::Mutex;

    /// Notifier that records sends and fails for one address.
    struct RecordingNotifier {
        failing: Option<String>,
        sent_to: Mutex<Vec<String>>,
    }

    impl RecordingNotifier {
        fn new(failing: Option<&str>) -> Self {
            Self {
                failing: failing.map(String::from),
                sent_to: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, to: &str, _subject: &str, _html: &str) -> Result<()> {
            if self.failing.as_deref() == Some(to) {
                return Err(AppError::notify(to, "refused"));
            }
            self.sent_to.lock().unwrap().push(to.to_string());
            Ok(())
        }
    }

    fn subscriber(email: &str, scopes: &[&str], active: bool) -> Subscriber {
        Subscriber {
            email: email.to_string(),
            name: email.to_string(),
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
            active,
        }
    }

    fn changes_with_authority(authority: &str) -> ChangeSet {
        let record: Record =
            serde_json::from_value(json!({"id": 1, "name": "Cantine", "supervising_authority": authority}))
                .unwrap();
        let mut changes = ChangeSet::new();
        changes.added.push(ChangeEntry::new(record));
        changes
    }

    #[tokio::test]
    async fn test_failure_does_not_block_others() {
        let notifier = RecordingNotifier::new(Some("b@example.org"));
        let subscribers = vec![
            subscriber("a@example.org", &["ALL"], true),
            subscriber("b@example.org", &["ALL"], true),
            subscriber("c@example.org", &["ALL"], true),
        ];
        let changes = changes_with_authority("Justice");

        let outcome = dispatch(&notifier, &subscribers, &changes, "[x]", Duration::ZERO).await;
        assert_eq!(outcome.sent, 2);
        assert_eq!(outcome.failed, 1);
        assert_eq!(
            *notifier.sent_to.lock().unwrap(),
            vec!["a@example.org", "c@example.org"]
        );
    }

    #[tokio::test]
    async fn test_inactive_subscribers_skipped() {
        let notifier = RecordingNotifier::new(None);
        let subscribers = vec![
            subscriber("a@example.org", &["ALL"], false),
            subscriber("b@example.org", &["ALL"], true),
        ];
        let changes = changes_with_authority("Justice");

        let outcome = dispatch(&notifier, &subscribers, &changes, "[x]", Duration::ZERO).await;
        assert_eq!(outcome.sent, 1);
        assert_eq!(outcome.skipped, 1);
    }

    #[tokio::test]
    async fn test_out_of_scope_subscribers_skipped() {
        let notifier = RecordingNotifier::new(None);
        let subscribers = vec![
            subscriber("justice@example.org", &["Justice"], true),
            subscriber("culture@example.org", &["Culture"], true),
        ];
        let changes = changes_with_authority("Justice");

        let outcome = dispatch(&notifier, &subscribers, &changes, "[x]", Duration::ZERO).await;
        assert_eq!(outcome.sent, 1);
        assert_eq!(outcome.skipped, 1);
        assert_eq!(*notifier.sent_to.lock().unwrap(), vec!["justice@example.org"]);
    }
}
