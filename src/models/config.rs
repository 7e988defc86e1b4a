//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Remote registry API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Notification delivery settings
    #[serde(default)]
    pub notify: NotifyConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.api.resource_id.trim().is_empty() {
            return Err(AppError::validation("api.resource_id is empty"));
        }
        url::Url::parse(&self.api.base_url)
            .map_err(|e| AppError::validation(format!("api.base_url is invalid: {e}")))?;
        if self.api.user_agent.trim().is_empty() {
            return Err(AppError::validation("api.user_agent is empty"));
        }
        if self.api.timeout_secs == 0 {
            return Err(AppError::validation("api.timeout_secs must be > 0"));
        }
        if self.api.page_size == 0 {
            return Err(AppError::validation("api.page_size must be > 0"));
        }
        if self.api.max_pages == 0 {
            return Err(AppError::validation("api.max_pages must be > 0"));
        }
        if self.notify.endpoint.trim().is_empty() {
            return Err(AppError::validation("notify.endpoint is empty"));
        }
        Ok(())
    }
}

/// Remote registry API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the tabular-data API
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Identifier of the registry resource to page through
    #[serde(default)]
    pub resource_id: String,

    /// Records per page
    #[serde(default = "defaults::page_size")]
    pub page_size: u64,

    /// Safety ceiling on pagination; hitting it logs a warning
    #[serde(default = "defaults::max_pages")]
    pub max_pages: u64,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Backoff before the single retry of a failed page, in milliseconds
    #[serde(default = "defaults::retry_delay")]
    pub retry_delay_ms: u64,

    /// Courtesy delay between successful pages, in milliseconds
    #[serde(default = "defaults::page_delay")]
    pub page_delay_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            resource_id: String::new(),
            page_size: defaults::page_size(),
            max_pages: defaults::max_pages(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            retry_delay_ms: defaults::retry_delay(),
            page_delay_ms: defaults::page_delay(),
        }
    }
}

/// Notification delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Transactional-mail HTTP endpoint
    #[serde(default = "defaults::notify_endpoint")]
    pub endpoint: String,

    /// API key sent in the `api-key` header
    #[serde(default)]
    pub api_key: String,

    /// Delay between sends, in milliseconds
    #[serde(default = "defaults::send_delay")]
    pub send_delay_ms: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::notify_endpoint(),
            api_key: String::new(),
            send_delay_ms: defaults::send_delay(),
        }
    }
}

mod defaults {
    // API defaults
    pub fn base_url() -> String {
        "https://tabular-api.data.gouv.fr/api".into()
    }
    pub fn page_size() -> u64 {
        50
    }
    pub fn max_pages() -> u64 {
        1500
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; cantine-watch/1.0)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn retry_delay() -> u64 {
        2000
    }
    pub fn page_delay() -> u64 {
        50
    }

    // Notification defaults
    pub fn notify_endpoint() -> String {
        "https://api.brevo.com/v3/smtp/email".into()
    }
    pub fn send_delay() -> u64 {
        500
    }
}
