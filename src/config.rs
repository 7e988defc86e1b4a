// src/config.rs

//! Configuration loading utilities.
//!
//! The application config is TOML and falls back to defaults; the
//! subscriber file is JSON with a fixed schema and must be present.

use std::fs;
use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::{AppConfig, SubscriberConfig};

/// Load the subscriber file.
///
/// This file is externally owned; a missing or malformed file is a
/// configuration error, never silently defaulted.
pub fn load_subscribers(path: &Path) -> Result<SubscriberConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::config(format!("Subscriber file {path:?} unreadable: {e}")))?;
    serde_json::from_str(&content)
        .map_err(|e| AppError::config(format!("Subscriber file {path:?} invalid: {e}")))
}

/// Load and validate both the application config and the subscriber file.
pub fn load_all(storage_dir: &Path) -> Result<(AppConfig, SubscriberConfig)> {
    let config = AppConfig::load_or_default(storage_dir.join("config.toml"));
    config.validate()?;

    let subscribers = load_subscribers(&storage_dir.join("subscribers.json"))?;
    Ok((config, subscribers))
}
