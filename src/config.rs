use crate::error::ConfigError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant for a private data vault app. \
Answer general questions conversationally. You cannot see, list, open or change any vault files; \
if the user asks about their files, tell them to use terminal commands such as ls, cat or cd.";

/// Router settings. Every field has a default so partial JSON is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouterConfig {
    /// Printed by `whoami` and used as the owner in `ls -l`.
    pub identity: String,
    pub hostname: String,
    /// First bot message of every session.
    pub greeting: String,
    /// Returned when the language model fails or times out.
    pub apology_message: String,
    /// Returned when the model answers with nothing usable.
    pub empty_reply_message: String,
    pub model_timeout_ms: u64,
    pub system_prompt: String,
    /// Origin of the logical clock that stamps file modification times.
    pub epoch: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            identity: "vault-user".to_string(),
            hostname: "vault".to_string(),
            greeting: "Hello! How can I help you with your secured data today?".to_string(),
            apology_message: "Sorry, I encountered an error. Please try again.".to_string(),
            empty_reply_message: "No relevant data found.".to_string(),
            model_timeout_ms: 15_000,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            epoch: "2024-01-01T09:00:00Z".to_string(),
        }
    }
}

impl RouterConfig {
    /// Parse from JSON and check that the epoch is usable.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: RouterConfig = serde_json::from_str(json)?;
        config.epoch()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn epoch(&self) -> Result<DateTime<Utc>, ConfigError> {
        DateTime::parse_from_rfc3339(&self.epoch)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|source| ConfigError::Epoch {
                value: self.epoch.clone(),
                source,
            })
    }

    /// Epoch with a fallback to the default origin; `from_json` already
    /// rejected bad values, so the fallback only covers hand-built configs.
    pub fn epoch_or_default(&self) -> DateTime<Utc> {
        self.epoch().unwrap_or_else(|_| DateTime::<Utc>::UNIX_EPOCH)
    }

    pub fn model_timeout(&self) -> Duration {
        Duration::from_millis(self.model_timeout_ms)
    }
}
