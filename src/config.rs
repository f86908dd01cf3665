//! Configuration types for review-notifier
//!
//! Credentials come from the environment (see [`Config::from_env`]); operational
//! parameters have fixed defaults. The resulting [`Config`] is built once at startup
//! and passed by reference to every component.

use crate::error::{Error, Result};
use crate::vocabulary::StatusVocabulary;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable holding the status API OAuth token
pub const PRACTICUM_TOKEN_VAR: &str = "PRACTICUM_TOKEN";
/// Environment variable holding the Telegram bot token
pub const TELEGRAM_TOKEN_VAR: &str = "TELEGRAM_TOKEN";
/// Environment variable holding the destination chat identifier
pub const TELEGRAM_CHAT_ID_VAR: &str = "TELEGRAM_CHAT_ID";

/// Main configuration for the notifier
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// OAuth token for the status API
    pub practicum_token: String,

    /// Telegram bot token
    pub telegram_token: String,

    /// Chat that receives status updates and diagnostics
    pub telegram_chat_id: String,

    /// Status API endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Telegram Bot API base URL (default: "https://api.telegram.org")
    #[serde(default = "default_telegram_api_url")]
    pub telegram_api_url: String,

    /// Delay between cycles, also the retry delay after a failed cycle (default: 600 seconds)
    #[serde(default = "default_poll_interval", with = "duration_serde")]
    pub poll_interval: Duration,

    /// Timeout for each outbound HTTP request (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,

    /// Verdict texts per status code
    #[serde(default)]
    pub vocabulary: StatusVocabulary,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("practicum_token", &"<redacted>")
            .field("telegram_token", &"<redacted>")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .field("endpoint", &self.endpoint)
            .field("telegram_api_url", &self.telegram_api_url)
            .field("poll_interval", &self.poll_interval)
            .field("request_timeout", &self.request_timeout)
            .field("vocabulary", &self.vocabulary)
            .finish()
    }
}

impl Config {
    /// Build a config from credentials, using defaults for everything else
    pub fn new(
        practicum_token: impl Into<String>,
        telegram_token: impl Into<String>,
        telegram_chat_id: impl Into<String>,
    ) -> Self {
        Self {
            practicum_token: practicum_token.into(),
            telegram_token: telegram_token.into(),
            telegram_chat_id: telegram_chat_id.into(),
            endpoint: default_endpoint(),
            telegram_api_url: default_telegram_api_url(),
            poll_interval: default_poll_interval(),
            request_timeout: default_request_timeout(),
            vocabulary: StatusVocabulary::default(),
        }
    }

    /// Load credentials from process environment variables
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming every required variable that is unset or empty.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load credentials through an arbitrary lookup function
    ///
    /// Empty or whitespace-only values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        match (
            read(PRACTICUM_TOKEN_VAR),
            read(TELEGRAM_TOKEN_VAR),
            read(TELEGRAM_CHAT_ID_VAR),
        ) {
            (Some(practicum_token), Some(telegram_token), Some(telegram_chat_id)) => {
                let config = Self::new(practicum_token, telegram_token, telegram_chat_id);
                config.validate()?;
                Ok(config)
            }
            (practicum_token, telegram_token, telegram_chat_id) => {
                let missing = [
                    (PRACTICUM_TOKEN_VAR, practicum_token.is_none()),
                    (TELEGRAM_TOKEN_VAR, telegram_token.is_none()),
                    (TELEGRAM_CHAT_ID_VAR, telegram_chat_id.is_none()),
                ]
                .into_iter()
                .filter(|(_, absent)| *absent)
                .map(|(name, _)| name.to_string())
                .collect();
                Err(Error::missing_config(missing))
            }
        }
    }

    /// Check that the config can drive the loop
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for empty credentials, a zero poll interval or an
    /// unparsable URL.
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<String> = [
            (PRACTICUM_TOKEN_VAR, &self.practicum_token),
            (TELEGRAM_TOKEN_VAR, &self.telegram_token),
            (TELEGRAM_CHAT_ID_VAR, &self.telegram_chat_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name.to_string())
        .collect();

        if !missing.is_empty() {
            return Err(Error::missing_config(missing));
        }

        if self.poll_interval.is_zero() {
            return Err(Error::invalid_config("poll_interval must be greater than zero"));
        }

        for (key, value) in [
            ("endpoint", &self.endpoint),
            ("telegram_api_url", &self.telegram_api_url),
        ] {
            url::Url::parse(value)
                .map_err(|e| Error::invalid_config(format!("invalid {key} {value:?}: {e}")))?;
        }

        Ok(())
    }

    /// Value of the `Authorization` header sent to the status API
    pub fn authorization_header(&self) -> String {
        format!("OAuth {}", self.practicum_token)
    }
}

/// Sort the result of loading a `.env` file
///
/// Returns the loaded path, `None` when there is no file, and the error for anything
/// else (unreadable file, unparsable line).
pub fn env_file_outcome(
    result: std::result::Result<PathBuf, dotenvy::Error>,
) -> std::result::Result<Option<PathBuf>, dotenvy::Error> {
    match result {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

fn default_endpoint() -> String {
    "https://practicum.yandex.ru/api/user_api/homework_statuses/".to_string()
}

fn default_telegram_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(600)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

// Intervals are whole seconds on the wire
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(interval: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(interval.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}
