//! Message delivery
//!
//! [`Messenger`] is the delivery capability (`deliver(chat_id, text)`); the production
//! implementation talks to the Telegram Bot API. [`Notifier`] binds a messenger to the
//! configured chat and provides the two delivery paths the loop needs: status updates,
//! whose failures count as cycle errors, and best-effort diagnostics, whose failures are
//! only logged.

use crate::config::Config;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

/// Delivery capability for text messages
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send `text` to `chat_id`
    async fn deliver(&self, chat_id: &str, text: &str) -> Result<()>;
}

#[async_trait]
impl<M: Messenger + ?Sized> Messenger for Arc<M> {
    async fn deliver(&self, chat_id: &str, text: &str) -> Result<()> {
        (**self).deliver(chat_id, text).await
    }
}

/// Request body for `sendMessage`
#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Common envelope of Bot API responses
#[derive(Debug, Deserialize)]
struct BotApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// [`Messenger`] backed by the Telegram Bot API
pub struct TelegramMessenger {
    /// HTTP client for the Bot API
    http_client: reqwest::Client,

    /// `sendMessage` URL, token included
    send_message_url: String,
}

impl TelegramMessenger {
    /// Create a messenger for the bot named in `config`
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the HTTP client cannot be created
    pub fn new(config: &Config) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::invalid_config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            send_message_url: format!(
                "{}/bot{}/sendMessage",
                config.telegram_api_url.trim_end_matches('/'),
                config.telegram_token
            ),
        })
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn deliver(&self, chat_id: &str, text: &str) -> Result<()> {
        // URLs carry the bot token; strip them from transport errors
        let response = self
            .http_client
            .post(&self.send_message_url)
            .json(&SendMessage { chat_id, text })
            .send()
            .await
            .map_err(|e| Error::Delivery(e.without_url().to_string()))?;

        let status = response.status();
        let body = response.json::<BotApiResponse>().await;

        match body {
            Ok(BotApiResponse { ok: true, .. }) if status.is_success() => {
                debug!(chat_id, "message delivered");
                Ok(())
            }
            Ok(BotApiResponse { description, .. }) => Err(Error::Delivery(format!(
                "Bot API returned status {}: {}",
                status.as_u16(),
                description.unwrap_or_else(|| "no description".to_string())
            ))),
            Err(e) => Err(Error::Delivery(format!(
                "Bot API returned status {} with unreadable body: {}",
                status.as_u16(),
                e.without_url()
            ))),
        }
    }
}

/// Messenger bound to the destination chat
pub struct Notifier<M> {
    messenger: M,
    chat_id: String,
}

impl<M: Messenger> Notifier<M> {
    /// Bind `messenger` to `chat_id`
    pub fn new(messenger: M, chat_id: impl Into<String>) -> Self {
        Self {
            messenger,
            chat_id: chat_id.into(),
        }
    }

    /// Destination chat
    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    /// Deliver a status update
    ///
    /// # Errors
    /// Returns [`Error::Delivery`] if the messenger fails; the caller treats this as a
    /// failed cycle.
    pub async fn notify(&self, text: &str) -> Result<()> {
        self.messenger.deliver(&self.chat_id, text).await
    }

    /// Deliver a diagnostic, logging instead of returning any failure
    ///
    /// Returns whether the diagnostic went out.
    pub async fn report(&self, text: &str) -> bool {
        match self.messenger.deliver(&self.chat_id, text).await {
            Ok(()) => true,
            Err(e) => {
                error!(kind = e.kind(), error = %e, "failed to deliver diagnostic");
                false
            }
        }
    }
}
