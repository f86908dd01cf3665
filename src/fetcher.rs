//! Status API client
//!
//! One request per cycle: `GET <endpoint>?from_date=<cursor>` with an OAuth header.
//! Failures are classified before they leave this module:
//! - transport failures (refused, DNS, timeout) become [`Error::Network`]
//! - non-2xx answers become [`Error::RemoteApi`], with `code`/`error` lifted from the body
//! - 2xx bodies that are not JSON become [`Error::MalformedResponse`]
//!
//! The parsed JSON is returned untouched; shape checks belong to the validator.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::Cursor;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use tracing::debug;

/// Source of raw status payloads
///
/// The loop only talks to this trait, so tests can substitute a scripted source.
#[async_trait]
pub trait StatusApi: Send + Sync {
    /// Fetch submissions updated since `cursor`
    async fn fetch(&self, cursor: Cursor) -> Result<Value>;
}

/// [`StatusApi`] backed by the real HTTP endpoint
pub struct HttpStatusApi {
    /// HTTP client for the status endpoint
    http_client: reqwest::Client,

    /// Endpoint URL
    endpoint: String,

    /// Pre-rendered `Authorization` header value
    authorization: String,
}

impl HttpStatusApi {
    /// Create a client for the endpoint named in `config`
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the HTTP client cannot be created
    pub fn new(config: &Config) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("review-notifier/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::invalid_config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            endpoint: config.endpoint.clone(),
            authorization: config.authorization_header(),
        })
    }
}

#[async_trait]
impl StatusApi for HttpStatusApi {
    async fn fetch(&self, cursor: Cursor) -> Result<Value> {
        debug!(endpoint = %self.endpoint, cursor = %cursor, "requesting review statuses");

        let response = self
            .http_client
            .get(&self.endpoint)
            .header(AUTHORIZATION, &self.authorization)
            .query(&[("from_date", cursor.get())])
            .send()
            .await
            .map_err(|e| Error::Network {
                message: e.to_string(),
                source: Some(e),
            })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Network {
                message: format!("failed to read response body: {e}"),
                source: Some(e),
            })?;

        if !status.is_success() {
            let (code, message) = extract_api_error(&body);
            return Err(Error::RemoteApi {
                status: status.as_u16(),
                code,
                message,
            });
        }

        serde_json::from_slice(&body).map_err(|e| Error::MalformedResponse {
            message: e.to_string(),
            source: Some(e),
        })
    }
}

/// Pull the application-level `code` and `error` fields out of an error body
///
/// Bodies that are not JSON objects yield nothing; the status code alone is enough to
/// report the failure.
fn extract_api_error(body: &[u8]) -> (Option<String>, Option<String>) {
    let Ok(Value::Object(fields)) = serde_json::from_slice::<Value>(body) else {
        return (None, None);
    };

    let render = |key: &str| {
        fields.get(key).and_then(|value| match value {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        })
    };

    (render("code"), render("error"))
}
