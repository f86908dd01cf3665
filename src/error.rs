//! Error types for review-notifier
//!
//! This module provides the error taxonomy for the polling loop:
//! - Cycle-level errors (network, remote API, malformed payloads, schema, vocabulary, delivery)
//! - The startup-only configuration error
//! - Machine-readable kind codes used as structured log fields

use thiserror::Error;

/// Result type alias for review-notifier operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for review-notifier
///
/// Every variant except [`Error::Config`] is raised inside a single polling cycle and
/// is caught at the loop boundary. `Config` is only produced at startup.
#[derive(Debug, Error)]
pub enum Error {
    /// The status endpoint could not be reached (connection refused, DNS, timeout)
    #[error("network error: {message}")]
    Network {
        /// What failed
        message: String,
        /// Underlying transport error, when there is one
        #[source]
        source: Option<reqwest::Error>,
    },

    /// The status endpoint answered with a non-2xx status code
    #[error("{}", remote_api_message(.status, .code, .message))]
    RemoteApi {
        /// HTTP status code returned by the endpoint
        status: u16,
        /// Application-level error code from the response body (`code` field)
        code: Option<String>,
        /// Application-level error message from the response body (`error` field)
        message: Option<String>,
    },

    /// A 2xx response body could not be parsed as JSON
    #[error("malformed response: {message}")]
    MalformedResponse {
        /// Parser diagnostic
        message: String,
        /// Underlying JSON error, when there is one
        #[source]
        source: Option<serde_json::Error>,
    },

    /// The response does not have the expected shape
    #[error("invalid response schema: {0}")]
    Schema(#[from] SchemaError),

    /// The most recent submission carries a status outside the known vocabulary
    #[error("unknown review status: {status:?}")]
    UnknownStatus {
        /// The offending status code as received
        status: String,
    },

    /// The messaging channel rejected or failed to accept a message
    #[error("delivery failed: {0}")]
    Delivery(String),

    /// Required configuration is missing or invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// Names of required settings that were absent
        missing: Vec<String>,
    },
}

/// Response shape violations detected by the validator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The payload is null or an empty value
    #[error("empty")]
    Empty,

    /// The payload is not a JSON object
    #[error("not-a-mapping")]
    NotAMapping,

    /// The `homeworks` field is absent or not an array
    #[error("homeworks-not-a-list")]
    HomeworksNotAList,

    /// `current_date` is present but is not a non-negative integer
    #[error("current-date-not-a-timestamp")]
    InvalidCurrentDate,

    /// An element of `homeworks` cannot be read as a submission record
    #[error("invalid-record at index {index}: {reason}")]
    InvalidRecord {
        /// Position of the element in the `homeworks` array
        index: usize,
        /// What is wrong with the element
        reason: String,
    },
}

fn remote_api_message(status: &u16, code: &Option<String>, message: &Option<String>) -> String {
    let mut rendered = format!("remote API error: status {status}");
    if let Some(code) = code {
        rendered.push_str(&format!(", code {code}"));
    }
    if let Some(message) = message {
        rendered.push_str(&format!(": {message}"));
    }
    rendered
}

impl Error {
    /// Machine-readable kind code for this error
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Network { .. } => "network_error",
            Error::RemoteApi { .. } => "remote_api_error",
            Error::MalformedResponse { .. } => "malformed_response",
            Error::Schema(_) => "schema_error",
            Error::UnknownStatus { .. } => "unknown_status",
            Error::Delivery(_) => "delivery_error",
            Error::Config { .. } => "config_error",
        }
    }

    /// Build a network error without an underlying transport error
    pub fn network(message: impl Into<String>) -> Self {
        Error::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Build a malformed-response error without an underlying parser error
    pub fn malformed(message: impl Into<String>) -> Self {
        Error::MalformedResponse {
            message: message.into(),
            source: None,
        }
    }

    /// Build a configuration error naming the missing settings
    pub fn missing_config(missing: Vec<String>) -> Self {
        Error::Config {
            message: format!("missing required settings: {}", missing.join(", ")),
            missing,
        }
    }

    /// Build a configuration error for an invalid (present) setting
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            missing: Vec::new(),
        }
    }
}
