//! Failure classification for the polling loop
//!
//! Cycle-level failures are transient from the loop's point of view: they are reported
//! and the next cycle tries again after the fixed poll interval. The interval doubles as
//! the backoff, so retries use a constant delay rather than an exponential one.
//!
//! # Example
//!
//! ```
//! use review_notifier::error::Error;
//! use review_notifier::retry::IsRetryable;
//!
//! let err = Error::network("connection refused");
//! assert!(err.is_retryable());
//! assert!(!Error::missing_config(vec!["TELEGRAM_TOKEN".into()]).is_retryable());
//! ```

use crate::error::Error;

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (network outages, remote errors, bad payloads) should return `true`.
/// Failures that no amount of waiting will fix (missing credentials) should return `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;

    /// Returns true if the error must stop the process
    fn is_fatal(&self) -> bool {
        !self.is_retryable()
    }
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            // Endpoint unreachable: try again next cycle
            Error::Network { .. } => true,
            // Remote API errors, including 4xx, may clear up (token refresh, maintenance)
            Error::RemoteApi { .. } => true,
            // Payload problems are per-response; the next response may be fine
            Error::MalformedResponse { .. } | Error::Schema(_) => true,
            // The vocabulary is fixed, but the latest submission can move on
            Error::UnknownStatus { .. } => true,
            // Messaging outage never stops polling
            Error::Delivery(_) => true,
            // Missing credentials cannot recover without a restart
            Error::Config { .. } => false,
        }
    }
}
