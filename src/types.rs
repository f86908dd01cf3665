//! Core types for review-notifier

use crate::error::Error;
use crate::retry::IsRetryable;
use serde::{Deserialize, Serialize};
use std::process::ExitCode;

/// Polling watermark in Unix seconds, sent as `from_date`
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(pub i64);

impl Cursor {
    /// Create a new Cursor
    pub fn new(timestamp: i64) -> Self {
        Self(timestamp)
    }

    /// Get the inner Unix timestamp
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for Cursor {
    fn from(timestamp: i64) -> Self {
        Self(timestamp)
    }
}

impl From<Cursor> for i64 {
    fn from(cursor: Cursor) -> Self {
        cursor.0
    }
}

impl PartialEq<i64> for Cursor {
    fn eq(&self, other: &i64) -> bool {
        self.0 == *other
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One submission as reported by the status API
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    /// Name of the submitted work
    pub homework_name: String,

    /// Raw status code; checked against the vocabulary by the detector
    pub status: String,
}

/// Validated status API response
///
/// Produced only by [`validate`](crate::validator::validate). Later stages never look
/// at the untyped payload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Submissions updated since the requested cursor, newest first (may be empty)
    pub homeworks: Vec<SubmissionRecord>,

    /// Server watermark to use as the next cursor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_date: Option<Cursor>,
}

/// State of the polling loop
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    /// Last cycle succeeded
    Running,
    /// Last cycle failed and a diagnostic was attempted
    Degraded,
    /// An error that waiting cannot fix; the loop stops
    Fatal,
}

impl LoopState {
    /// Lowercase name for logging
    pub fn as_str(&self) -> &'static str {
        match self {
            LoopState::Running => "running",
            LoopState::Degraded => "degraded",
            LoopState::Fatal => "fatal",
        }
    }

    /// State the loop moves to after `error`
    pub fn after_error(error: &Error) -> Self {
        if error.is_fatal() {
            LoopState::Fatal
        } else {
            LoopState::Degraded
        }
    }

    /// Process exit code for a loop that stopped in this state
    pub fn exit_code(&self) -> ExitCode {
        match self {
            LoopState::Fatal => ExitCode::FAILURE,
            LoopState::Running | LoopState::Degraded => ExitCode::SUCCESS,
        }
    }
}

impl std::fmt::Display for LoopState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of running the detector over one validated response
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    /// Notification to deliver, if the status changed
    pub message: Option<String>,

    /// Status code to remember once the message is delivered
    pub last_seen: Option<String>,

    /// Cursor for the next cycle
    pub cursor: Cursor,
}
