//! Status transition detection
//!
//! Looks at the newest submission in a validated response, compares its status with
//! the last one notified about, and renders a notification only when it changed.
//! No messages are sent from here and nothing is committed: the loop delivers the
//! returned message, logs the transition once delivery succeeds, and then adopts the
//! returned state.

use crate::error::{Error, Result};
use crate::types::{Cursor, StatusResponse, Transition};
use crate::vocabulary::StatusVocabulary;
use tracing::debug;

/// Render the notification for a status change
pub fn status_message(homework_name: &str, verdict: &str) -> String {
    format!("Status of review \"{homework_name}\" changed. {verdict}")
}

/// Compute the outcome of one cycle from a validated response
///
/// - The cursor becomes `current_date` when present (taken verbatim), otherwise stays put.
/// - Only the first record is inspected; the API lists submissions newest first.
/// - A message is produced only when its raw status code differs from `last_seen`.
///
/// # Errors
///
/// Returns [`Error::UnknownStatus`] if the newest record's status is not in `vocabulary`.
pub fn process(
    response: &StatusResponse,
    last_seen: Option<&str>,
    cursor: Cursor,
    vocabulary: &StatusVocabulary,
) -> Result<Transition> {
    let cursor = response.current_date.unwrap_or(cursor);

    let Some(latest) = response.homeworks.first() else {
        debug!(cursor = %cursor, "no submissions updated since last poll");
        return Ok(Transition {
            message: None,
            last_seen: last_seen.map(str::to_owned),
            cursor,
        });
    };

    let verdict = vocabulary
        .verdict(&latest.status)
        .ok_or_else(|| Error::UnknownStatus {
            status: latest.status.clone(),
        })?;

    if last_seen == Some(latest.status.as_str()) {
        debug!(
            homework = %latest.homework_name,
            status = %latest.status,
            "review status unchanged"
        );
        return Ok(Transition {
            message: None,
            last_seen: last_seen.map(str::to_owned),
            cursor,
        });
    }

    Ok(Transition {
        message: Some(status_message(&latest.homework_name, verdict)),
        last_seen: Some(latest.status.clone()),
        cursor,
    })
}
