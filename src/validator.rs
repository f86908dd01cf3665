//! Response validation
//!
//! Turns the untyped JSON body returned by the status API into a [`StatusResponse`],
//! rejecting payloads that do not have the expected shape. Validation is pure and keeps
//! the order received.
//!
//! Only the newest submission (index 0) drives detection, so it is the only element
//! that must decode. Older elements that cannot be read are dropped.

use crate::error::SchemaError;
use crate::types::{Cursor, StatusResponse, SubmissionRecord};
use serde::Deserialize;
use serde_json::Value;

/// Validate a raw status API payload
///
/// # Errors
///
/// - [`SchemaError::Empty`] if the payload is null or an empty value
/// - [`SchemaError::NotAMapping`] if the payload is not a JSON object
/// - [`SchemaError::HomeworksNotAList`] if `homeworks` is absent or not an array
/// - [`SchemaError::InvalidRecord`] if the first element lacks `homework_name`/`status`
///   strings
/// - [`SchemaError::InvalidCurrentDate`] if `current_date` is not a non-negative integer
pub fn validate(raw: &Value) -> Result<StatusResponse, SchemaError> {
    if is_empty(raw) {
        return Err(SchemaError::Empty);
    }

    let object = raw.as_object().ok_or(SchemaError::NotAMapping)?;

    let homeworks = object
        .get("homeworks")
        .and_then(Value::as_array)
        .ok_or(SchemaError::HomeworksNotAList)?;

    let homeworks = match homeworks.split_first() {
        None => Vec::new(),
        Some((newest, older)) => {
            let newest = SubmissionRecord::deserialize(newest).map_err(|e| {
                SchemaError::InvalidRecord {
                    index: 0,
                    reason: e.to_string(),
                }
            })?;
            std::iter::once(newest)
                .chain(
                    older
                        .iter()
                        .filter_map(|record| SubmissionRecord::deserialize(record).ok()),
                )
                .collect()
        }
    };

    let current_date = match object.get("current_date") {
        None | Some(Value::Null) => None,
        Some(value) => Some(
            value
                .as_i64()
                .filter(|ts| *ts >= 0)
                .map(Cursor::new)
                .ok_or(SchemaError::InvalidCurrentDate)?,
        ),
    };

    Ok(StatusResponse {
        homeworks,
        current_date,
    })
}

/// Values that carry no data at all
fn is_empty(raw: &Value) -> bool {
    match raw {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}
