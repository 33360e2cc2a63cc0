//! Response envelope decoding.
//!
//! ```json
//! {"success": true, "data": [{"id": 1, "name": "Craft A"}]}
//! {"success": false, "error": "craft not found"}
//! ```

use serde::Deserialize;
use serde_json::Value;

use crate::rpc::request::json_type_name;
use crate::{AppError, Result};

/// Message used when a failed response carries no `error` field.
pub const UNKNOWN_ERROR: &str = "unknown error";

/// Inbound response envelope (server → client).
#[derive(Debug, Deserialize)]
struct ResponseEnvelope {
    /// Required; a missing or non-boolean value is a protocol error.
    success: bool,
    /// Payload on success. Absent and `null` are equivalent.
    #[serde(default)]
    data: Value,
    /// Error message on failure. Non-string values are rendered as JSON.
    #[serde(default)]
    error: Value,
}

/// Decoded outcome of a well-formed response.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// `success: true`; carries `data`, or `Value::Null` when absent.
    Success(Value),
    /// `success: false`; carries the server message or [`UNKNOWN_ERROR`].
    Failure(String),
}

impl Response {
    /// Convert to the caller-facing result.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Application` for a [`Response::Failure`].
    pub fn into_result(self) -> Result<Value> {
        match self {
            Self::Success(data) => Ok(data),
            Self::Failure(message) => Err(AppError::Application(message)),
        }
    }
}

/// Decode a framed, trimmed response.
///
/// # Errors
///
/// Returns `AppError::Protocol` if `frame` is not valid JSON, is not an
/// object, or lacks a boolean `success` field. The message carries the
/// parser error and the offending frame.
pub fn decode_response(frame: &str) -> Result<Response> {
    // Derived struct impls also accept arrays positionally, so the shape is
    // checked on the untyped value first.
    let value: Value = serde_json::from_str(frame).map_err(|err| malformed(&err, frame))?;
    if !value.is_object() {
        let reason = format!("expected a JSON object, got {}", json_type_name(&value));
        return Err(malformed(&reason, frame));
    }
    let envelope: ResponseEnvelope =
        serde_json::from_value(value).map_err(|err| malformed(&err, frame))?;

    if envelope.success {
        Ok(Response::Success(envelope.data))
    } else {
        let message = match envelope.error {
            Value::Null => UNKNOWN_ERROR.to_owned(),
            Value::String(message) => message,
            other => other.to_string(),
        };
        Ok(Response::Failure(message))
    }
}

fn malformed(reason: &dyn std::fmt::Display, frame: &str) -> AppError {
    AppError::Protocol(format!("malformed response: {reason}; frame: {frame}"))
}
