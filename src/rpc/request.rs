//! Request envelope encoding.
//!
//! A request is one JSON object followed by exactly one `\n`:
//!
//! ```json
//! {"action":"select_craft","params":{"id":999}}
//! ```
//!
//! `params` is omitted when the caller supplies none. There is no
//! correlation id: a connection carries at most one request.

use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{AppError, Result};

/// Outbound request envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Request<'a> {
    /// Name of the server action to invoke.
    pub action: &'a str,
    /// Action parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, Value>>,
}

impl<'a> Request<'a> {
    /// Build a request, rejecting an empty action name.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Protocol` if `action` is empty.
    pub fn new(action: &'a str, params: Option<Map<String, Value>>) -> Result<Self> {
        if action.is_empty() {
            return Err(AppError::Protocol("action must not be empty".into()));
        }
        Ok(Self { action, params })
    }

    /// Build a request from any serializable parameter value.
    ///
    /// The value must serialize to a JSON object.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Protocol` if `action` is empty, or `params` fails to
    /// serialize or is not an object.
    pub fn with_params<P: Serialize + ?Sized>(action: &'a str, params: &P) -> Result<Self> {
        let value = serde_json::to_value(params)
            .map_err(|err| AppError::Protocol(format!("cannot serialize params: {err}")))?;
        match value {
            Value::Object(map) => Self::new(action, Some(map)),
            other => Err(AppError::Protocol(format!(
                "params must serialize to a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    /// Encode as the wire frame: compact JSON plus one trailing `\n`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Protocol` if serialization fails.
    pub fn encode(&self) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(64).writer();
        serde_json::to_writer(&mut buf, self)
            .map_err(|err| AppError::Protocol(format!("cannot encode request: {err}")))?;
        let mut buf = buf.into_inner();
        buf.put_u8(b'\n');
        Ok(buf.freeze())
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
