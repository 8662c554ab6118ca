//! Turning raw API responses into values or typed errors.

use crate::error::{Error, ErrorKind, Result};
use serde_json::Value;
use std::time::Duration;

/// Provider code meaning success.
pub const SUCCESS_CODE: i64 = 200;

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// The body parsed as JSON.
    Json(Value),
    /// The body was not JSON (HTML, plain text, ...).
    Text(String),
}

impl Body {
    /// The JSON value, if the body parsed as JSON.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Body::Json(value) => Some(value),
            Body::Text(_) => None,
        }
    }

    /// Turn the body into a JSON value; text becomes a JSON string.
    pub fn into_json(self) -> Value {
        match self {
            Body::Json(value) => value,
            Body::Text(text) => Value::String(text),
        }
    }

    fn payload(&self) -> Value {
        self.clone().into_json()
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Body::Json(value)
    }
}

/// Decode a body that may be JSON, JSON wrapped in stray backticks, or plain text.
///
/// A JSON string literal holding a JSON document is decoded one more level.
pub fn parse_body(raw: &str) -> Body {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('`').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('`').unwrap_or(trimmed);

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::String(inner)) => match serde_json::from_str::<Value>(inner.trim()) {
            Ok(value @ (Value::Object(_) | Value::Array(_))) => Body::Json(value),
            _ => Body::Json(Value::String(inner)),
        },
        Ok(value) => Body::Json(value),
        Err(_) => Body::Text(raw.to_string()),
    }
}

/// Numeric `code` field of an envelope, if present.
pub fn body_code(body: &Body) -> Option<i64> {
    body.as_json()?.get("code")?.as_i64()
}

fn body_message(body: &Body) -> Option<String> {
    let value = body.as_json()?;
    ["msg", "message", "error"]
        .iter()
        .find_map(|key| value.get(*key)?.as_str().filter(|s| !s.is_empty()))
        .map(str::to_string)
}

fn body_retry_after(body: &Body) -> Option<Duration> {
    let secs = body.as_json()?.get("retry_after")?.as_f64()?;
    // Negative or out-of-range hints are dropped.
    Duration::try_from_secs_f64(secs).ok()
}

/// Classify a response.
///
/// A numeric body `code` other than 200 decides the error kind whatever the
/// HTTP status is; the status is consulted only when the body has no code.
pub fn classify(status: u16, body: Body, context: &str) -> Result<Body> {
    let code = body_code(&body);

    let effective = match code {
        Some(SUCCESS_CODE) => return Ok(body),
        Some(code) => code,
        None if (200..300).contains(&status) => return Ok(body),
        None => i64::from(status),
    };

    Err(error_for(effective, code, status, &body, context))
}

/// Build the typed error for an effective code.
pub fn error_for(effective: i64, code: Option<i64>, status: u16, body: &Body, context: &str) -> Error {
    let kind = ErrorKind::from_code(effective);
    let message = body_message(body).unwrap_or_else(|| format!("{context} (HTTP {status})"));
    let retry_after = match kind {
        ErrorKind::RateLimit => body_retry_after(body),
        _ => None,
    };

    Error::api(kind, message, code, Some(status), Some(body.payload())).with_retry_after(retry_after)
}
