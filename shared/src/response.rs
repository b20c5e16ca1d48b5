//! API Response types
//!
//! Envelope used by most bookstore endpoints. Some endpoints answer with a
//! bare JSON value instead, so callers must not assume the envelope is present.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default message when the backend reports a failure without explaining it
pub const DEFAULT_FAILURE_MESSAGE: &str = "API响应错误";

/// Unified API response structure
///
/// ```json
/// {
///     "success": true,
///     "message": "操作成功",
///     "data": { ... }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response with custom message
    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }

    /// Create an error response
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }

    /// Message to surface for a failed response
    pub fn failure_message(&self) -> &str {
        self.message
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_FAILURE_MESSAGE)
    }
}

/// Outcome of inspecting an arbitrary JSON body for the envelope shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// `success: true`, carrying `data` (absent or null data becomes `None`)
    Success(Option<Value>),
    /// `success: false`, carrying the backend message
    Failure(String),
    /// Not an envelope; the body is returned untouched
    Bare(Value),
}

impl Envelope {
    /// Classify a JSON body. Only objects whose `success` field is a boolean
    /// count as an envelope.
    pub fn inspect(body: Value) -> Self {
        let Value::Object(mut map) = body else {
            return Envelope::Bare(body);
        };

        match map.get("success").and_then(Value::as_bool) {
            Some(true) => {
                let data = map.remove("data").filter(|d| !d.is_null());
                Envelope::Success(data)
            }
            Some(false) => {
                let message = serde_json::from_value::<ApiResponse<Value>>(Value::Object(map))
                    .map(|resp| resp.failure_message().to_string())
                    .unwrap_or_else(|_| DEFAULT_FAILURE_MESSAGE.to_string());
                Envelope::Failure(message)
            }
            None => Envelope::Bare(Value::Object(map)),
        }
    }
}
