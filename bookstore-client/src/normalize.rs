//! Response-shape normalization
//!
//! List endpoints answer with a bare array or an object wrapping the array
//! under one of several field names. Everything funnels through
//! [`unwrap_list`] so the probing lives in one place.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ClientError, ClientResult};

/// Wrapper fields probed in order
pub const LIST_FIELDS: &[&str] = &[
    "data", "content", "list", "orders", "orderList", "items", "results",
];

/// Extract the array from any tolerated shape; anything else is empty
pub fn unwrap_list(value: Option<Value>) -> Vec<Value> {
    match value {
        Some(Value::Array(items)) => items,
        Some(Value::Object(mut map)) => {
            let field = LIST_FIELDS
                .iter()
                .find(|f| matches!(map.get(**f), Some(Value::Array(_))));
            if let Some(Value::Array(items)) = field.and_then(|f| map.remove(*f)) {
                return items;
            }
            tracing::warn!(
                fields = ?map.keys().collect::<Vec<_>>(),
                "No list field found in response, using empty list"
            );
            Vec::new()
        }
        Some(other) => {
            tracing::warn!(value = %other, "Unexpected list response, using empty list");
            Vec::new()
        }
        None => Vec::new(),
    }
}

/// Typed list; entries that fail to decode are skipped with a warning
pub fn list_of<T: DeserializeOwned>(value: Option<Value>) -> Vec<T> {
    unwrap_list(value)
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping undecodable list entry");
                None
            }
        })
        .collect()
}

/// Single object; a missing payload is an error
pub fn object_of<T: DeserializeOwned>(value: Option<Value>, what: &str) -> ClientResult<T> {
    let value = value.ok_or_else(|| ClientError::InvalidResponse(format!("missing {}", what)))?;
    serde_json::from_value(value)
        .map_err(|e| ClientError::InvalidResponse(format!("unexpected {} shape: {}", what, e)))
}
