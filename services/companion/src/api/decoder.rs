//! services/companion/src/api/decoder.rs
//!
//! Turns a completed HTTP exchange into a typed `ApiResponse`. Every path
//! returns a value; nothing here panics.

use dish_companion_core::ports::{ApiFailure, ApiResponse, RawResponse};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use tracing::warn;

/// Error body convention of the backend: `{ "detail": ... }`.
#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<Value>,
}

pub fn decode<T: DeserializeOwned>(raw: RawResponse) -> ApiResponse<T> {
    if raw.is_success() {
        return serde_json::from_slice::<T>(&raw.body).map_err(|e| {
            warn!("Failed to parse a {} response body: {}", raw.status, e);
            ApiFailure::bad_payload()
        });
    }

    let detail = serde_json::from_slice::<ErrorBody>(&raw.body)
        .ok()
        .and_then(|body| body.detail)
        .and_then(detail_text)
        .unwrap_or_else(|| status_line(&raw));

    Err(ApiFailure::protocol(raw.status, detail))
}

/// Validation errors may carry a structured `detail`; those are kept as JSON text.
fn detail_text(detail: Value) -> Option<String> {
    let text = match detail {
        Value::Null => return None,
        Value::String(text) => text,
        other => other.to_string(),
    };
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

fn status_line(raw: &RawResponse) -> String {
    if raw.status_text.trim().is_empty() {
        format!("HTTP {}", raw.status)
    } else {
        raw.status_text.clone()
    }
}
