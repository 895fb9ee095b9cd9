//! Entity model definitions and shared row-decoding helpers.

pub mod offering;
pub mod media_item;
pub mod contact_message;
pub mod session;

use chrono::{DateTime, Utc};
use sc_core::error::{ScError, ScResult};

/// Read an opaque identifier, accepting both string and numeric ids.
pub(crate) fn opaque_id(map: &serde_json::Value) -> ScResult<String> {
    match map.get("id") {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(serde_json::Value::Number(n)) => Ok(n.to_string()),
        _ => Err(ScError::Serialization("row has no usable id".into())),
    }
}

/// Read a text column, treating null or absent as empty.
pub(crate) fn text(map: &serde_json::Value, key: &str) -> String {
    map.get(key).and_then(|v| v.as_str()).unwrap_or_default().to_string()
}

/// Read an optional text column; blank strings become `None`.
pub(crate) fn optional_text(map: &serde_json::Value, key: &str) -> Option<String> {
    map.get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Parse an RFC 3339 timestamp column.
pub(crate) fn timestamp(map: &serde_json::Value, key: &str) -> ScResult<DateTime<Utc>> {
    let raw = map
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ScError::Serialization(format!("row has no {key}")))?;
    parse_timestamp(raw)
}

/// Parse an optional RFC 3339 timestamp column, ignoring malformed values.
pub(crate) fn optional_timestamp(map: &serde_json::Value, key: &str) -> Option<DateTime<Utc>> {
    map.get(key)
        .and_then(|v| v.as_str())
        .and_then(|raw| parse_timestamp(raw).ok())
}

fn parse_timestamp(raw: &str) -> ScResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ScError::Serialization(format!("bad timestamp {raw:?}: {e}")))
}
