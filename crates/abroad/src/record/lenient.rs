//! Forgiving conversions for values written by older tools.
//!
//! Snapshots produced by the data migration store ratings as strings, costs
//! as numbers and flags as `'True'`; the entry form stores everything as
//! text. These helpers accept all of them.

use rusqlite::types::Value;
use serde::{Deserialize, Deserializer};
use serde_json::Value as Json;

/// Deserialize any scalar JSON value as text. `null` reads as `None`.
pub(crate) fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(json_to_text(Option::<Json>::deserialize(deserializer)?))
}

/// Deserialize any scalar JSON value as text, reading `null` as empty.
pub(crate) fn text_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(text(deserializer)?.unwrap_or_default())
}

/// Deserialize a rating given as a number or a numeric string.
pub(crate) fn rating<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Json>::deserialize(deserializer)? {
        Some(Json::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(truncate_real)),
        Some(Json::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn json_to_text(value: Option<Json>) -> Option<String> {
    match value? {
        Json::Null => None,
        Json::String(s) => Some(s),
        Json::Bool(b) => Some(b.to_string()),
        Json::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn truncate_real(x: f64) -> i64 {
    x.trunc() as i64
}

/// Render a REAL without a trailing `.0` when it holds a whole number.
fn format_real(x: f64) -> String {
    if x.fract() == 0.0 && x.abs() < 1e15 {
        format!("{x:.0}")
    } else {
        x.to_string()
    }
}

/// Read an SQL value as text.
pub(crate) fn sql_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Integer(n) => Some(n.to_string()),
        Value::Real(x) => Some(format_real(x)),
        Value::Text(s) => Some(s),
        Value::Blob(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
    }
}

/// Read an SQL value as an integer.
pub(crate) fn sql_int(value: Value) -> Option<i64> {
    match value {
        Value::Integer(n) => Some(n),
        Value::Real(x) => Some(truncate_real(x)),
        Value::Text(s) => s.trim().parse().ok(),
        Value::Null | Value::Blob(_) => None,
    }
}

/// Read an SQL value as a boolean flag.
pub(crate) fn sql_flag(value: &Value) -> bool {
    match value {
        Value::Integer(n) => *n != 0,
        Value::Real(x) => *x != 0.0,
        Value::Text(s) => text_flag(s),
        Value::Null | Value::Blob(_) => false,
    }
}

/// Interpret submitted or stored text as a checkbox state.
pub(crate) fn text_flag(s: &str) -> bool {
    !matches!(
        s.trim().to_ascii_lowercase().as_str(),
        "" | "0" | "false" | "off" | "no"
    )
}

/// Convert optional text into an SQL value.
pub(crate) fn opt_text(value: Option<&String>) -> Value {
    value.map_or(Value::Null, |s| Value::Text(s.clone()))
}
