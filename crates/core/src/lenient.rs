//! Helpers for loosely typed JSON input from admin clients.
//!
//! Numeric fields may arrive as JSON numbers or as numeric strings, and
//! update payloads need to tell an absent field apart from an explicit
//! `null`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::CoreError;

/// Read an optional integer field that may be a number or a numeric string.
///
/// `None` and JSON `null` both mean "not provided".
pub fn int_field(value: Option<&Value>, field: &str) -> Result<Option<i64>, CoreError> {
    let invalid = || CoreError::Validation(format!("{field} must be a valid number"));
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .map(Some)
            .ok_or_else(invalid),
        Some(Value::String(s)) => s.trim().parse::<i64>().map(Some).map_err(|_| invalid()),
        Some(_) => Err(invalid()),
    }
}

/// Deserialize a field so that absent becomes `None` and `null` becomes
/// `Some(None)`. Use together with `#[serde(default)]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Deserialize a query flag that is on only when it reads `true` in any
/// case. Other values, such as `False`, `0` or `yes`, are off rather than an
/// error. Use together with `#[serde(default)]`.
pub fn true_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(|s| s.eq_ignore_ascii_case("true")))
}
