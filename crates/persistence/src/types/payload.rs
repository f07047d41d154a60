//! Raw event payloads.
//!
//! An [`EventPayload`] is what a client proposed, before validation. It keeps
//! the JSON values untouched so validation can report type errors per field
//! instead of failing deserialization wholesale.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;

/// A proposed event, as received.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use tracekeep_persistence::types::EventPayload;
///
/// let payload = EventPayload::try_from(json!({"event_type": "movement", "area_id": 1})).unwrap();
/// assert_eq!(payload.string("event_type"), Some("movement"));
/// assert!(payload.non_empty("batch_id").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventPayload(Map<String, Value>);

impl EventPayload {
    /// Creates an empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a payload from form fields.
    ///
    /// Form bodies only carry strings; integer and numeric rules accept
    /// digit strings, so no type coercion happens here. When a key repeats,
    /// the last value wins.
    pub fn from_form_fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = fields
            .into_iter()
            .map(|(k, v)| (k.into(), Value::String(v.into())))
            .collect();
        Self(map)
    }

    /// Sets a field, returning the payload for chaining.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Returns the raw value of a field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns the value of a field unless it is absent, `null`, or a blank
    /// string.
    pub fn non_empty(&self, field: &str) -> Option<&Value> {
        self.0.get(field).filter(|value| !is_empty_value(value))
    }

    /// Returns a non-blank string field.
    pub fn string(&self, field: &str) -> Option<&str> {
        self.non_empty(field).and_then(Value::as_str)
    }

    /// Returns the underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl TryFrom<Value> for EventPayload {
    type Error = ValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ValidationError::NotAnObject {
                found: json_type_name(&other).to_string(),
            }),
        }
    }
}

/// Returns `true` for values a "required" rule treats as missing.
pub(crate) fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Interprets a value as an integer.
///
/// Accepts JSON integers and strings of base-10 digits with an optional sign.
/// Floats are rejected even when integral (`1.0`).
pub(crate) fn parse_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => {
            let s = s.trim();
            let digits = s.strip_prefix(&['-', '+'][..]).unwrap_or(s);
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            s.parse().ok()
        }
        _ => None,
    }
}

/// Returns `true` for JSON numbers and numeric strings, whatever their
/// magnitude.
pub(crate) fn is_numeric(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(s) => {
            let s = s.trim();
            s.bytes()
                .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
                && s.parse::<f64>().is_ok()
        }
        _ => false,
    }
}

/// Interprets a value as a decimal number.
///
/// Accepts JSON numbers and numeric strings, including scientific notation.
/// Values outside the range of [`Decimal`] (about ±7.9e28) yield `None`.
pub(crate) fn parse_decimal(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Returns the JSON type name used in messages.
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_non_object_rejected() {
        let err = EventPayload::try_from(json!([1, 2])).unwrap_err();
        assert!(matches!(err, ValidationError::NotAnObject { ref found } if found == "array"));
    }

    #[test]
    fn test_empty_values() {
        let payload = EventPayload::new()
            .with("a", Value::Null)
            .with("b", "   ")
            .with("c", json!([]))
            .with("d", 0)
            .with("e", false);

        assert!(payload.non_empty("a").is_none());
        assert!(payload.non_empty("b").is_none());
        assert!(payload.non_empty("c").is_none());
        assert!(payload.non_empty("d").is_some());
        assert!(payload.non_empty("e").is_some());
        assert!(payload.non_empty("missing").is_none());
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer(&json!(12)), Some(12));
        assert_eq!(parse_integer(&json!("12")), Some(12));
        assert_eq!(parse_integer(&json!(" -4 ")), Some(-4));
        assert_eq!(parse_integer(&json!("+4")), Some(4));
        assert_eq!(parse_integer(&json!(1.0)), None);
        assert_eq!(parse_integer(&json!("1.0")), None);
        assert_eq!(parse_integer(&json!("1e3")), None);
        assert_eq!(parse_integer(&json!("-")), None);
        assert_eq!(parse_integer(&json!(true)), None);
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal(&json!(2.5)), Some(Decimal::new(25, 1)));
        assert_eq!(parse_decimal(&json!("10")), Some(Decimal::new(10, 0)));
        assert_eq!(parse_decimal(&json!("1e3")), Some(Decimal::new(1000, 0)));
        assert_eq!(parse_decimal(&json!("ten")), None);
        assert_eq!(parse_decimal(&json!(null)), None);
    }

    #[test]
    fn test_numeric_values_beyond_decimal_range() {
        assert!(is_numeric(&json!(1e30)));
        assert!(is_numeric(&json!(" -2.5e40 ")));
        assert_eq!(parse_decimal(&json!(1e30)), None);
        assert!(!is_numeric(&json!("inf")));
        assert!(!is_numeric(&json!("NaN")));
        assert!(!is_numeric(&json!("")));
        assert!(!is_numeric(&json!(true)));
    }

    #[test]
    fn test_form_fields_last_value_wins() {
        let payload =
            EventPayload::from_form_fields(vec![("unit", "g"), ("unit", "kg"), ("area_id", "1")]);
        assert_eq!(payload.string("unit"), Some("kg"));
        assert_eq!(payload.get("area_id"), Some(&json!("1")));
    }
}
