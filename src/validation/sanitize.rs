//! Shared emptiness, defaulting and sanitizing rules
//!
//! Sanitizing is idempotent: sanitizing an already sanitized value returns
//! it unchanged.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Number, Value};

use crate::schema::{FieldType, FormField};

/// Canonical stored form of a date value.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Accepted date-time layouts besides RFC 3339.
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Absent, null, the empty string, and the empty list are all "empty".
pub fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

/// Value stored for an optional field that was left empty.
pub fn get_default_value(field: &FormField) -> Value {
    if let Some(value) = &field.default_value {
        return value.clone();
    }

    match field.field_type {
        FieldType::Text | FieldType::Textarea | FieldType::Email => Value::String(String::new()),
        FieldType::Number => Value::from(0),
        FieldType::Checkbox if !field.options.is_empty() => Value::Array(Vec::new()),
        FieldType::Checkbox => Value::Bool(false),
        FieldType::Select | FieldType::Radio => field
            .options
            .first()
            .map(|o| o.value.clone())
            .unwrap_or(Value::Null),
        FieldType::Date | FieldType::Time | FieldType::File | FieldType::Photo => Value::Null,
    }
}

/// Normalizes a validated value into its stored form.
pub fn sanitize_value(field: &FormField, value: &Value) -> Value {
    match field.field_type {
        FieldType::Text | FieldType::Textarea => Value::String(stringify(value).trim().to_string()),
        FieldType::Email => Value::String(stringify(value).trim().to_lowercase()),
        FieldType::Number => coerce_number(value)
            .map(number_value)
            .unwrap_or_else(|| value.clone()),
        FieldType::Date => parse_date(value)
            .map(|d| Value::String(d.format(DATE_FORMAT).to_string()))
            .unwrap_or_else(|| value.clone()),
        FieldType::Time => match value {
            Value::String(s) => Value::String(s.trim().to_string()),
            other => other.clone(),
        },
        FieldType::Checkbox => match value {
            Value::Array(items) => {
                Value::Array(items.iter().filter(|v| !v.is_null()).cloned().collect())
            }
            other => Value::Bool(is_truthy(other)),
        },
        FieldType::Select | FieldType::Radio | FieldType::File | FieldType::Photo => value.clone(),
    }
}

/// Numeric reading of a value, if it has one.
///
/// Numbers pass through, strings are parsed after trimming, booleans read
/// as 1 and 0. Non-finite results are rejected.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        Value::Bool(b) => f64::from(u8::from(*b)),
        _ => return None,
    };

    n.is_finite().then_some(n)
}

/// JSON number for `n`, integral values stored as integers.
pub fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

/// Calendar date of a value, if it denotes one.
///
/// Strings may be a plain date, an RFC 3339 timestamp (converted to UTC),
/// or a local date-time. Integers are read as epoch milliseconds.
pub fn parse_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(date) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
                return Some(date);
            }
            if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
                return Some(ts.with_timezone(&Utc).date_naive());
            }
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        }
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|ts| ts.date_naive()),
        _ => None,
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
