//! Conversions between JSON values and column values
//!
//! Validated JSON literals are turned into typed bind parameters on the way
//! in, and loaded column values are coerced back to their declared kind on the
//! way out.

use crate::kind::{as_finite, as_integer, FieldKind, DATETIME_FORMAT};
use crate::types::SqlValue;
use chrono::NaiveDateTime;
use serde_json::{Number, Value};

/// Convert an already validated value into a bind parameter for a column of `kind`
pub fn to_sql_value(kind: &FieldKind, value: &Value) -> SqlValue {
    if value.is_null() {
        return SqlValue::Null;
    }

    match kind {
        FieldKind::Int { .. } => match (as_integer(value), as_finite(value)) {
            (Some(i), _) => SqlValue::BigInt(i),
            (None, Some(f)) => SqlValue::Float(f),
            (None, None) => SqlValue::Text(plain_text(value)),
        },
        FieldKind::Float => match value.as_f64() {
            Some(f) => SqlValue::Float(f),
            None => SqlValue::Text(plain_text(value)),
        },
        FieldKind::Bool => match value {
            Value::Bool(b) => SqlValue::Boolean(*b),
            other => SqlValue::Boolean(as_integer(other).unwrap_or(0) != 0),
        },
        FieldKind::DateTime => value
            .as_str()
            .and_then(|s| NaiveDateTime::parse_from_str(s, DATETIME_FORMAT).ok())
            .map(SqlValue::Timestamp)
            .unwrap_or_else(|| SqlValue::Text(plain_text(value))),
        FieldKind::String { .. } => SqlValue::Text(plain_text(value)),
    }
}

/// Text form of a JSON scalar, without the quotes `Value::to_string` adds to strings
pub fn plain_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Coerce a value read from the database into the JSON shape of its declared kind
pub fn coerce_loaded_value(kind: &FieldKind, value: Value) -> Value {
    match (kind, value) {
        (_, Value::Null) => Value::Null,
        (FieldKind::Int { .. }, value) => match as_integer(&value) {
            Some(i) => Value::from(i),
            None => value,
        },
        (FieldKind::Float, Value::String(s)) => match s.parse::<f64>().ok().and_then(Number::from_f64) {
            Some(number) => Value::Number(number),
            None => Value::String(s),
        },
        (FieldKind::Bool, Value::Number(n)) => Value::Bool(n.as_i64().unwrap_or(0) != 0),
        (FieldKind::Bool, Value::String(s)) => match s.as_str() {
            "1" | "t" | "true" => Value::Bool(true),
            "0" | "f" | "false" => Value::Bool(false),
            _ => Value::String(s),
        },
        (FieldKind::DateTime, Value::String(s)) => match NaiveDateTime::parse_from_str(&s, DATETIME_FORMAT)
            .or_else(|_| s.parse::<NaiveDateTime>())
        {
            Ok(dt) => Value::String(dt.format(DATETIME_FORMAT).to_string()),
            Err(_) => Value::String(s),
        },
        (_, value) => value,
    }
}
