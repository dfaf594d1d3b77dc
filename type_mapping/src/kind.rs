//! Field kinds
//!
//! The closed set of semantic column types together with their kind-specific
//! constraints. Each kind knows how to check and normalize a candidate value.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Semantic type of a column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FieldKind {
    Int {
        unsigned: bool,
    },
    Float,
    String {
        max_length: Option<usize>,
        auto_crop: bool,
    },
    Bool,
    DateTime,
}

impl FieldKind {
    pub fn int() -> Self {
        FieldKind::Int { unsigned: false }
    }

    pub fn string() -> Self {
        FieldKind::String {
            max_length: None,
            auto_crop: false,
        }
    }

    /// Name used by `describe()` output
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Int { .. } => "Int",
            FieldKind::Float => "Float",
            FieldKind::String { .. } => "String",
            FieldKind::Bool => "Bool",
            FieldKind::DateTime => "DateTime",
        }
    }

    pub fn is_textual(&self) -> bool {
        matches!(self, FieldKind::String { .. })
    }

    /// Apply the kind-specific rule to `candidate`, rewriting it in place
    /// when it can be normalized.
    pub fn validate(&self, candidate: &mut Value) -> bool {
        match self {
            FieldKind::Int { unsigned } => validate_int(*unsigned, candidate),
            FieldKind::Float => validate_float(candidate),
            FieldKind::String {
                max_length,
                auto_crop,
            } => validate_string(*max_length, *auto_crop, candidate),
            FieldKind::Bool => validate_bool(candidate),
            FieldKind::DateTime => validate_datetime(candidate),
        }
    }
}

fn validate_int(unsigned: bool, candidate: &mut Value) -> bool {
    let Some(number) = as_finite(candidate) else {
        return false;
    };
    if unsigned && number < 0.0 {
        return false;
    }

    // Whole values are stored as integers, fractional ones keep their precision
    *candidate = match as_integer(candidate) {
        Some(integer) => Value::from(integer),
        None => match Number::from_f64(number) {
            Some(number) => Value::Number(number),
            None => return false,
        },
    };
    true
}

fn validate_float(candidate: &mut Value) -> bool {
    let parsed = match &*candidate {
        Value::Number(_) => return true,
        Value::String(s) => s.parse::<f64>().ok().and_then(Number::from_f64),
        _ => None,
    };

    match parsed {
        Some(number) => {
            *candidate = Value::Number(number);
            true
        }
        None => false,
    }
}

fn validate_string(max_length: Option<usize>, auto_crop: bool, candidate: &mut Value) -> bool {
    let Value::String(s) = candidate else {
        return false;
    };

    if let Some(max) = max_length {
        if s.chars().count() > max {
            if !auto_crop {
                return false;
            }
            *s = s.chars().take(max).collect();
        }
    }
    true
}

fn validate_bool(candidate: &mut Value) -> bool {
    let flag = match &*candidate {
        Value::Bool(b) => *b,
        Value::Number(_) | Value::String(_) => match as_integer(candidate) {
            Some(1) => true,
            Some(0) => false,
            _ => return false,
        },
        _ => return false,
    };

    *candidate = Value::from(if flag { 1 } else { 0 });
    true
}

fn validate_datetime(candidate: &mut Value) -> bool {
    let Value::String(s) = candidate else {
        return false;
    };

    if has_shape(s, "dddd-dd-dd") {
        if NaiveDate::parse_from_str(s, DATE_FORMAT).is_err() {
            return false;
        }
        s.push_str(" 00:00:00");
        return true;
    }

    has_shape(s, "dddd-dd-dd dd:dd:dd") && NaiveDateTime::parse_from_str(s, DATETIME_FORMAT).is_ok()
}

/// Numeric view of a JSON value: finite numbers and numeric strings,
/// exponent notation included.
pub(crate) fn as_finite(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

/// Integer view of a JSON value: numbers and numeric strings with no
/// fractional part.
pub(crate) fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) if n.is_i64() => n.as_i64(),
        Value::String(s) if s.parse::<i64>().is_ok() => s.parse::<i64>().ok(),
        _ => as_finite(value)
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
            .map(|f| f as i64),
    }
}

/// `d` matches an ASCII digit, every other pattern byte matches itself.
fn has_shape(s: &str, pattern: &str) -> bool {
    s.len() == pattern.len()
        && s
            .bytes()
            .zip(pattern.bytes())
            .all(|(c, p)| if p == b'd' { c.is_ascii_digit() } else { c == p })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(kind: &FieldKind, value: Value) -> (bool, Value) {
        let mut candidate = value;
        let ok = kind.validate(&mut candidate);
        (ok, candidate)
    }

    #[test]
    fn test_int_rules() {
        let kind = FieldKind::int();
        assert_eq!(check(&kind, json!(42)), (true, json!(42)));
        assert_eq!(check(&kind, json!("42")), (true, json!(42)));
        assert_eq!(check(&kind, json!(-7)), (true, json!(-7)));
        assert_eq!(check(&kind, json!(3.0)), (true, json!(3)));
        assert_eq!(check(&kind, json!("1e3")), (true, json!(1000)));
        assert_eq!(check(&kind, json!(3.5)), (true, json!(3.5)));
        assert_eq!(check(&kind, json!("-2.25")), (true, json!(-2.25)));
        assert!(!check(&kind, json!("abc")).0);
        assert!(!check(&kind, json!("inf")).0);
        assert!(!check(&kind, json!(true)).0);
        assert!(!check(&kind, Value::Null).0);

        let unsigned = FieldKind::Int { unsigned: true };
        assert!(check(&unsigned, json!(0)).0);
        assert!(!check(&unsigned, json!(-1)).0);
        assert!(!check(&unsigned, json!("-1")).0);
        assert!(!check(&unsigned, json!(-0.5)).0);
    }

    #[test]
    fn test_float_rules() {
        assert_eq!(check(&FieldKind::Float, json!(1.5)), (true, json!(1.5)));
        assert_eq!(check(&FieldKind::Float, json!(2)), (true, json!(2)));
        assert_eq!(check(&FieldKind::Float, json!("2.25")), (true, json!(2.25)));
        assert!(!check(&FieldKind::Float, json!("NaN")).0);
        assert!(!check(&FieldKind::Float, json!("1,5")).0);
        assert!(!check(&FieldKind::Float, json!([1.0])).0);
    }

    #[test]
    fn test_string_length_and_crop() {
        let strict = FieldKind::String {
            max_length: Some(5),
            auto_crop: false,
        };
        assert_eq!(check(&strict, json!("hello")), (true, json!("hello")));
        assert!(!check(&strict, json!("hello world")).0);
        assert!(!check(&strict, json!(12)).0);

        let cropping = FieldKind::String {
            max_length: Some(5),
            auto_crop: true,
        };
        assert_eq!(check(&cropping, json!("hello world")), (true, json!("hello")));
        // Cropping counts characters, not bytes
        assert_eq!(check(&cropping, json!("ñañañañá")), (true, json!("ñañañ")));

        assert!(check(&FieldKind::string(), json!("x".repeat(10_000))).0);
    }

    #[test]
    fn test_bool_normalization() {
        assert_eq!(check(&FieldKind::Bool, json!(true)), (true, json!(1)));
        assert_eq!(check(&FieldKind::Bool, json!(false)), (true, json!(0)));
        assert_eq!(check(&FieldKind::Bool, json!(1)), (true, json!(1)));
        assert_eq!(check(&FieldKind::Bool, json!("0")), (true, json!(0)));
        assert_eq!(check(&FieldKind::Bool, json!(1.0)), (true, json!(1)));
        assert_eq!(check(&FieldKind::Bool, json!("1.0")), (true, json!(1)));
        assert_eq!(check(&FieldKind::Bool, json!("0e0")), (true, json!(0)));
        assert!(!check(&FieldKind::Bool, json!(2)).0);
        assert!(!check(&FieldKind::Bool, json!(0.5)).0);
        assert!(!check(&FieldKind::Bool, json!("yes")).0);
    }

    #[test]
    fn test_datetime_formats() {
        assert_eq!(
            check(&FieldKind::DateTime, json!("2024-03-01")),
            (true, json!("2024-03-01 00:00:00"))
        );
        assert_eq!(
            check(&FieldKind::DateTime, json!("2024-03-01 13:45:00")),
            (true, json!("2024-03-01 13:45:00"))
        );
        assert!(!check(&FieldKind::DateTime, json!("2024-3-1")).0);
        assert!(!check(&FieldKind::DateTime, json!("2024-02-30")).0);
        assert!(!check(&FieldKind::DateTime, json!("2024-03-01T13:45:00")).0);
        assert!(!check(&FieldKind::DateTime, json!(20240301)).0);
    }
}
