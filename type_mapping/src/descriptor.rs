//! Field descriptors
//!
//! One descriptor per table column: its kind, write-path flags and the
//! enumerated-option constraint.

use crate::kind::FieldKind;
use serde_json::Value;

/// Typed schema entry for one column
///
/// Descriptors are assembled builder-style and then handed to a
/// [`TableSchema`](crate::TableSchema), after which they are never mutated.
///
/// ```
/// use type_mapping::FieldDescriptor;
///
/// let id = FieldDescriptor::int("id").unsigned().auto_increment();
/// let status = FieldDescriptor::string("status").options(["A", "B", "C"]);
///
/// assert!(id.is_primary_key());
/// assert!(status.has_options());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    name: String,
    kind: FieldKind,
    required: bool,
    default_value: Option<Value>,
    primary_key: bool,
    auto_increment: bool,
    read_only: bool,
    options: Vec<Value>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            default_value: None,
            primary_key: false,
            auto_increment: false,
            read_only: false,
            options: Vec::new(),
        }
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::int())
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Float)
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::string())
    }

    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Bool)
    }

    pub fn datetime(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::DateTime)
    }

    /// Reject negative values. Only meaningful for `Int` fields, ignored otherwise.
    pub fn unsigned(mut self) -> Self {
        if let FieldKind::Int { unsigned } = &mut self.kind {
            *unsigned = true;
        }
        self
    }

    /// Limit the length of a `String` field, optionally cropping longer values
    /// instead of rejecting them. Ignored for other kinds.
    pub fn max_length(mut self, length: usize, crop: bool) -> Self {
        if let FieldKind::String {
            max_length,
            auto_crop,
        } = &mut self.kind
        {
            *max_length = Some(length);
            *auto_crop = crop;
        }
        self
    }

    pub fn optional(mut self, default_value: Option<Value>) -> Self {
        self.required = false;
        self.default_value = default_value;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Auto-increment fields are always the primary key
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self.primary_key = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn options<I, V>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn is_auto_increment(&self) -> bool {
        self.auto_increment
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn allowed_options(&self) -> &[Value] {
        &self.options
    }

    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }

    /// Check `candidate` against the kind rule and the option set.
    ///
    /// On success the candidate may have been rewritten (cropped string,
    /// completed timestamp, boolean as `1`/`0`); callers must keep using the
    /// rewritten value. A `false` result is an ordinary validation failure.
    pub fn validate_value(&self, candidate: &mut Value) -> bool {
        if !self.kind.validate(candidate) {
            return false;
        }
        self.matches_options(candidate)
    }

    /// Non-mutating variant of [`validate_value`](Self::validate_value)
    pub fn normalized(&self, value: &Value) -> Option<Value> {
        let mut candidate = value.clone();
        self.validate_value(&mut candidate).then_some(candidate)
    }

    fn matches_options(&self, candidate: &Value) -> bool {
        self.options.is_empty()
            || self
                .options
                .iter()
                .any(|option| loosely_equal(option, candidate))
    }
}

/// Equality used for option sets: numbers compare by value, booleans match
/// `1`/`0`, numeric strings match numbers.
fn loosely_equal(a: &Value, b: &Value) -> bool {
    match (as_number(a), as_number(b)) {
        (Some(x), Some(y)) if !(a.is_string() && b.is_string()) => x == y,
        _ => a == b,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    }
}
