//! Query trees
//!
//! A query is a tree of `and`/`or` groups whose leaves compare one field with
//! a literal, a list of literals, or another field.

use serde_json::Value;
use std::fmt;

/// Comparison operators with their wire codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryOperator {
    Eq,          // eq
    Gt,          // gt
    Gte,         // gte
    Lt,          // lt
    Lte,         // lte
    Neq,         // neq
    Contains,    // cv
    NotContains, // ncv
    Empty,       // ey
    NotEmpty,    // ney
    In,          // in
    NotIn,       // nin
}

impl QueryOperator {
    pub const ALL: [QueryOperator; 12] = [
        QueryOperator::Eq,
        QueryOperator::Gt,
        QueryOperator::Gte,
        QueryOperator::Lt,
        QueryOperator::Lte,
        QueryOperator::Neq,
        QueryOperator::Contains,
        QueryOperator::NotContains,
        QueryOperator::Empty,
        QueryOperator::NotEmpty,
        QueryOperator::In,
        QueryOperator::NotIn,
    ];

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|operator| operator.code() == code)
    }

    pub fn code(&self) -> &'static str {
        match self {
            QueryOperator::Eq => "eq",
            QueryOperator::Gt => "gt",
            QueryOperator::Gte => "gte",
            QueryOperator::Lt => "lt",
            QueryOperator::Lte => "lte",
            QueryOperator::Neq => "neq",
            QueryOperator::Contains => "cv",
            QueryOperator::NotContains => "ncv",
            QueryOperator::Empty => "ey",
            QueryOperator::NotEmpty => "ney",
            QueryOperator::In => "in",
            QueryOperator::NotIn => "nin",
        }
    }

    /// Unary operators take no value and no reference
    pub fn is_unary(&self) -> bool {
        matches!(self, QueryOperator::Empty | QueryOperator::NotEmpty)
    }

    /// Operators whose value may be a list of literals
    pub fn accepts_list(&self) -> bool {
        matches!(self, QueryOperator::In | QueryOperator::NotIn)
    }

    /// SQL comparison symbol for the plain comparison operators
    pub(crate) fn comparison_sql(&self) -> Option<&'static str> {
        match self {
            QueryOperator::Eq => Some("="),
            QueryOperator::Gt => Some(">"),
            QueryOperator::Gte => Some(">="),
            QueryOperator::Lt => Some("<"),
            QueryOperator::Lte => Some("<="),
            QueryOperator::Neq => Some("!="),
            _ => None,
        }
    }
}

impl fmt::Display for QueryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Right-hand side of a condition
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    None,
    /// A literal, or an array of literals for `in`/`nin`
    Value(Value),
    /// Name of another field of the same table
    Reference(String),
}

/// Single condition in WHERE clause
#[derive(Debug, Clone, PartialEq)]
pub struct QueryCondition {
    pub field: String,
    pub operator: QueryOperator,
    pub operand: Operand,
}

/// Logical operators for combining conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    /// Key used by the JSON wire format
    pub fn key(&self) -> &'static str {
        match self {
            LogicalOperator::And => "and",
            LogicalOperator::Or => "or",
        }
    }

    pub fn to_sql(&self) -> &'static str {
        match self {
            LogicalOperator::And => "AND",
            LogicalOperator::Or => "OR",
        }
    }
}

/// Query filter that can be nested
#[derive(Debug, Clone, PartialEq)]
pub enum QueryFilter {
    Condition(QueryCondition),
    Group {
        operator: LogicalOperator,
        filters: Vec<QueryFilter>,
    },
}

impl QueryFilter {
    /// Create a simple condition
    pub fn condition(field: &str, operator: QueryOperator, operand: Operand) -> Self {
        Self::Condition(QueryCondition {
            field: field.to_string(),
            operator,
            operand,
        })
    }

    /// Create AND group
    pub fn and(filters: Vec<QueryFilter>) -> Self {
        Self::Group {
            operator: LogicalOperator::And,
            filters,
        }
    }

    /// Create OR group
    pub fn or(filters: Vec<QueryFilter>) -> Self {
        Self::Group {
            operator: LogicalOperator::Or,
            filters,
        }
    }

    pub fn eq(field: &str, value: Value) -> Self {
        Self::condition(field, QueryOperator::Eq, Operand::Value(value))
    }

    pub fn neq(field: &str, value: Value) -> Self {
        Self::condition(field, QueryOperator::Neq, Operand::Value(value))
    }

    pub fn gt(field: &str, value: Value) -> Self {
        Self::condition(field, QueryOperator::Gt, Operand::Value(value))
    }

    pub fn gte(field: &str, value: Value) -> Self {
        Self::condition(field, QueryOperator::Gte, Operand::Value(value))
    }

    pub fn lt(field: &str, value: Value) -> Self {
        Self::condition(field, QueryOperator::Lt, Operand::Value(value))
    }

    pub fn lte(field: &str, value: Value) -> Self {
        Self::condition(field, QueryOperator::Lte, Operand::Value(value))
    }

    /// Substring match, rendered as `LIKE '%value%'`
    pub fn contains(field: &str, value: Value) -> Self {
        Self::condition(field, QueryOperator::Contains, Operand::Value(value))
    }

    pub fn not_contains(field: &str, value: Value) -> Self {
        Self::condition(field, QueryOperator::NotContains, Operand::Value(value))
    }

    /// NULL or empty string
    pub fn empty(field: &str) -> Self {
        Self::condition(field, QueryOperator::Empty, Operand::None)
    }

    pub fn not_empty(field: &str) -> Self {
        Self::condition(field, QueryOperator::NotEmpty, Operand::None)
    }

    /// IN condition
    pub fn in_values(field: &str, values: Vec<Value>) -> Self {
        Self::condition(field, QueryOperator::In, Operand::Value(Value::Array(values)))
    }

    /// NOT IN condition
    pub fn not_in_values(field: &str, values: Vec<Value>) -> Self {
        Self::condition(
            field,
            QueryOperator::NotIn,
            Operand::Value(Value::Array(values)),
        )
    }

    /// Compare `field` with another field of the same table
    pub fn reference(field: &str, operator: QueryOperator, other: &str) -> Self {
        Self::condition(field, operator, Operand::Reference(other.to_string()))
    }

    /// Number of conditions in the tree
    pub fn condition_count(&self) -> usize {
        match self {
            QueryFilter::Condition(_) => 1,
            QueryFilter::Group { filters, .. } => {
                filters.iter().map(QueryFilter::condition_count).sum()
            }
        }
    }
}
