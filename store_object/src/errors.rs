use serde_json::Value;
use thiserror::Error;
use type_mapping::SchemaError;

/// Rejections produced while validating a query description
///
/// Validation is fail-fast: the first problem found on the depth-first walk
/// is reported.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("invalid query - {0}")]
    Malformed(String),

    #[error("invalid query - field {0} does not exist")]
    UnknownField(String),

    #[error("invalid query - unknown operator {0}")]
    UnknownOperator(String),

    #[error("invalid query - missing value or reference for {field} {operator}")]
    MissingOperand { field: String, operator: String },

    #[error("invalid query - invalid value {value} for field {field}")]
    InvalidValue { field: String, value: Value },

    #[error("invalid query - list contains invalid value {value} for field {field}")]
    InvalidListElement { field: String, value: Value },

    #[error("invalid query - reference {reference} does not exist (compared with {field})")]
    UnknownReference { field: String, reference: String },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Invalid value for field '{field}': {value}")]
    InvalidValue { field: String, value: Value },

    #[error("Missing value for required field '{0}'")]
    MissingValue(String),

    #[error("Table '{0}' has no primary key")]
    MissingPrimaryKey(String),

    #[error("Failed to decode column '{column}': {message}")]
    Decode { column: String, message: String },

    #[error("Unexpected result: {0}")]
    UnexpectedResult(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
