//! Field type system shared across the queryhaus ecosystem
//!
//! Describes every column of a table (kind, constraints, write-path flags),
//! validates and normalizes candidate values, and maps them to typed bind
//! parameters.

#[cfg(feature = "debug-logging")]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

pub mod descriptor;
pub mod kind;
pub mod schema;
pub mod serialize;
pub mod types;
pub mod validate;

pub use descriptor::FieldDescriptor;
pub use kind::FieldKind;
pub use schema::{FieldSummary, SchemaError, TableSchema, TableSchemaBuilder};
pub use serialize::{coerce_loaded_value, plain_text, to_sql_value};
pub use types::SqlValue;
pub use validate::{is_valid_identifier, ValidatedFieldName, ValidatedTableName, ValidationError};
