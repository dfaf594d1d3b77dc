//! Convenience re-exports for common store-object usage

// Core traits
pub use crate::traits::{ExecOutcome, Row, SqlExecutor};

// Error types
pub use crate::errors::{QueryError, StoreError};

// Table access
pub use crate::generic_store::{PgExecutor, TableStore};

// Query building
pub use crate::dialect::Dialect;
pub use crate::query_builder::{
    ListOptions, ListQuery, QueryFilter, QueryOperator, SortOrder, Statement, ValidatedQuery,
};

// Schema types
pub use type_mapping::{FieldDescriptor, FieldKind, SqlValue, TableSchema};

// Common external dependencies that are frequently used
pub use async_trait::async_trait;
pub use serde::{Deserialize, Serialize};
pub use sqlx::PgPool;
