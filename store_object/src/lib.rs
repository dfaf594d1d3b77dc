//! Store Object - query engine and table access for queryhaus
//!
//! This crate validates JSON query descriptions against a table schema,
//! renders them into parameterized SQL for a dialect, and runs the result
//! through an execution collaborator.

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

pub mod dialect;
pub mod errors;
pub mod generic_store;
pub mod prelude;
pub mod query_builder;
pub mod traits;

pub use dialect::Dialect;
pub use errors::{QueryError, StoreError};
pub use generic_store::{PgExecutor, TableStore};
pub use query_builder::{
    ListOptions, ListQuery, QueryFilter, QueryOperator, QueryValidator, SortOrder, Statement,
    ValidatedQuery,
};
pub use traits::*;

use sqlx::PgPool;

pub type DbPool = PgPool;
