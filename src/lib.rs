//! # QueryHaus
//!
//! A typed data-access layer for PostgreSQL. Clients describe filters as
//! nested `and`/`or` JSON trees; QueryHaus validates them against a table
//! schema and compiles them into parameterized, paginated SQL.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use queryhaus::prelude::*;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let mut queryhaus = QueryHaus::new(&config).await?;
//!
//!     queryhaus.register_table(
//!         TableSchema::builder("users")
//!             .field(FieldDescriptor::int("id").unsigned().auto_increment())
//!             .field(FieldDescriptor::string("name").max_length(100, false))
//!             .field(FieldDescriptor::int("age").optional(None))
//!             .build()?,
//!     )?;
//!
//!     let users = queryhaus.table("users")?;
//!     let options: ListOptions = serde_json::from_value(json!({
//!         "query": {"and": [{"field": "age", "operator": "gte", "value": 18}]},
//!         "pageSize": 20,
//!         "sortFields": {"name": "ASC"}
//!     }))?;
//!
//!     let total = users.count(&options).await?;
//!     let page = users.list(&options).await?;
//!     println!("{} of {} adults", page.len(), total);
//!
//!     Ok(())
//! }
//! ```

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod core;
pub mod errors;
pub mod prelude;

// Re-export the main public types for convenience
pub use core::QueryHaus;
pub use errors::QueryHausError;

// Re-export centralized config
pub use config::{AppConfig, DatabaseConfig, QueryConfig};

// Re-export internal crates used by the public API
pub use store_object;
pub use type_mapping;

// Re-export external dependencies used in public API
pub use sqlx;
pub use async_trait;
