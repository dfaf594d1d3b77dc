//! Traits for database operations

pub mod executor;

pub use executor::{ExecOutcome, Row, SqlExecutor};
