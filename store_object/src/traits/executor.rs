//! Execution collaborator
//!
//! The query engine never talks to a database itself. Compiled statements
//! are handed to a [`SqlExecutor`], which runs them and returns rows as JSON
//! maps keyed by column name.

use crate::dialect::Dialect;
use crate::errors::StoreError;
use crate::query_builder::Statement;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// One result row, keyed by column name
pub type Row = Map<String, Value>;

/// What a non-query statement reported back
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutcome {
    pub rows_affected: u64,
    /// Generated key, for backends that report one outside of `RETURNING`
    pub last_insert_id: Option<i64>,
}

#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Dialect the compiled SQL must be written in
    fn dialect(&self) -> Dialect;

    async fn fetch_all(&self, statement: &Statement) -> Result<Vec<Row>, StoreError>;

    async fn execute(&self, statement: &Statement) -> Result<ExecOutcome, StoreError>;
}

#[async_trait]
impl<E: SqlExecutor + ?Sized> SqlExecutor for &E {
    fn dialect(&self) -> Dialect {
        (**self).dialect()
    }

    async fn fetch_all(&self, statement: &Statement) -> Result<Vec<Row>, StoreError> {
        (**self).fetch_all(statement).await
    }

    async fn execute(&self, statement: &Statement) -> Result<ExecOutcome, StoreError> {
        (**self).execute(statement).await
    }
}
