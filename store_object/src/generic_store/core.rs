use crate::dialect::Dialect;
use crate::query_builder::ListQuery;
use crate::traits::SqlExecutor;
use indexmap::IndexMap;
use std::sync::Arc;
use type_mapping::{FieldDescriptor, FieldSummary, TableSchema};

use crate::errors::StoreError;

/// Row-level access to one table through a [`SqlExecutor`]
#[derive(Clone)]
pub struct TableStore<E: SqlExecutor> {
    pub(crate) schema: Arc<TableSchema>,
    pub(crate) executor: E,
}

impl<E: SqlExecutor> std::fmt::Debug for TableStore<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableStore")
            .field("table", &self.schema.table_name())
            .field("dialect", &self.executor.dialect())
            .finish()
    }
}

impl<E: SqlExecutor> TableStore<E> {
    pub fn new(schema: Arc<TableSchema>, executor: E) -> Self {
        Self { schema, executor }
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Empty list builder bound to this table
    pub fn list_query(&self) -> ListQuery {
        ListQuery::new(Arc::clone(&self.schema))
    }

    /// Per-field summary of the schema
    pub fn describe(&self) -> IndexMap<String, FieldSummary> {
        self.schema.describe()
    }

    pub(crate) fn dialect(&self) -> Dialect {
        self.executor.dialect()
    }

    pub(crate) fn quoted_table(&self) -> String {
        self.dialect().quote_identifier(self.schema.table_name())
    }

    pub(crate) fn require_primary_key(&self) -> Result<&FieldDescriptor, StoreError> {
        self.schema
            .primary_key()
            .ok_or_else(|| StoreError::MissingPrimaryKey(self.schema.table_name().to_string()))
    }
}
