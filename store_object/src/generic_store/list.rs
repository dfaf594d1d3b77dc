//! Read operations of the table store

use super::core::TableStore;
use crate::errors::{QueryError, StoreError};
use crate::query_builder::builder::key_rows;
use crate::query_builder::{ListOptions, ListQuery, QueryFilter};
use crate::traits::{Row, SqlExecutor};
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;

impl<E: SqlExecutor> TableStore<E> {
    /// One page of rows keyed by primary key value.
    ///
    /// Without a primary key, rows are keyed by their position.
    pub async fn list(&self, options: &ListOptions) -> Result<IndexMap<String, Row>, StoreError> {
        let list = ListQuery::from_options(Arc::clone(&self.schema), options)?;
        let rows = list.load_data(&self.executor).await?;

        Ok(match self.schema.primary_key() {
            Some(pk) => key_rows(rows, pk.name()),
            None => rows
                .into_iter()
                .enumerate()
                .map(|(position, row)| (position.to_string(), row))
                .collect(),
        })
    }

    /// One page of rows keyed by the text of column `key`
    pub async fn list_keyed_by(
        &self,
        options: &ListOptions,
        key: &str,
    ) -> Result<IndexMap<String, Row>, StoreError> {
        ListQuery::from_options(Arc::clone(&self.schema), options)?
            .load_keyed(&self.executor, key)
            .await
    }

    /// Number of rows matching the query of `options`
    pub async fn count(&self, options: &ListOptions) -> Result<i64, StoreError> {
        ListQuery::from_options(Arc::clone(&self.schema), options)?
            .count(&self.executor)
            .await
    }

    /// First row whose `field` (the primary key by default) equals `value`
    pub async fn load(&self, value: Value, field: Option<&str>) -> Result<Option<Row>, StoreError> {
        let field = match field {
            Some(field) if self.schema.has_field(field) => field,
            Some(field) => return Err(QueryError::UnknownField(field.to_string()).into()),
            None => self.require_primary_key()?.name(),
        };

        let rows = self
            .list_query()
            .filter(QueryFilter::and(vec![QueryFilter::eq(field, value)]))?
            .page_size(1)
            .load_data(&self.executor)
            .await?;

        Ok(rows.into_iter().next())
    }
}
