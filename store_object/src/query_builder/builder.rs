//! List queries
//!
//! [`ListQuery`] collects a validated filter, pagination, ordering,
//! projection and row locking for one table, then compiles them into a
//! `SELECT` or `COUNT` statement for a given dialect.

use crate::dialect::Dialect;
use crate::errors::{QueryError, StoreError};
use crate::query_builder::filter::QueryFilter;
use crate::query_builder::options::ListOptions;
use crate::query_builder::ordering::SortOrder;
use crate::query_builder::pagination::Pagination;
use crate::query_builder::sql_generation::{SqlGenerator, Statement};
use crate::query_builder::validator::{QueryValidator, ValidatedQuery};
use crate::traits::{Row, SqlExecutor};
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;
use type_mapping::{plain_text, TableSchema};

/// Request-scoped list builder for one table
#[derive(Debug, Clone)]
pub struct ListQuery {
    schema: Arc<TableSchema>,
    query: Option<ValidatedQuery>,
    pagination: Pagination,
    sort_fields: IndexMap<String, SortOrder>,
    result_fields: Vec<String>,
    lock_for_update: bool,
}

impl ListQuery {
    pub fn new(schema: Arc<TableSchema>) -> Self {
        Self {
            schema,
            query: None,
            pagination: Pagination::new(),
            sort_fields: IndexMap::new(),
            result_fields: Vec::new(),
            lock_for_update: false,
        }
    }

    /// Apply every setting present in `options`
    pub fn from_options(schema: Arc<TableSchema>, options: &ListOptions) -> Result<Self, QueryError> {
        let mut list = Self::new(schema);

        if let Some(query) = &options.query {
            list = list.query(query)?;
        }
        if let Some(page_size) = options.page_size {
            list = list.page_size(page_size);
        }
        if let Some(page) = options.page {
            list = list.page(page);
        }

        Ok(list
            .sort_fields(&options.sort_fields)
            .result_fields(&options.fields))
    }

    /// Set the filter from its JSON wire form. Validation happens here.
    pub fn query(mut self, query: &Value) -> Result<Self, QueryError> {
        self.query = Some(QueryValidator::new(&self.schema).validate_json(query)?);
        Ok(self)
    }

    /// Set the filter from a tree assembled in code
    pub fn filter(mut self, filter: QueryFilter) -> Result<Self, QueryError> {
        self.query = Some(QueryValidator::new(&self.schema).validate(filter)?);
        Ok(self)
    }

    /// Values below 1 fall back to the default, values above the maximum are capped
    pub fn page_size(mut self, page_size: i64) -> Self {
        self.pagination = self.pagination.with_page_size(page_size);
        self
    }

    /// 1-based; values below 1 select the first page
    pub fn page(mut self, page: i64) -> Self {
        self.pagination = self.pagination.with_page(page);
        self
    }

    /// Merge `(field, direction)` pairs into the sort order.
    ///
    /// Unknown fields and directions other than ASC/DESC are skipped.
    /// A field that is already sorted on keeps its position.
    pub fn sort_fields<I, K, D>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, D)>,
        K: AsRef<str>,
        D: AsRef<str>,
    {
        for (field, direction) in fields {
            let (field, direction) = (field.as_ref(), direction.as_ref());
            match SortOrder::parse(direction) {
                Some(order) if self.schema.has_field(field) => {
                    self.sort_fields.insert(field.to_string(), order);
                }
                _ => {
                    debug_log!(
                        "Dropping sort on '{}' {} for table '{}'",
                        field,
                        direction,
                        self.schema.table_name()
                    );
                }
            }
        }
        self
    }

    /// Add ordering
    pub fn order_by(self, field: &str, order: SortOrder) -> Self {
        self.sort_fields([(field, order.to_sql())])
    }

    /// Restrict the selected columns. Unknown fields are skipped.
    pub fn result_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let requested: Vec<String> = fields.into_iter().map(|f| f.as_ref().to_string()).collect();
        self.result_fields = self.schema.filter_existing(&requested);

        if self.result_fields.len() != requested.len() {
            debug_log!(
                "Dropped {} unknown result fields for table '{}'",
                requested.len() - self.result_fields.len(),
                self.schema.table_name()
            );
        }
        self
    }

    /// Append `FOR UPDATE` to the SELECT
    pub fn lock_for_update(mut self) -> Self {
        self.lock_for_update = true;
        self
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn validated_query(&self) -> Option<&ValidatedQuery> {
        self.query.as_ref()
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    /// Sort order as compiled: the explicit one, or the primary key ascending
    pub fn effective_order(&self) -> Vec<(String, SortOrder)> {
        if self.sort_fields.is_empty() {
            return self
                .schema
                .primary_key()
                .map(|pk| vec![(pk.name().to_string(), SortOrder::Asc)])
                .unwrap_or_default();
        }

        self.sort_fields
            .iter()
            .map(|(field, order)| (field.clone(), *order))
            .collect()
    }

    /// Compile the paged SELECT
    pub fn build_select(&self, dialect: Dialect) -> Statement {
        let generator = SqlGenerator::new(&self.schema, dialect);
        let mut params = Vec::new();

        let mut clauses = vec![format!(
            "SELECT {} FROM {}",
            generator.build_select_clause(&self.result_fields),
            generator.quote(self.schema.table_name())
        )];
        clauses.push(generator.build_where_clause(self.query.as_ref(), &mut params));
        clauses.push(generator.build_order_clause(&self.effective_order()));
        clauses.push(SqlGenerator::build_limit_clause(&self.pagination));
        if self.lock_for_update {
            clauses.push("FOR UPDATE".to_string());
        }

        let sql = join_clauses(clauses);
        debug_log!("Compiled select: {} ({} params)", sql, params.len());
        Statement::new(sql, params)
    }

    /// Compile `SELECT COUNT(*) AS total` over the filter, ignoring paging and ordering
    pub fn build_count(&self, dialect: Dialect) -> Statement {
        let generator = SqlGenerator::new(&self.schema, dialect);
        let mut params = Vec::new();

        let clauses = vec![
            format!(
                "SELECT COUNT(*) AS total FROM {}",
                generator.quote(self.schema.table_name())
            ),
            generator.build_where_clause(self.query.as_ref(), &mut params),
        ];

        let sql = join_clauses(clauses);
        debug_log!("Compiled count: {} ({} params)", sql, params.len());
        Statement::new(sql, params)
    }

    /// Number of rows matching the filter
    pub async fn count<E: SqlExecutor + ?Sized>(&self, executor: &E) -> Result<i64, StoreError> {
        let statement = self.build_count(executor.dialect());
        let rows = executor.fetch_all(&statement).await?;

        let Some(total) = rows.first().and_then(|row| row.get("total")) else {
            return Ok(0);
        };
        total
            .as_i64()
            .or_else(|| total.as_str().and_then(|s| s.parse().ok()))
            .ok_or_else(|| StoreError::UnexpectedResult(format!("count returned {}", total)))
    }

    /// Rows of the current page, coerced into their declared kinds
    pub async fn load_data<E: SqlExecutor + ?Sized>(&self, executor: &E) -> Result<Vec<Row>, StoreError> {
        let statement = self.build_select(executor.dialect());
        let rows = executor.fetch_all(&statement).await?;

        Ok(rows
            .into_iter()
            .map(|row| self.schema.coerce_row(row))
            .collect())
    }

    /// Rows of the current page keyed by the text of column `key`.
    ///
    /// A row without a value in that column is keyed by its position; later
    /// rows win on duplicate keys.
    pub async fn load_keyed<E: SqlExecutor + ?Sized>(
        &self,
        executor: &E,
        key: &str,
    ) -> Result<IndexMap<String, Row>, StoreError> {
        let rows = self.load_data(executor).await?;
        Ok(key_rows(rows, key))
    }
}

/// Key rows by the text of their `key` column. Rows without a value in that
/// column get the next integer slot above every integer key in the page, so
/// they never displace a keyed row.
pub(crate) fn key_rows(rows: Vec<Row>, key: &str) -> IndexMap<String, Row> {
    let row_key = |row: &Row| {
        row.get(key)
            .filter(|value| !value.is_null())
            .map(plain_text)
    };

    let mut next_slot = rows
        .iter()
        .filter_map(|row| row_key(row)?.parse::<i64>().ok())
        .max()
        .map_or(0, |highest| highest.saturating_add(1));

    let mut keyed = IndexMap::with_capacity(rows.len());
    for row in rows {
        let slot = match row_key(&row) {
            Some(text) => text,
            None => {
                let slot = next_slot.to_string();
                next_slot = next_slot.saturating_add(1);
                slot
            }
        };
        keyed.insert(slot, row);
    }
    keyed
}

fn join_clauses(clauses: Vec<String>) -> String {
    clauses
        .into_iter()
        .filter(|clause| !clause.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
