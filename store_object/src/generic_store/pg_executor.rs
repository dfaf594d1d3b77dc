//! Postgres execution through a `sqlx` pool

use crate::dialect::Dialect;
use crate::errors::StoreError;
use crate::query_builder::Statement;
use crate::traits::{ExecOutcome, Row, SqlExecutor};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Number, Value};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{Column, PgPool, Postgres, Row as _, TypeInfo, ValueRef};
use type_mapping::kind::{DATETIME_FORMAT, DATE_FORMAT};
use type_mapping::SqlValue;

#[derive(Debug, Clone)]
pub struct PgExecutor {
    pool: PgPool,
    log_statements: bool,
}

impl PgExecutor {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            log_statements: false,
        }
    }

    /// Log every statement at info level before it runs
    pub fn with_statement_logging(mut self, enabled: bool) -> Self {
        self.log_statements = enabled;
        self
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn log(&self, statement: &Statement) {
        if self.log_statements {
            tracing::info!(
                sql = %statement.sql,
                params = statement.params.len(),
                "executing statement"
            );
        } else {
            debug_log!(
                "Executing '{}' with {} params",
                statement.sql,
                statement.params.len()
            );
        }
    }
}

// Shared parameter binding for every statement kind
macro_rules! bind_sql_value {
    ($query:expr, $param:expr) => {
        match $param {
            SqlValue::Text(s) => $query.bind(s),
            SqlValue::BigInt(i) => $query.bind(i),
            SqlValue::Float(f) => $query.bind(f),
            SqlValue::Boolean(b) => $query.bind(b),
            SqlValue::Timestamp(ts) => $query.bind(ts),
            SqlValue::Null => $query.bind(Option::<String>::None),
        }
    };
}

fn build_query(statement: &Statement) -> sqlx::query::Query<'_, Postgres, PgArguments> {
    let mut query = sqlx::query(&statement.sql);
    for param in &statement.params {
        query = bind_sql_value!(query, param.clone());
    }
    query
}

#[async_trait]
impl SqlExecutor for PgExecutor {
    fn dialect(&self) -> Dialect {
        Dialect::Postgresql
    }

    async fn fetch_all(&self, statement: &Statement) -> Result<Vec<Row>, StoreError> {
        self.log(statement);
        let rows = build_query(statement).fetch_all(&self.pool).await?;
        rows.iter().map(decode_row).collect()
    }

    async fn execute(&self, statement: &Statement) -> Result<ExecOutcome, StoreError> {
        self.log(statement);
        let result = build_query(statement).execute(&self.pool).await?;
        Ok(ExecOutcome {
            rows_affected: result.rows_affected(),
            last_insert_id: None,
        })
    }
}

/// Decode a row into JSON by the Postgres type of each column
fn decode_row(row: &PgRow) -> Result<Row, StoreError> {
    let mut decoded = Row::new();

    for column in row.columns() {
        let index = column.ordinal();
        let name = column.name();

        if row.try_get_raw(index)?.is_null() {
            decoded.insert(name.to_string(), Value::Null);
            continue;
        }

        let value = match column.type_info().name() {
            "BOOL" => Value::from(row.try_get::<bool, _>(index)?),
            "INT2" => Value::from(row.try_get::<i16, _>(index)?),
            "INT4" => Value::from(row.try_get::<i32, _>(index)?),
            "INT8" => Value::from(row.try_get::<i64, _>(index)?),
            "FLOAT4" => float_value(row.try_get::<f32, _>(index)? as f64),
            "FLOAT8" => float_value(row.try_get::<f64, _>(index)?),
            "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" | "CHAR" => {
                Value::String(row.try_get::<String, _>(index)?)
            }
            "TIMESTAMP" => Value::String(
                row.try_get::<NaiveDateTime, _>(index)?
                    .format(DATETIME_FORMAT)
                    .to_string(),
            ),
            "TIMESTAMPTZ" => Value::String(
                row.try_get::<DateTime<Utc>, _>(index)?
                    .naive_utc()
                    .format(DATETIME_FORMAT)
                    .to_string(),
            ),
            "DATE" => Value::String(
                row.try_get::<NaiveDate, _>(index)?
                    .format(DATE_FORMAT)
                    .to_string(),
            ),
            "UUID" => Value::String(row.try_get::<uuid::Uuid, _>(index)?.to_string()),
            "JSON" | "JSONB" => row.try_get::<Value, _>(index)?,
            other => {
                return Err(StoreError::Decode {
                    column: name.to_string(),
                    message: format!("unsupported column type {}", other),
                });
            }
        };

        decoded.insert(name.to_string(), value);
    }

    Ok(decoded)
}

fn float_value(f: f64) -> Value {
    Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
}
