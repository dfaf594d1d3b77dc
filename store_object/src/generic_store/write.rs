//! Write operations of the table store
//!
//! Every written value passes the field's validation first and is bound in
//! its normalized form.

use super::core::TableStore;
use crate::dialect::Dialect;
use crate::errors::StoreError;
use crate::query_builder::Statement;
use crate::traits::{Row, SqlExecutor};
use serde_json::Value;
use type_mapping::{coerce_loaded_value, to_sql_value, FieldDescriptor, SqlValue};

impl<E: SqlExecutor> TableStore<E> {
    /// Insert `row` and return it with normalized values and the generated key.
    ///
    /// Read-only fields are never written. An absent or blank auto-increment
    /// key is left to the database; absent optional fields take their default.
    pub async fn create(&self, row: Row) -> Result<Row, StoreError> {
        let dialect = self.dialect();
        let mut columns = Vec::new();
        let mut params = Vec::new();
        let mut written = Row::new();

        for field in self.schema.fields() {
            if field.is_read_only() {
                continue;
            }

            let value = match present(&row, field.name()) {
                Some(value) if field.is_auto_increment() && is_blank(value) => continue,
                Some(value) => value.clone(),
                None if field.is_auto_increment() => continue,
                None if !field.is_required() => match field.default_value() {
                    Some(default) => default.clone(),
                    None => continue,
                },
                None => return Err(StoreError::MissingValue(field.name().to_string())),
            };

            let (bound, normalized) = checked(field, value)?;
            columns.push(dialect.quote_identifier(field.name()));
            params.push(bound);
            written.insert(field.name().to_string(), normalized);
        }

        let mut sql = if columns.is_empty() {
            match dialect {
                Dialect::Postgresql => {
                    format!("INSERT INTO {} DEFAULT VALUES", self.quoted_table())
                }
                Dialect::Mysql => {
                    format!("INSERT INTO {} () VALUES ()", self.quoted_table())
                }
            }
        } else {
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                self.quoted_table(),
                columns.join(", "),
                dialect.placeholders(0, params.len())
            )
        };

        let generated = self
            .schema
            .auto_increment_field()
            .filter(|field| !written.contains_key(field.name()));

        match generated {
            Some(field) if dialect.supports_returning() => {
                sql.push_str(&format!(" RETURNING {}", dialect.quote_identifier(field.name())));
                let rows = self.executor.fetch_all(&Statement::new(sql, params)).await?;
                let id = rows
                    .first()
                    .and_then(|returned| returned.get(field.name()))
                    .cloned()
                    .ok_or_else(|| {
                        StoreError::UnexpectedResult(format!(
                            "insert into '{}' returned no '{}'",
                            self.schema.table_name(),
                            field.name()
                        ))
                    })?;
                written.insert(field.name().to_string(), coerce_loaded_value(field.kind(), id));
            }
            Some(field) => {
                let outcome = self.executor.execute(&Statement::new(sql, params)).await?;
                if let Some(id) = outcome.last_insert_id {
                    written.insert(field.name().to_string(), Value::from(id));
                }
            }
            None => {
                self.executor.execute(&Statement::new(sql, params)).await?;
            }
        }

        debug_log!("Created row in '{}'", self.schema.table_name());

        let mut created = row;
        created.extend(written);
        Ok(created)
    }

    /// Write every present, non-read-only field of `row` to the record it
    /// identifies by primary key. Returns the row with normalized values.
    pub async fn update(&self, row: Row) -> Result<Row, StoreError> {
        let dialect = self.dialect();
        let pk = self.require_primary_key()?;
        let pk_value = present(&row, pk.name())
            .cloned()
            .ok_or_else(|| StoreError::MissingValue(pk.name().to_string()))?;
        let (pk_bound, pk_normalized) = checked(pk, pk_value)?;

        let mut assignments = Vec::new();
        let mut params = Vec::new();
        let mut written = Row::new();

        for field in self.schema.fields() {
            if field.is_read_only() || field.is_primary_key() {
                continue;
            }
            let Some(value) = present(&row, field.name()) else {
                continue;
            };

            let (bound, normalized) = checked(field, value.clone())?;
            params.push(bound);
            assignments.push(format!(
                "{} = {}",
                dialect.quote_identifier(field.name()),
                dialect.placeholder(params.len())
            ));
            written.insert(field.name().to_string(), normalized);
        }

        if assignments.is_empty() {
            return Ok(row);
        }

        params.push(pk_bound);
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = {}",
            self.quoted_table(),
            assignments.join(", "),
            dialect.quote_identifier(pk.name()),
            dialect.placeholder(params.len())
        );
        self.executor.execute(&Statement::new(sql, params)).await?;

        let mut updated = row;
        updated.extend(written);
        updated.insert(pk.name().to_string(), pk_normalized);
        Ok(updated)
    }

    /// Delete the record identified by the primary key of `row`.
    ///
    /// Returns `false` without touching the database when the row carries no
    /// key value.
    pub async fn delete(&self, row: &Row) -> Result<bool, StoreError> {
        let dialect = self.dialect();
        let pk = self.require_primary_key()?;
        let Some(pk_value) = present(row, pk.name()) else {
            return Ok(false);
        };

        let (bound, _) = checked(pk, pk_value.clone())?;
        let sql = format!(
            "DELETE FROM {} WHERE {} = {}",
            self.quoted_table(),
            dialect.quote_identifier(pk.name()),
            dialect.placeholder(1)
        );
        let outcome = self.executor.execute(&Statement::new(sql, vec![bound])).await?;

        Ok(outcome.rows_affected > 0)
    }

    /// Update when the row carries a non-blank primary key value, create otherwise
    pub async fn save(&self, row: Row) -> Result<Row, StoreError> {
        let has_key = self
            .schema
            .primary_key()
            .and_then(|pk| row.get(pk.name()))
            .is_some_and(|value| !is_blank(value));

        if has_key {
            self.update(row).await
        } else {
            self.create(row).await
        }
    }
}

fn present<'r>(row: &'r Row, name: &str) -> Option<&'r Value> {
    row.get(name).filter(|value| !value.is_null())
}

/// Validate `value` for `field`, returning its bind parameter and normalized form
fn checked(field: &FieldDescriptor, value: Value) -> Result<(SqlValue, Value), StoreError> {
    match field.normalized(&value) {
        Some(normalized) => Ok((to_sql_value(field.kind(), &normalized), normalized)),
        None => Err(StoreError::InvalidValue {
            field: field.name().to_string(),
            value,
        }),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blank_keys() {
        assert!(is_blank(&Value::Null));
        assert!(is_blank(&json!("")));
        assert!(is_blank(&json!(0)));
        assert!(is_blank(&json!("0")));
        assert!(!is_blank(&json!(5)));
        assert!(!is_blank(&json!("abc")));
    }

    #[test]
    fn test_checked_normalizes_and_binds() {
        let field = FieldDescriptor::bool("active");
        assert_eq!(
            checked(&field, json!(true)).unwrap(),
            (SqlValue::Boolean(true), json!(1))
        );
        assert!(matches!(
            checked(&field, json!("yes")),
            Err(StoreError::InvalidValue { field, .. }) if field == "active"
        ));
    }
}
