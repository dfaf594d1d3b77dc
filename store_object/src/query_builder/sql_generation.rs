//! SQL rendering
//!
//! Turns validated query trees and list settings into SQL text plus an
//! ordered list of bind parameters. Identifiers are quoted by the dialect;
//! literal values only ever appear as placeholders.

use crate::dialect::Dialect;
use crate::query_builder::filter::{Operand, QueryCondition, QueryFilter, QueryOperator};
use crate::query_builder::ordering::SortOrder;
use crate::query_builder::pagination::Pagination;
use crate::query_builder::validator::ValidatedQuery;
use serde::Serialize;
use serde_json::Value;
use type_mapping::{plain_text, to_sql_value, SqlValue, TableSchema};

/// SQL text with its bind parameters in placeholder order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, params: Vec<SqlValue>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

pub struct SqlGenerator<'a> {
    schema: &'a TableSchema,
    dialect: Dialect,
}

impl<'a> SqlGenerator<'a> {
    pub fn new(schema: &'a TableSchema, dialect: Dialect) -> Self {
        Self { schema, dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn quote(&self, identifier: &str) -> String {
        self.dialect.quote_identifier(identifier)
    }

    /// Build WHERE clause, empty when the query renders to nothing
    pub fn build_where_clause(
        &self,
        query: Option<&ValidatedQuery>,
        params: &mut Vec<SqlValue>,
    ) -> String {
        let Some(query) = query else {
            return String::new();
        };

        let conditions = self.render_filter(query.root(), params);
        if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions)
        }
    }

    /// Render a list node: children joined by the combinator and wrapped in
    /// parentheses. Empty children are dropped; a list with no surviving
    /// children renders to the empty string.
    pub fn render_filter(&self, filter: &QueryFilter, params: &mut Vec<SqlValue>) -> String {
        match filter {
            QueryFilter::Condition(condition) => self.render_condition(condition, params),
            QueryFilter::Group { operator, filters } => {
                let separator = format!(" {} ", operator.to_sql());
                let parts = filters
                    .iter()
                    .map(|child| self.render_filter(child, params))
                    .filter(|part| !part.is_empty())
                    .collect::<Vec<_>>();

                if parts.is_empty() {
                    String::new()
                } else {
                    format!("({})", parts.join(&separator))
                }
            }
        }
    }

    fn render_condition(&self, condition: &QueryCondition, params: &mut Vec<SqlValue>) -> String {
        let field = self.quote(&condition.field);
        let textual = self
            .schema
            .field(&condition.field)
            .is_some_and(|descriptor| descriptor.kind().is_textual());

        // Postgres refuses to compare non-text columns with '' or LIKE patterns
        let strict = self.dialect == Dialect::Postgresql && !textual;

        let sql = match (condition.operator, &condition.operand) {
            (QueryOperator::Empty, _) if strict => format!("{} IS NULL", field),
            (QueryOperator::Empty, _) => format!("{field} IS NULL OR {field} = ''"),
            (QueryOperator::NotEmpty, _) if strict => format!("{} IS NOT NULL", field),
            (QueryOperator::NotEmpty, _) => {
                format!("{field} IS NOT NULL AND {field} != ''")
            }

            (QueryOperator::Contains | QueryOperator::NotContains, operand) => {
                let keyword = if condition.operator == QueryOperator::Contains {
                    "LIKE"
                } else {
                    "NOT LIKE"
                };
                let subject = if strict {
                    format!("CAST({} AS TEXT)", field)
                } else {
                    field.clone()
                };
                match operand {
                    Operand::Value(value) => {
                        let param =
                            self.push_param(params, SqlValue::Text(format!("%{}%", plain_text(value))));
                        format!("{} {} {}", subject, keyword, param)
                    }
                    Operand::Reference(reference) => format!(
                        "{} {} CONCAT('%', {}, '%')",
                        subject,
                        keyword,
                        self.quote(reference)
                    ),
                    Operand::None => "1=0".to_string(),
                }
            }

            (QueryOperator::In | QueryOperator::NotIn, operand) => {
                let negated = condition.operator == QueryOperator::NotIn;
                let keyword = if negated { "NOT IN" } else { "IN" };
                match operand {
                    Operand::Value(Value::Array(items)) if items.is_empty() => {
                        // An empty IN list matches no row, an empty NOT IN list every row
                        if negated { "1=1" } else { "1=0" }.to_string()
                    }
                    Operand::Value(Value::Array(items)) => {
                        let placeholders = items
                            .iter()
                            .map(|item| self.bind_value(&condition.field, item, params))
                            .collect::<Vec<_>>()
                            .join(", ");
                        format!("{} {} ({})", field, keyword, placeholders)
                    }
                    Operand::Value(value) => {
                        let param = self.bind_value(&condition.field, value, params);
                        format!("{} {} ({})", field, keyword, param)
                    }
                    Operand::Reference(reference) => {
                        format!("{} {} ({})", field, keyword, self.quote(reference))
                    }
                    Operand::None => "1=0".to_string(),
                }
            }

            (operator, operand) => {
                let symbol = operator.comparison_sql().unwrap_or("=");
                match operand {
                    Operand::Value(value) => {
                        let param = self.bind_value(&condition.field, value, params);
                        format!("{} {} {}", field, symbol, param)
                    }
                    Operand::Reference(reference) => {
                        format!("{} {} {}", field, symbol, self.quote(reference))
                    }
                    // Unreachable for validated trees
                    Operand::None => "1=0".to_string(),
                }
            }
        };

        format!("({})", sql)
    }

    /// Convert a literal by the kind of `field` and bind it
    fn bind_value(&self, field: &str, value: &Value, params: &mut Vec<SqlValue>) -> String {
        let bound = match self.schema.field(field) {
            Some(descriptor) => to_sql_value(descriptor.kind(), value),
            None => SqlValue::Text(plain_text(value)),
        };
        self.push_param(params, bound)
    }

    fn push_param(&self, params: &mut Vec<SqlValue>, value: SqlValue) -> String {
        params.push(value);
        self.dialect.placeholder(params.len())
    }

    /// Build SELECT list, `*` when no fields are given
    pub fn build_select_clause(&self, fields: &[String]) -> String {
        if fields.is_empty() {
            "*".to_string()
        } else {
            fields
                .iter()
                .map(|field| self.quote(field))
                .collect::<Vec<_>>()
                .join(", ")
        }
    }

    /// Build ORDER BY clause
    pub fn build_order_clause(&self, order_by: &[(String, SortOrder)]) -> String {
        if order_by.is_empty() {
            return String::new();
        }

        let order_parts = order_by
            .iter()
            .map(|(field, order)| format!("{} {}", self.quote(field), order.to_sql()))
            .collect::<Vec<_>>()
            .join(", ");

        format!("ORDER BY {}", order_parts)
    }

    /// Build LIMIT/OFFSET clause
    pub fn build_limit_clause(pagination: &Pagination) -> String {
        pagination.to_sql()
    }
}
