//! Table schemas
//!
//! A `TableSchema` is the fixed registry of field descriptors for one table.
//! It is assembled once through [`TableSchemaBuilder`] and is read-only
//! afterwards; lookups return `Option` instead of relying on implicit absence.

use crate::descriptor::FieldDescriptor;
use crate::serialize::coerce_loaded_value;
use crate::validate::{ValidatedFieldName, ValidatedTableName, ValidationError};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(#[from] ValidationError),

    #[error("Field '{field}' is declared more than once in table '{table}'")]
    DuplicateField { table: String, field: String },

    #[error("Table '{table}' declares more than one primary key: '{first}' and '{second}'")]
    MultiplePrimaryKeys {
        table: String,
        first: String,
        second: String,
    },

    #[error("Default value {value} is not valid for field '{field}'")]
    InvalidDefault { field: String, value: Value },
}

/// Field summary returned by [`TableSchema::describe`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSummary {
    pub primary: bool,
    pub readonly: bool,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub options: Vec<Value>,
    pub required: bool,
    pub default: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct TableSchema {
    table: ValidatedTableName,
    fields: Vec<FieldDescriptor>,
    index: HashMap<String, usize>,
    primary_key: Option<usize>,
}

impl TableSchema {
    pub fn builder(table: impl Into<String>) -> TableSchemaBuilder {
        TableSchemaBuilder {
            table: table.into(),
            fields: Vec::new(),
        }
    }

    pub fn table_name(&self) -> &str {
        self.table.as_str()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.index.get(name).map(|&position| &self.fields[position])
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Descriptors in declaration order
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter()
    }

    pub fn primary_key(&self) -> Option<&FieldDescriptor> {
        self.primary_key.map(|position| &self.fields[position])
    }

    pub fn auto_increment_field(&self) -> Option<&FieldDescriptor> {
        self.primary_key().filter(|field| field.is_auto_increment())
    }

    /// Keep only the names that exist in this schema, preserving order
    pub fn filter_existing<I, S>(&self, names: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .filter(|name| self.has_field(name.as_ref()))
            .map(|name| name.as_ref().to_string())
            .collect()
    }

    /// Coerce every known column of a loaded row into its declared kind.
    /// Unknown columns are passed through untouched.
    pub fn coerce_row(&self, row: Map<String, Value>) -> Map<String, Value> {
        row.into_iter()
            .map(|(column, value)| {
                let value = match self.field(&column) {
                    Some(field) => coerce_loaded_value(field.kind(), value),
                    None => value,
                };
                (column, value)
            })
            .collect()
    }

    pub fn describe(&self) -> IndexMap<String, FieldSummary> {
        self.fields
            .iter()
            .map(|field| {
                let summary = FieldSummary {
                    primary: field.is_primary_key(),
                    readonly: field.is_read_only(),
                    kind: field.kind().type_name(),
                    options: field.allowed_options().to_vec(),
                    required: field.is_required(),
                    default: field.default_value().cloned(),
                };
                (field.name().to_string(), summary)
            })
            .collect()
    }
}

/// Builder for [`TableSchema`]
#[derive(Debug, Clone)]
pub struct TableSchemaBuilder {
    table: String,
    fields: Vec<FieldDescriptor>,
}

impl TableSchemaBuilder {
    pub fn field(mut self, descriptor: FieldDescriptor) -> Self {
        self.fields.push(descriptor);
        self
    }

    pub fn fields<I>(mut self, descriptors: I) -> Self
    where
        I: IntoIterator<Item = FieldDescriptor>,
    {
        self.fields.extend(descriptors);
        self
    }

    pub fn build(self) -> Result<TableSchema, SchemaError> {
        let table = ValidatedTableName::new(&self.table)?;
        let mut index = HashMap::with_capacity(self.fields.len());
        let mut primary_key: Option<usize> = None;

        for (position, field) in self.fields.iter().enumerate() {
            ValidatedFieldName::new(field.name())?;

            if index.insert(field.name().to_string(), position).is_some() {
                return Err(SchemaError::DuplicateField {
                    table: self.table,
                    field: field.name().to_string(),
                });
            }

            if field.is_primary_key() {
                if let Some(first) = primary_key {
                    return Err(SchemaError::MultiplePrimaryKeys {
                        table: self.table,
                        first: self.fields[first].name().to_string(),
                        second: field.name().to_string(),
                    });
                }
                primary_key = Some(position);
            }

            if let Some(default) = field.default_value() {
                if field.normalized(default).is_none() {
                    return Err(SchemaError::InvalidDefault {
                        field: field.name().to_string(),
                        value: default.clone(),
                    });
                }
            }
        }

        debug_log!(
            "Built schema for table '{}' with {} fields",
            table,
            self.fields.len()
        );

        Ok(TableSchema {
            table,
            fields: self.fields,
            index,
            primary_key,
        })
    }
}
