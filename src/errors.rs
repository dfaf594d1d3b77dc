//! Error types for the QueryHaus crate

use config::ConfigError;
use store_object::StoreError;
use thiserror::Error;
use type_mapping::SchemaError;

#[derive(Error, Debug)]
pub enum QueryHausError {
    #[error("Database connection error: {0}")]
    DatabaseConnection(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Table not registered: {0}")]
    TableNotFound(String),

    #[error("Table already registered: {0}")]
    TableAlreadyRegistered(String),
}
