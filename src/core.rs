//! Core QueryHaus functionality
//!
//! This module contains the coordinator that owns the connection pool and the
//! registry of table schemas, and hands out table stores bound to both.

use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use store_object::{PgExecutor, TableStore};
use type_mapping::TableSchema;

use crate::errors::QueryHausError;
use config::{AppConfig, DatabaseConfig, QueryConfig};

/// Main QueryHaus coordinator that manages the database connection and table schemas
pub struct QueryHaus {
    pool: PgPool,
    query: QueryConfig,
    tables: HashMap<String, Arc<TableSchema>>,
}

impl QueryHaus {
    /// Create new QueryHaus with database connection
    pub async fn new(config: &AppConfig) -> Result<Self, QueryHausError> {
        let pool = Self::pool_options(&config.database)
            .connect(&config.database.connection_string())
            .await?;

        debug_log!(
            "Connected to {}:{}/{}",
            config.database.host,
            config.database.port,
            config.database.database
        );

        Ok(Self::from_pool(pool, config.query.clone()))
    }

    /// Load configuration from the environment and connect
    pub async fn from_env() -> Result<Self, QueryHausError> {
        let config = AppConfig::load()?;
        Self::new(&config).await
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: PgPool, query: QueryConfig) -> Self {
        Self {
            pool,
            query,
            tables: HashMap::new(),
        }
    }

    fn pool_options(config: &DatabaseConfig) -> sqlx::postgres::PgPoolOptions {
        let mut pool_options = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds));

        // Set max lifetime if specified
        if config.max_lifetime_seconds > 0 {
            pool_options =
                pool_options.max_lifetime(Duration::from_secs(config.max_lifetime_seconds));
        }

        pool_options
    }

    /// Get database pool reference
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Executor over the shared pool, honoring the `[query]` settings
    pub fn executor(&self) -> PgExecutor {
        PgExecutor::new(self.pool.clone()).with_statement_logging(self.query.log_statements)
    }

    /// Register a table schema under its table name
    pub fn register_table(&mut self, schema: TableSchema) -> Result<Arc<TableSchema>, QueryHausError> {
        let name = schema.table_name().to_string();
        if self.tables.contains_key(&name) {
            return Err(QueryHausError::TableAlreadyRegistered(name));
        }

        let schema = Arc::new(schema);
        self.tables.insert(name.clone(), Arc::clone(&schema));
        debug_log!("Registered table '{}'", name);
        Ok(schema)
    }

    /// Get a registered schema by table name
    pub fn schema(&self, name: &str) -> Result<Arc<TableSchema>, QueryHausError> {
        self.tables
            .get(name)
            .cloned()
            .ok_or_else(|| QueryHausError::TableNotFound(name.to_string()))
    }

    /// Store for a registered table
    pub fn table(&self, name: &str) -> Result<TableStore<PgExecutor>, QueryHausError> {
        trace_log!("Opening store for table '{}'", name);
        Ok(TableStore::new(self.schema(name)?, self.executor()))
    }

    /// List all registered table names
    pub fn list_tables(&self) -> Vec<&String> {
        self.tables.keys().collect()
    }

    /// Remove a table schema by name
    pub fn unregister_table(&mut self, name: &str) -> Result<(), QueryHausError> {
        self.tables
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| QueryHausError::TableNotFound(name.to_string()))
    }

    /// Check database connection health
    pub async fn health_check(&self) -> Result<(), QueryHausError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
