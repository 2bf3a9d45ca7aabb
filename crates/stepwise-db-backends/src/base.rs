//! Base database backend trait and connection configuration.
//!
//! This module defines the [`DatabaseBackend`] trait that all backend
//! implementations must satisfy. The migration engine, the record store, and
//! every migration action talk to the database only through this trait.

use std::path::PathBuf;

use stepwise_core::{DatabaseSettings, StepwiseError};

use crate::row::Row;
use crate::value::Value;

/// The core trait for database backends.
///
/// All methods are async because database operations are I/O-bound. Backends
/// that use synchronous drivers (like `rusqlite`) wrap operations in
/// `spawn_blocking` to keep the async interface.
#[async_trait::async_trait]
pub trait DatabaseBackend: Send + Sync {
    /// Returns the vendor name (e.g. "sqlite").
    fn vendor(&self) -> &str;

    /// Executes a SQL statement that does not return rows.
    ///
    /// Returns the number of rows affected.
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<u64, StepwiseError>;

    /// Executes one or more `;`-separated statements without parameters.
    async fn execute_batch(&self, sql: &str) -> Result<(), StepwiseError>;

    /// Executes a SQL query and returns all result rows.
    async fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, StepwiseError>;

    /// Executes a SQL query and returns exactly one row.
    ///
    /// Returns [`StepwiseError::DoesNotExist`] if no rows are returned, or
    /// [`StepwiseError::MultipleObjectsReturned`] if more than one row is returned.
    async fn query_one(&self, sql: &str, params: &[Value]) -> Result<Row, StepwiseError> {
        let mut rows = self.query(sql, params).await?;
        match rows.len() {
            0 => Err(StepwiseError::DoesNotExist("No rows returned".to_string())),
            1 => Ok(rows.remove(0)),
            n => Err(StepwiseError::MultipleObjectsReturned(format!(
                "Expected 1 row, got {n}"
            ))),
        }
    }

    /// Executes an INSERT and returns the id of the inserted row.
    async fn insert_returning_id(&self, sql: &str, params: &[Value]) -> Result<i64, StepwiseError>;

    /// Begins a new database transaction.
    async fn begin_transaction(&self) -> Result<(), StepwiseError>;

    /// Commits the current transaction.
    async fn commit(&self) -> Result<(), StepwiseError>;

    /// Rolls back the current transaction.
    async fn rollback(&self) -> Result<(), StepwiseError>;

    /// Returns `true` if a table with the given name exists.
    async fn has_table(&self, table: &str) -> Result<bool, StepwiseError>;

    /// Returns `true` if `table` exists and has a column named `column`.
    async fn has_column(&self, table: &str, column: &str) -> Result<bool, StepwiseError>;
}

/// Configuration for connecting to a database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// The database file path, or `:memory:`.
    pub name: String,
    /// Whether foreign key enforcement is turned on.
    pub foreign_keys: bool,
    /// Whether write-ahead logging is enabled for file databases.
    pub wal: bool,
}

impl DatabaseConfig {
    /// Creates a configuration for an in-memory SQLite database.
    pub fn sqlite_memory() -> Self {
        Self::sqlite_file(":memory:")
    }

    /// Creates a configuration for a SQLite file database.
    pub fn sqlite_file(path: impl Into<String>) -> Self {
        Self {
            name: path.into(),
            foreign_keys: true,
            wal: true,
        }
    }

    /// Creates a configuration from the `database` section of the settings.
    pub fn from_settings(settings: &DatabaseSettings) -> Self {
        Self::sqlite_file(settings.name.clone())
    }

    /// Returns `true` if this configuration opens an in-memory database.
    pub fn is_memory(&self) -> bool {
        self.name == ":memory:"
    }

    /// Returns the file path, or `None` for in-memory databases.
    pub fn path(&self) -> Option<PathBuf> {
        (!self.is_memory()).then(|| PathBuf::from(&self.name))
    }

    /// Returns the pragmas applied when a connection is opened.
    pub fn pragmas(&self) -> String {
        let mut pragmas = String::new();
        if self.wal && !self.is_memory() {
            pragmas.push_str("PRAGMA journal_mode=WAL;");
        }
        if self.foreign_keys {
            pragmas.push_str("PRAGMA foreign_keys=ON;");
        }
        pragmas
    }
}
