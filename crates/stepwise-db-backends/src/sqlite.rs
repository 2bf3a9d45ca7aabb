//! SQLite database backend using `rusqlite`.
//!
//! This module provides the [`SqliteBackend`] which implements the
//! [`DatabaseBackend`](crate::base::DatabaseBackend) trait using `rusqlite`
//! wrapped in `tokio::task::spawn_blocking` for async compatibility.
//!
//! Features:
//! - WAL mode enabled by default for file databases
//! - In-memory database support via `:memory:` path (great for testing)
//! - Simple `Mutex`-based concurrency control over a single connection, so
//!   `BEGIN`/`COMMIT` issued through the backend apply to the statements
//!   that follow them

use std::path::PathBuf;
use std::sync::Arc;

use stepwise_core::StepwiseError;
use tokio::sync::Mutex;

use crate::base::{DatabaseBackend, DatabaseConfig};
use crate::row::Row;
use crate::value::Value;

/// A SQLite database backend.
///
/// Uses `rusqlite` for database access with a `Mutex`-based concurrency
/// model. All operations are run via `tokio::task::spawn_blocking` to
/// avoid blocking the async runtime.
pub struct SqliteBackend {
    /// The path to the database file (or ":memory:").
    path: PathBuf,
    /// The connection, guarded by an async mutex.
    conn: Arc<Mutex<rusqlite::Connection>>,
}

impl SqliteBackend {
    /// Opens a new SQLite database at the given path with default options.
    ///
    /// If the path is `:memory:`, an in-memory database is created.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open(path: impl Into<String>) -> Result<Self, StepwiseError> {
        Self::open_with_config(&DatabaseConfig::sqlite_file(path))
    }

    /// Opens a SQLite database described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the pragmas fail.
    pub fn open_with_config(config: &DatabaseConfig) -> Result<Self, StepwiseError> {
        let conn = match config.path() {
            None => rusqlite::Connection::open_in_memory(),
            Some(ref path) => rusqlite::Connection::open(path),
        }
        .map_err(|e| StepwiseError::OperationalError(format!("SQLite open failed: {e}")))?;

        conn.execute_batch(&config.pragmas()).map_err(|e| {
            StepwiseError::OperationalError(format!("Failed to set pragmas: {e}"))
        })?;

        tracing::debug!(database = %config.name, "opened sqlite database");

        Ok(Self {
            path: PathBuf::from(&config.name),
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens an in-memory database (convenience constructor).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created.
    pub fn memory() -> Result<Self, StepwiseError> {
        Self::open_with_config(&DatabaseConfig::sqlite_memory())
    }

    /// Returns the database file path.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Runs `f` against the connection on the blocking thread pool.
    async fn with_conn<F, T>(&self, f: F) -> Result<T, StepwiseError>
    where
        F: FnOnce(&rusqlite::Connection) -> Result<T, StepwiseError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            f(&conn)
        })
        .await
        .map_err(|e| StepwiseError::DatabaseError(format!("Task join error: {e}")))?
    }

    /// Binds `Value`s to a `rusqlite` statement.
    fn bind_params(
        stmt: &mut rusqlite::Statement<'_>,
        params: &[Value],
    ) -> Result<(), StepwiseError> {
        for (i, param) in params.iter().enumerate() {
            let idx = i + 1;
            match param {
                Value::Null => stmt.raw_bind_parameter(idx, rusqlite::types::Null),
                Value::Bool(b) => stmt.raw_bind_parameter(idx, b),
                Value::Int(v) => stmt.raw_bind_parameter(idx, v),
                Value::Float(v) => stmt.raw_bind_parameter(idx, v),
                Value::String(s) => stmt.raw_bind_parameter(idx, s.as_str()),
                Value::Bytes(b) => stmt.raw_bind_parameter(idx, b.as_slice()),
                Value::DateTime(dt) => stmt.raw_bind_parameter(
                    idx,
                    dt.format("%Y-%m-%d %H:%M:%S").to_string().as_str(),
                ),
            }
            .map_err(|e| StepwiseError::DatabaseError(format!("Bind error: {e}")))?;
        }
        Ok(())
    }

    /// Converts a `rusqlite::Row` to our generic `Row`.
    fn convert_row(sqlite_row: &rusqlite::Row<'_>, column_names: &[String]) -> Row {
        let values: Vec<Value> = (0..column_names.len())
            .map(|i| {
                let val_ref = sqlite_row
                    .get_ref(i)
                    .unwrap_or(rusqlite::types::ValueRef::Null);
                match val_ref {
                    rusqlite::types::ValueRef::Null => Value::Null,
                    rusqlite::types::ValueRef::Integer(v) => Value::Int(v),
                    rusqlite::types::ValueRef::Real(v) => Value::Float(v),
                    rusqlite::types::ValueRef::Text(b) => {
                        Value::String(String::from_utf8_lossy(b).to_string())
                    }
                    rusqlite::types::ValueRef::Blob(b) => Value::Bytes(b.to_vec()),
                }
            })
            .collect();

        Row::new(column_names.to_vec(), values)
    }

    fn run_statement(
        conn: &rusqlite::Connection,
        sql: &str,
        params: &[Value],
    ) -> Result<usize, StepwiseError> {
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| StepwiseError::DatabaseError(format!("{e}")))?;
        Self::bind_params(&mut stmt, params)?;
        stmt.raw_execute()
            .map_err(|e| StepwiseError::DatabaseError(format!("{e}")))
    }
}

#[async_trait::async_trait]
impl DatabaseBackend for SqliteBackend {
    fn vendor(&self) -> &str {
        "sqlite"
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> Result<u64, StepwiseError> {
        tracing::debug!(sql, "execute");
        let sql = sql.to_string();
        let params = params.to_vec();

        self.with_conn(move |conn| {
            let count = Self::run_statement(conn, &sql, &params)?;
            Ok(count as u64)
        })
        .await
    }

    async fn execute_batch(&self, sql: &str) -> Result<(), StepwiseError> {
        tracing::debug!(sql, "execute batch");
        let sql = sql.to_string();

        self.with_conn(move |conn| {
            conn.execute_batch(&sql)
                .map_err(|e| StepwiseError::DatabaseError(format!("{e}")))
        })
        .await
    }

    async fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, StepwiseError> {
        let sql = sql.to_string();
        let params = params.to_vec();

        self.with_conn(move |conn| {
            let mut stmt = conn
                .prepare(&sql)
                .map_err(|e| StepwiseError::DatabaseError(format!("{e}")))?;

            let column_names: Vec<String> = stmt
                .column_names()
                .into_iter()
                .map(String::from)
                .collect();

            Self::bind_params(&mut stmt, &params)?;

            let mut raw_rows = stmt.raw_query();
            let mut rows = Vec::new();
            while let Some(row) = raw_rows
                .next()
                .map_err(|e| StepwiseError::DatabaseError(format!("{e}")))?
            {
                rows.push(Self::convert_row(row, &column_names));
            }

            Ok(rows)
        })
        .await
    }

    async fn insert_returning_id(&self, sql: &str, params: &[Value]) -> Result<i64, StepwiseError> {
        tracing::debug!(sql, "insert");
        let sql = sql.to_string();
        let params = params.to_vec();

        self.with_conn(move |conn| {
            Self::run_statement(conn, &sql, &params)?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    async fn begin_transaction(&self) -> Result<(), StepwiseError> {
        self.execute("BEGIN", &[]).await?;
        Ok(())
    }

    async fn commit(&self) -> Result<(), StepwiseError> {
        self.execute("COMMIT", &[]).await?;
        Ok(())
    }

    async fn rollback(&self) -> Result<(), StepwiseError> {
        self.execute("ROLLBACK", &[]).await?;
        Ok(())
    }

    async fn has_table(&self, table: &str) -> Result<bool, StepwiseError> {
        let row = self
            .query_one(
                "SELECT COUNT(*) AS n FROM sqlite_master WHERE type = 'table' AND name = ? COLLATE NOCASE",
                &[Value::from(table)],
            )
            .await?;
        Ok(row.get::<i64>("n")? > 0)
    }

    async fn has_column(&self, table: &str, column: &str) -> Result<bool, StepwiseError> {
        let row = self
            .query_one(
                "SELECT COUNT(*) AS n FROM pragma_table_info(?) WHERE name = ? COLLATE NOCASE",
                &[Value::from(table), Value::from(column)],
            )
            .await?;
        Ok(row.get::<i64>("n")? > 0)
    }
}
