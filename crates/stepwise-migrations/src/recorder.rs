//! Durable storage of applied migrations.
//!
//! A [`MigrationRecord`] is written after a step's forward action succeeds
//! and deleted after its backward action succeeds. Records are never updated
//! in place. The order of records is the order of their `id`s, which are
//! assigned on insert and never reused.

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Serialize;
use stepwise_core::settings::{is_identifier, DEFAULT_MIGRATIONS_TABLE};
use stepwise_core::{StepwiseError, StepwiseResult};
use stepwise_db_backends::{DatabaseBackend, Row, Value};
use tokio::sync::Mutex;

/// One applied migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationRecord {
    /// Insertion sequence number; the ordering key.
    pub id: i64,
    /// The name of the step that produced this record.
    pub name: String,
    /// When the record was written.
    pub created_at: Option<NaiveDateTime>,
    /// Bookkeeping only; records are never updated.
    pub updated_at: Option<NaiveDateTime>,
}

impl MigrationRecord {
    fn from_row(row: &Row) -> StepwiseResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

/// Ordered storage for [`MigrationRecord`]s.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Creates the backing storage if it does not exist. Idempotent.
    async fn ensure_table(&self) -> StepwiseResult<()>;

    /// Returns all records ordered by `id` ascending.
    async fn list_ordered(&self) -> StepwiseResult<Vec<MigrationRecord>>;

    /// Appends a record for `name` and returns it with its assigned id.
    async fn insert(&self, name: &str) -> StepwiseResult<MigrationRecord>;

    /// Deletes `record`.
    ///
    /// Returns [`StepwiseError::DoesNotExist`] if no record has that id.
    async fn delete(&self, record: &MigrationRecord) -> StepwiseResult<()>;
}

// ── DatabaseRecordStore ──────────────────────────────────────────────────

/// Stores records in a table of the migrated database.
///
/// The table has the layout
/// `{id INTEGER PRIMARY KEY AUTOINCREMENT, name, created_at, updated_at}`.
/// `AUTOINCREMENT` keeps ids from being reused after the last record is
/// deleted.
pub struct DatabaseRecordStore {
    backend: Arc<dyn DatabaseBackend>,
    table: String,
}

impl DatabaseRecordStore {
    /// Creates a store using the default `schema_migrations` table.
    pub fn new(backend: Arc<dyn DatabaseBackend>) -> Self {
        Self {
            backend,
            table: DEFAULT_MIGRATIONS_TABLE.to_string(),
        }
    }

    /// Creates a store using a custom table name.
    ///
    /// # Errors
    ///
    /// Returns [`StepwiseError::ConfigurationError`] if `table` is not a plain
    /// SQL identifier.
    pub fn with_table(
        backend: Arc<dyn DatabaseBackend>,
        table: impl Into<String>,
    ) -> StepwiseResult<Self> {
        let table = table.into();
        if !is_identifier(&table) {
            return Err(StepwiseError::ConfigurationError(format!(
                "Invalid migrations table name '{table}'"
            )));
        }
        Ok(Self { backend, table })
    }

    /// Returns the table name.
    pub fn table(&self) -> &str {
        &self.table
    }
}

impl std::fmt::Debug for DatabaseRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseRecordStore")
            .field("vendor", &self.backend.vendor())
            .field("table", &self.table)
            .finish()
    }
}

#[async_trait::async_trait]
impl RecordStore for DatabaseRecordStore {
    async fn ensure_table(&self) -> StepwiseResult<()> {
        if self.backend.has_table(&self.table).await? {
            return Ok(());
        }
        tracing::info!(table = %self.table, "creating migration record table");
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS \"{}\" (\
             id INTEGER PRIMARY KEY AUTOINCREMENT, \
             name TEXT NOT NULL, \
             created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP, \
             updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP)",
            self.table
        );
        self.backend.execute(&sql, &[]).await?;
        Ok(())
    }

    async fn list_ordered(&self) -> StepwiseResult<Vec<MigrationRecord>> {
        let sql = format!(
            "SELECT id, name, created_at, updated_at FROM \"{}\" ORDER BY id ASC",
            self.table
        );
        let rows = self.backend.query(&sql, &[]).await?;
        rows.iter().map(MigrationRecord::from_row).collect()
    }

    async fn insert(&self, name: &str) -> StepwiseResult<MigrationRecord> {
        let sql = format!("INSERT INTO \"{}\" (name) VALUES (?)", self.table);
        let id = self
            .backend
            .insert_returning_id(&sql, &[Value::from(name)])
            .await?;
        let sql = format!(
            "SELECT id, name, created_at, updated_at FROM \"{}\" WHERE id = ?",
            self.table
        );
        let row = self.backend.query_one(&sql, &[Value::Int(id)]).await?;
        MigrationRecord::from_row(&row)
    }

    async fn delete(&self, record: &MigrationRecord) -> StepwiseResult<()> {
        let sql = format!("DELETE FROM \"{}\" WHERE id = ?", self.table);
        let affected = self
            .backend
            .execute(&sql, &[Value::Int(record.id)])
            .await?;
        if affected == 0 {
            return Err(StepwiseError::DoesNotExist(format!(
                "Migration record {} ('{}')",
                record.id, record.name
            )));
        }
        Ok(())
    }
}

// ── InMemoryRecordStore ──────────────────────────────────────────────────

#[derive(Debug, Default)]
struct MemoryState {
    ready: bool,
    last_id: i64,
    records: Vec<MigrationRecord>,
}

/// A process-local record store for tests and dry runs.
///
/// Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordStore {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryRecordStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with records for `names`, in order.
    pub fn with_records<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = MemoryState {
            ready: true,
            ..MemoryState::default()
        };
        for name in names {
            state.last_id += 1;
            state.records.push(MigrationRecord {
                id: state.last_id,
                name: name.into(),
                created_at: None,
                updated_at: None,
            });
        }
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Returns the names of all records, in order.
    pub async fn names(&self) -> Vec<String> {
        let state = self.state.lock().await;
        state.records.iter().map(|r| r.name.clone()).collect()
    }
}

#[async_trait::async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn ensure_table(&self) -> StepwiseResult<()> {
        self.state.lock().await.ready = true;
        Ok(())
    }

    async fn list_ordered(&self) -> StepwiseResult<Vec<MigrationRecord>> {
        let state = self.state.lock().await;
        if !state.ready {
            return Err(StepwiseError::DatabaseError(
                "migration record storage has not been created".to_string(),
            ));
        }
        Ok(state.records.clone())
    }

    async fn insert(&self, name: &str) -> StepwiseResult<MigrationRecord> {
        let mut state = self.state.lock().await;
        state.last_id += 1;
        let now = chrono::Utc::now().naive_utc();
        let record = MigrationRecord {
            id: state.last_id,
            name: name.to_string(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        state.records.push(record.clone());
        Ok(record)
    }

    async fn delete(&self, record: &MigrationRecord) -> StepwiseResult<()> {
        let mut state = self.state.lock().await;
        let position = state
            .records
            .iter()
            .position(|r| r.id == record.id)
            .ok_or_else(|| {
                StepwiseError::DoesNotExist(format!(
                    "Migration record {} ('{}')",
                    record.id, record.name
                ))
            })?;
        state.records.remove(position);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepwise_db_backends::SqliteBackend;

    fn sqlite_store() -> DatabaseRecordStore {
        DatabaseRecordStore::new(Arc::new(SqliteBackend::memory().unwrap()))
    }

    // ── DatabaseRecordStore ─────────────────────────────────────────

    #[tokio::test]
    async fn test_ensure_table_is_idempotent() {
        let store = sqlite_store();
        store.ensure_table().await.unwrap();
        store.ensure_table().await.unwrap();
        assert!(store.list_ordered().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_and_list_in_order() {
        let store = sqlite_store();
        store.ensure_table().await.unwrap();
        let a = store.insert("createUsersTable").await.unwrap();
        let b = store.insert("addAvatarToUsers").await.unwrap();
        assert!(b.id > a.id);
        assert!(a.created_at.is_some());

        let names: Vec<String> = store
            .list_ordered()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["createUsersTable", "addAvatarToUsers"]);
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_delete() {
        let store = sqlite_store();
        store.ensure_table().await.unwrap();
        store.insert("a").await.unwrap();
        let b = store.insert("b").await.unwrap();
        store.delete(&b).await.unwrap();
        let c = store.insert("c").await.unwrap();
        assert!(c.id > b.id);
    }

    #[tokio::test]
    async fn test_delete_missing_record() {
        let store = sqlite_store();
        store.ensure_table().await.unwrap();
        let a = store.insert("a").await.unwrap();
        store.delete(&a).await.unwrap();
        assert!(matches!(
            store.delete(&a).await,
            Err(StepwiseError::DoesNotExist(_))
        ));
    }

    #[tokio::test]
    async fn test_custom_table_name() {
        let backend: Arc<dyn DatabaseBackend> = Arc::new(SqliteBackend::memory().unwrap());
        let store = DatabaseRecordStore::with_table(backend.clone(), "applied_steps").unwrap();
        store.ensure_table().await.unwrap();
        assert!(backend.has_table("applied_steps").await.unwrap());
        assert!(!backend.has_table(DEFAULT_MIGRATIONS_TABLE).await.unwrap());
        assert_eq!(store.table(), "applied_steps");
    }

    #[test]
    fn test_invalid_table_name_rejected() {
        let backend: Arc<dyn DatabaseBackend> = Arc::new(SqliteBackend::memory().unwrap());
        let result = DatabaseRecordStore::with_table(backend, "bad name; DROP");
        assert!(matches!(result, Err(StepwiseError::ConfigurationError(_))));
    }

    // ── InMemoryRecordStore ─────────────────────────────────────────

    #[tokio::test]
    async fn test_memory_store_requires_ensure() {
        let store = InMemoryRecordStore::new();
        assert!(store.list_ordered().await.is_err());
        store.ensure_table().await.unwrap();
        assert!(store.list_ordered().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_memory_store_clones_share_state() {
        let store = InMemoryRecordStore::new();
        store.ensure_table().await.unwrap();
        let clone = store.clone();
        clone.insert("a").await.unwrap();
        assert_eq!(store.names().await, vec!["a"]);
    }

    #[tokio::test]
    async fn test_memory_store_with_records() {
        let store = InMemoryRecordStore::with_records(["a", "b"]);
        let records = store.list_ordered().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].id, 2);
        let c = store.insert("c").await.unwrap();
        assert_eq!(c.id, 3);
        store.delete(&records[0]).await.unwrap();
        assert_eq!(store.names().await, vec!["b", "c"]);
    }
}
