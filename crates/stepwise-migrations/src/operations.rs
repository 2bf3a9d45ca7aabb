//! Migration actions.
//!
//! An [`Action`] is one half of a [`MigrationStep`](crate::MigrationStep): the
//! forward change or the explicit backward change. The engine treats actions
//! as opaque; it only calls [`Action::apply`] and reports the outcome.
//!
//! Direct schema operations ([`CreateTable`], [`DropTable`], [`AddColumn`],
//! [`DropColumn`]) check the live schema first and do nothing when the change
//! is already in place. [`RunSql`] executes raw statements, optionally inside
//! a single transaction, and [`FnAction`] wraps arbitrary async logic.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use stepwise_core::{StepwiseError, StepwiseResult};
use stepwise_db_backends::{atomic, DatabaseBackend};

use crate::schema_editor::{self, ColumnDef, IndexDef, TableDef};

/// A boxed future that can be sent across threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A single schema or data change applied against a database backend.
#[async_trait::async_trait]
pub trait Action: Send + Sync {
    /// Applies the change.
    async fn apply(&self, db: &dyn DatabaseBackend) -> StepwiseResult<()>;

    /// Returns a human-readable description, used in logs and `showmigrations`.
    fn describe(&self) -> String;
}

async fn run_statements(db: &dyn DatabaseBackend, statements: &[String]) -> StepwiseResult<()> {
    for sql in statements {
        tracing::debug!(sql = %sql, "executing");
        db.execute_batch(sql).await?;
    }
    Ok(())
}

// ── CreateTable ──────────────────────────────────────────────────────────

/// Creates a table unless it already exists.
#[derive(Debug, Clone)]
pub struct CreateTable {
    /// The table to create.
    pub table: TableDef,
}

#[async_trait::async_trait]
impl Action for CreateTable {
    async fn apply(&self, db: &dyn DatabaseBackend) -> StepwiseResult<()> {
        if db.has_table(&self.table.name).await? {
            tracing::debug!(table = %self.table.name, "table already exists, skipping");
            return Ok(());
        }
        let statements = schema_editor::for_vendor(db.vendor())?.create_table(&self.table);
        run_statements(db, &statements).await
    }

    fn describe(&self) -> String {
        format!("Create table {}", self.table.name)
    }
}

// ── DropTable ────────────────────────────────────────────────────────────

/// Drops a table if it exists.
#[derive(Debug, Clone)]
pub struct DropTable {
    /// The table name.
    pub table: String,
}

#[async_trait::async_trait]
impl Action for DropTable {
    async fn apply(&self, db: &dyn DatabaseBackend) -> StepwiseResult<()> {
        if !db.has_table(&self.table).await? {
            tracing::debug!(table = %self.table, "table does not exist, skipping");
            return Ok(());
        }
        let statements = schema_editor::for_vendor(db.vendor())?.drop_table(&self.table);
        run_statements(db, &statements).await
    }

    fn describe(&self) -> String {
        format!("Drop table {}", self.table)
    }
}

// ── AddColumn ────────────────────────────────────────────────────────────

/// Adds a column unless the table already has it.
#[derive(Debug, Clone)]
pub struct AddColumn {
    /// The table to alter.
    pub table: String,
    /// The column to add.
    pub column: ColumnDef,
}

#[async_trait::async_trait]
impl Action for AddColumn {
    async fn apply(&self, db: &dyn DatabaseBackend) -> StepwiseResult<()> {
        if db.has_column(&self.table, &self.column.name).await? {
            tracing::debug!(
                table = %self.table,
                column = %self.column.name,
                "column already exists, skipping"
            );
            return Ok(());
        }
        let statements =
            schema_editor::for_vendor(db.vendor())?.add_column(&self.table, &self.column);
        run_statements(db, &statements).await
    }

    fn describe(&self) -> String {
        format!("Add column {} to {}", self.column.name, self.table)
    }
}

// ── DropColumn ───────────────────────────────────────────────────────────

/// Drops a column if the table has it.
#[derive(Debug, Clone)]
pub struct DropColumn {
    /// The table to alter.
    pub table: String,
    /// The column name.
    pub column: String,
}

#[async_trait::async_trait]
impl Action for DropColumn {
    async fn apply(&self, db: &dyn DatabaseBackend) -> StepwiseResult<()> {
        if !db.has_column(&self.table, &self.column).await? {
            tracing::debug!(table = %self.table, column = %self.column, "column missing, skipping");
            return Ok(());
        }
        let statements =
            schema_editor::for_vendor(db.vendor())?.drop_column(&self.table, &self.column);
        run_statements(db, &statements).await
    }

    fn describe(&self) -> String {
        format!("Drop column {} from {}", self.column, self.table)
    }
}

// ── Indexes ──────────────────────────────────────────────────────────────

/// Creates an index. A no-op when an index with the same name exists.
#[derive(Debug, Clone)]
pub struct CreateIndex {
    /// The indexed table.
    pub table: String,
    /// The index definition.
    pub index: IndexDef,
}

#[async_trait::async_trait]
impl Action for CreateIndex {
    async fn apply(&self, db: &dyn DatabaseBackend) -> StepwiseResult<()> {
        let statements =
            schema_editor::for_vendor(db.vendor())?.create_index(&self.table, &self.index);
        run_statements(db, &statements).await
    }

    fn describe(&self) -> String {
        format!(
            "Create {}index {} on {}",
            if self.index.unique { "unique " } else { "" },
            self.index.name,
            self.table
        )
    }
}

/// Drops an index. A no-op when the index does not exist.
#[derive(Debug, Clone)]
pub struct DropIndex {
    /// The index name.
    pub name: String,
}

#[async_trait::async_trait]
impl Action for DropIndex {
    async fn apply(&self, db: &dyn DatabaseBackend) -> StepwiseResult<()> {
        let statements = schema_editor::for_vendor(db.vendor())?.drop_index(&self.name);
        run_statements(db, &statements).await
    }

    fn describe(&self) -> String {
        format!("Drop index {}", self.name)
    }
}

// ── RunSql ───────────────────────────────────────────────────────────────

/// Executes raw SQL statements.
///
/// With `atomic` set (the default) all statements run inside one transaction
/// and a failing statement rolls back the ones before it.
///
/// # Examples
///
/// ```
/// use stepwise_migrations::operations::RunSql;
///
/// let op = RunSql::new(["CREATE UNIQUE INDEX idx_users_on_email ON users (email)"]);
/// assert!(op.atomic);
/// ```
#[derive(Debug, Clone)]
pub struct RunSql {
    /// The statements, executed in order.
    pub statements: Vec<String>,
    /// Whether to wrap the statements in a transaction.
    pub atomic: bool,
}

impl RunSql {
    /// Creates an atomic `RunSql` from the given statements.
    pub fn new<I, S>(statements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            statements: statements.into_iter().map(Into::into).collect(),
            atomic: true,
        }
    }

    /// Runs the statements outside a transaction.
    ///
    /// Needed for statements SQLite refuses inside a transaction, such as
    /// `VACUUM`.
    pub fn non_atomic(mut self) -> Self {
        self.atomic = false;
        self
    }
}

#[async_trait::async_trait]
impl Action for RunSql {
    async fn apply(&self, db: &dyn DatabaseBackend) -> StepwiseResult<()> {
        if self.statements.is_empty() {
            return Ok(());
        }
        if self.atomic {
            let statements = &self.statements;
            atomic(db, |tx| async move { run_statements(tx, statements).await }).await
        } else {
            run_statements(db, &self.statements).await
        }
    }

    fn describe(&self) -> String {
        match self.statements.len() {
            0 => "Raw SQL (no statements)".to_string(),
            1 => format!("Raw SQL: {}", self.statements[0]),
            n => format!("Raw SQL ({n} statements)"),
        }
    }
}

// ── FnAction ─────────────────────────────────────────────────────────────

type ActionFn =
    dyn for<'a> Fn(&'a dyn DatabaseBackend) -> BoxFuture<'a, StepwiseResult<()>> + Send + Sync;

/// Wraps an async function for custom migration logic.
///
/// # Examples
///
/// ```
/// use stepwise_migrations::operations::FnAction;
///
/// let seed = FnAction::new("Seed admin user", |db| {
///     Box::pin(async move {
///         db.execute("INSERT INTO users (name) VALUES ('admin')", &[]).await?;
///         Ok(())
///     })
/// });
/// ```
pub struct FnAction {
    description: String,
    func: Box<ActionFn>,
}

impl FnAction {
    /// Creates an action from an async function.
    pub fn new<F>(description: impl Into<String>, func: F) -> Self
    where
        F: for<'a> Fn(&'a dyn DatabaseBackend) -> BoxFuture<'a, StepwiseResult<()>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            description: description.into(),
            func: Box::new(func),
        }
    }
}

impl fmt::Debug for FnAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnAction")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl Action for FnAction {
    async fn apply(&self, db: &dyn DatabaseBackend) -> StepwiseResult<()> {
        (self.func)(db).await
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

// ── Irreversible ─────────────────────────────────────────────────────────

/// A backward action that always fails.
///
/// Used for steps whose effect cannot be undone; rolling back past such a
/// step stops with an execution error and keeps its record.
#[derive(Debug, Clone)]
pub struct Irreversible {
    /// Why the step cannot be undone.
    pub reason: String,
}

impl Irreversible {
    /// Creates an irreversible marker with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait::async_trait]
impl Action for Irreversible {
    async fn apply(&self, _db: &dyn DatabaseBackend) -> StepwiseResult<()> {
        Err(StepwiseError::OperationalError(format!(
            "irreversible: {}",
            self.reason
        )))
    }

    fn describe(&self) -> String {
        format!("Irreversible ({})", self.reason)
    }
}
