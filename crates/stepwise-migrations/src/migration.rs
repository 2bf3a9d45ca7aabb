//! Migration steps and step identity.
//!
//! A [`MigrationStep`] is a named pair of actions. The name is the identity
//! persisted in the record table, so it must stay the same across releases
//! for the same logical change. Steps are registered as an ordered list and
//! new steps are only ever appended.

use std::collections::HashSet;
use std::fmt;

use stepwise_core::{StepwiseError, StepwiseResult};
use stepwise_db_backends::DatabaseBackend;

use crate::operations::{
    Action, AddColumn, BoxFuture, CreateIndex, CreateTable, DropColumn, DropIndex, DropTable,
    FnAction, RunSql,
};
use crate::schema_editor::{ColumnDef, IndexDef, TableDef};

/// A registered unit of change: a name, a forward action, and an explicit
/// backward action.
///
/// # Examples
///
/// ```
/// use stepwise_migrations::MigrationStep;
///
/// let step = MigrationStep::sql(
///     "addEmailIndexToUsers",
///     ["CREATE UNIQUE INDEX idx_users_on_email ON users (email)"],
///     ["DROP INDEX idx_users_on_email"],
/// );
/// assert_eq!(step.name(), "addEmailIndexToUsers");
/// ```
pub struct MigrationStep {
    name: String,
    forward: Box<dyn Action>,
    backward: Box<dyn Action>,
}

impl MigrationStep {
    /// Creates a step with an explicit name.
    pub fn new(
        name: impl Into<String>,
        forward: impl Action + 'static,
        backward: impl Action + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            forward: Box::new(forward),
            backward: Box::new(backward),
        }
    }

    /// Creates a step whose name is derived from the forward function's path.
    ///
    /// `forward` must be a named function item; closures have no stable
    /// identity and are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`StepwiseError::ConfigurationError`] when no name can be derived.
    pub fn from_fn<F>(forward: F, backward: impl Action + 'static) -> StepwiseResult<Self>
    where
        F: for<'a> Fn(&'a dyn DatabaseBackend) -> BoxFuture<'a, StepwiseResult<()>>
            + Send
            + Sync
            + 'static,
    {
        let name = derive_step_name(std::any::type_name::<F>())?;
        let forward = FnAction::new(name.clone(), forward);
        Ok(Self::new(name, forward, backward))
    }

    /// Creates a step that creates `table` and drops it on rollback.
    pub fn create_table(name: impl Into<String>, table: TableDef) -> Self {
        let backward = DropTable {
            table: table.name.clone(),
        };
        Self::new(name, CreateTable { table }, backward)
    }

    /// Creates a step that adds `column` to `table` and drops it on rollback.
    pub fn add_column(name: impl Into<String>, table: impl Into<String>, column: ColumnDef) -> Self {
        let table = table.into();
        let backward = DropColumn {
            table: table.clone(),
            column: column.name.clone(),
        };
        Self::new(name, AddColumn { table, column }, backward)
    }

    /// Creates a step that creates `index` on `table` and drops it on rollback.
    pub fn create_index(name: impl Into<String>, table: impl Into<String>, index: IndexDef) -> Self {
        let backward = DropIndex {
            name: index.name.clone(),
        };
        Self::new(
            name,
            CreateIndex {
                table: table.into(),
                index,
            },
            backward,
        )
    }

    /// Creates a step from raw forward and backward SQL, each run atomically.
    pub fn sql<U, D, S, T>(name: impl Into<String>, up: U, down: D) -> Self
    where
        U: IntoIterator<Item = S>,
        D: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self::new(name, RunSql::new(up), RunSql::new(down))
    }

    /// Returns the step name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the forward action.
    pub fn forward(&self) -> &dyn Action {
        self.forward.as_ref()
    }

    /// Returns the backward action.
    pub fn backward(&self) -> &dyn Action {
        self.backward.as_ref()
    }

    /// Runs the forward action, wrapping any failure as an execution error.
    pub async fn apply_forward(&self, db: &dyn DatabaseBackend) -> StepwiseResult<()> {
        self.forward
            .apply(db)
            .await
            .map_err(|e| StepwiseError::execution(&self.name, e))
    }

    /// Runs the backward action, wrapping any failure as an execution error.
    pub async fn apply_backward(&self, db: &dyn DatabaseBackend) -> StepwiseResult<()> {
        self.backward
            .apply(db)
            .await
            .map_err(|e| StepwiseError::execution(&self.name, e))
    }
}

impl fmt::Debug for MigrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationStep")
            .field("name", &self.name)
            .field("forward", &self.forward.describe())
            .field("backward", &self.backward.describe())
            .finish()
    }
}

/// Derives a step name from a qualified function symbol.
///
/// Keeps the last path component and strips generic arguments and adapter
/// suffixes such as `-fm`. Both `::` and `.` are accepted as separators.
///
/// ```
/// use stepwise_migrations::migration::derive_step_name;
///
/// assert_eq!(
///     derive_step_name("app::migrations::create_users_table").unwrap(),
///     "create_users_table"
/// );
/// assert_eq!(
///     derive_step_name("main.(*Manager).createUsersTable-fm").unwrap(),
///     "createUsersTable"
/// );
/// assert!(derive_step_name("app::main::{{closure}}").is_err());
/// ```
///
/// # Errors
///
/// Returns [`StepwiseError::ConfigurationError`] for closures and for symbols
/// that reduce to an empty name.
pub fn derive_step_name(symbol: &str) -> StepwiseResult<String> {
    if symbol.contains("{{closure}}") {
        return Err(StepwiseError::ConfigurationError(format!(
            "Cannot derive a stable migration name from closure '{symbol}'; name the step explicitly"
        )));
    }

    let base = symbol.split('<').next().unwrap_or(symbol);
    let last = base.rsplit("::").next().unwrap_or(base);
    let last = last.rsplit('.').next().unwrap_or(last);
    let name = last.split('-').next().unwrap_or(last).trim();

    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(StepwiseError::ConfigurationError(format!(
            "Cannot derive a migration name from '{symbol}'"
        )));
    }
    Ok(name.to_string())
}

/// Validates a registration list: every name non-empty and unique.
///
/// # Errors
///
/// Returns [`StepwiseError::ConfigurationError`] naming the offending position.
pub fn validate_steps(steps: &[MigrationStep]) -> StepwiseResult<()> {
    let mut seen = HashSet::with_capacity(steps.len());
    for (position, step) in steps.iter().enumerate() {
        if step.name().trim().is_empty() {
            return Err(StepwiseError::ConfigurationError(format!(
                "Migration at position {position} has an empty name"
            )));
        }
        if !seen.insert(step.name()) {
            return Err(StepwiseError::ConfigurationError(format!(
                "Duplicate migration name '{}' at position {position}",
                step.name()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::Irreversible;
    use stepwise_db_backends::SqliteBackend;

    fn create_things(db: &dyn DatabaseBackend) -> BoxFuture<'_, StepwiseResult<()>> {
        Box::pin(async move { db.execute_batch("CREATE TABLE things (id INTEGER)").await })
    }

    // ── Name derivation ─────────────────────────────────────────────

    #[test]
    fn test_derive_from_rust_path() {
        assert_eq!(
            derive_step_name("demo::migrations::add_avatar_to_users").unwrap(),
            "add_avatar_to_users"
        );
        assert_eq!(derive_step_name("plain").unwrap(), "plain");
    }

    #[test]
    fn test_derive_strips_generics_and_suffix() {
        assert_eq!(
            derive_step_name("demo::seed<demo::User>").unwrap(),
            "seed"
        );
        assert_eq!(
            derive_step_name("main.(*MigrationManager).addAvatarToUsers-fm").unwrap(),
            "addAvatarToUsers"
        );
    }

    #[test]
    fn test_derive_rejects_closures_and_empty() {
        assert!(matches!(
            derive_step_name("demo::main::{{closure}}"),
            Err(StepwiseError::ConfigurationError(_))
        ));
        assert!(derive_step_name("").is_err());
        assert!(derive_step_name("demo::").is_err());
    }

    #[test]
    fn test_derive_is_stable() {
        let symbol = "demo::migrations::create_users_table";
        assert_eq!(
            derive_step_name(symbol).unwrap(),
            derive_step_name(symbol).unwrap()
        );
    }

    #[test]
    fn test_from_fn_uses_function_name() {
        let backward = DropTable {
            table: "things".into(),
        };
        let step = MigrationStep::from_fn(create_things, backward).unwrap();
        assert_eq!(step.name(), "create_things");
    }

    #[test]
    fn test_from_fn_rejects_closure() {
        let result = MigrationStep::from_fn(
            |db| Box::pin(async move { db.execute_batch("SELECT 1").await }),
            Irreversible::new("test"),
        );
        assert!(result.is_err());
    }

    // ── Validation ──────────────────────────────────────────────────

    #[test]
    fn test_validate_steps() {
        let ok = vec![
            MigrationStep::sql("a", ["SELECT 1"], ["SELECT 1"]),
            MigrationStep::sql("b", ["SELECT 1"], ["SELECT 1"]),
        ];
        assert!(validate_steps(&ok).is_ok());
        assert!(validate_steps(&[]).is_ok());

        let dup = vec![
            MigrationStep::sql("a", ["SELECT 1"], ["SELECT 1"]),
            MigrationStep::sql("a", ["SELECT 1"], ["SELECT 1"]),
        ];
        let err = validate_steps(&dup).unwrap_err();
        assert!(err.to_string().contains("Duplicate migration name 'a' at position 1"));

        let empty = vec![MigrationStep::sql(" ", ["SELECT 1"], ["SELECT 1"])];
        assert!(validate_steps(&empty).is_err());
    }

    // ── Apply ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_create_table_step_round_trip() {
        let db = SqliteBackend::memory().unwrap();
        let step = MigrationStep::create_table("createUsersTable", TableDef::new("users").id());
        step.apply_forward(&db).await.unwrap();
        assert!(db.has_table("users").await.unwrap());
        step.apply_backward(&db).await.unwrap();
        assert!(!db.has_table("users").await.unwrap());
    }

    #[tokio::test]
    async fn test_failure_is_wrapped_with_step_name() {
        let db = SqliteBackend::memory().unwrap();
        let step = MigrationStep::sql("broken", ["NOT SQL"], ["SELECT 1"]);
        let err = step.apply_forward(&db).await.unwrap_err();
        match err {
            StepwiseError::ExecutionError { step, .. } => assert_eq!(step, "broken"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_debug_shows_descriptions() {
        let step = MigrationStep::add_column("addAvatarToUsers", "users", ColumnDef::new("avatar", "TEXT"));
        let debug = format!("{step:?}");
        assert!(debug.contains("addAvatarToUsers"));
        assert!(debug.contains("Add column avatar to users"));
        assert!(debug.contains("Drop column avatar from users"));
    }
}
