//! Reconciliation of applied records against registered steps.
//!
//! The [`MigrationEngine`] compares the persisted record list with the
//! registered step list. Record `i` must carry the name of step `i` for every
//! recorded position; any divergence is a conflict and nothing is changed.
//! Forward runs apply the unrecorded tail of the step list, writing one record
//! after each successful step. A rewind undoes the step paired with the last
//! record and deletes that record once the backward action has succeeded.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use stepwise_core::logging::migration_span;
use stepwise_core::{MigrateMode, StepwiseError, StepwiseResult};
use stepwise_db_backends::DatabaseBackend;
use tracing::Instrument;

use crate::migration::{validate_steps, MigrationStep};
use crate::recorder::{DatabaseRecordStore, MigrationRecord, RecordStore};

/// The result of a successful [`MigrationEngine::run`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Forward run found every step already applied.
    NothingToMigrate,
    /// Forward run applied these steps, in order.
    Migrated {
        /// Names of the steps applied by this run.
        applied: Vec<String>,
    },
    /// Rollback run found no applied steps.
    NothingToRollback,
    /// Rollback run undid this step.
    RolledBack {
        /// Name of the step that was rolled back.
        name: String,
    },
    /// Check run found records and steps in agreement.
    Synchronized,
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NothingToMigrate => write!(f, "Nothing to migrate, all done"),
            Self::Migrated { applied } => {
                write!(f, "Applied {} migration(s): {}", applied.len(), applied.join(", "))
            }
            Self::NothingToRollback => write!(f, "No more migration to rollback"),
            Self::RolledBack { name } => write!(f, "Rolled back {name}"),
            Self::Synchronized => write!(f, "Database is synchronized"),
        }
    }
}

/// The state of one position in [`MigrationEngine::status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    /// Recorded under the registered name.
    Applied,
    /// Registered but not recorded.
    Pending,
    /// Recorded under a different name than the registered step.
    Conflict,
    /// Recorded with no registered step at this position.
    Orphaned,
}

impl StepState {
    /// Returns the marker used by `showmigrations`.
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Applied => "[X]",
            Self::Pending => "[ ]",
            Self::Conflict => "[!]",
            Self::Orphaned => "[?]",
        }
    }
}

/// Status of one position in the step list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepStatus {
    /// Zero-based position.
    pub position: usize,
    /// The registered step name, if a step exists at this position.
    pub registered: Option<String>,
    /// The record at this position, if any.
    pub record: Option<MigrationRecord>,
    /// The reconciled state.
    pub state: StepState,
}

impl StepStatus {
    /// Returns the name to display: the registered name, else the recorded one.
    pub fn display_name(&self) -> &str {
        self.registered
            .as_deref()
            .or_else(|| self.record.as_ref().map(|r| r.name.as_str()))
            .unwrap_or_default()
    }
}

/// Drives forward and backward migration runs.
///
/// One engine handles one run at a time; every mutating method takes
/// `&mut self`.
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use stepwise_core::MigrateMode;
/// use stepwise_db_backends::SqliteBackend;
/// use stepwise_migrations::schema_editor::TableDef;
/// use stepwise_migrations::{DatabaseRecordStore, MigrationEngine, MigrationStep};
///
/// # async fn demo() -> Result<(), stepwise_core::StepwiseError> {
/// let backend = Arc::new(SqliteBackend::open("app.db")?);
/// let store = DatabaseRecordStore::new(backend.clone());
/// let steps = vec![MigrationStep::create_table(
///     "createUsersTable",
///     TableDef::new("users").id(),
/// )];
/// let mut engine = MigrationEngine::initialize(backend, Box::new(store), steps).await?;
/// let outcome = engine.run(MigrateMode::Migrate).await?;
/// println!("{outcome}");
/// # Ok(())
/// # }
/// ```
pub struct MigrationEngine {
    backend: Arc<dyn DatabaseBackend>,
    store: Box<dyn RecordStore>,
    steps: Vec<MigrationStep>,
    records: Vec<MigrationRecord>,
}

impl MigrationEngine {
    /// Ensures the record storage exists and loads the applied records.
    ///
    /// # Errors
    ///
    /// Returns [`StepwiseError::ConfigurationError`] for an invalid step list
    /// and [`StepwiseError::SetupError`] if the record storage cannot be
    /// created.
    pub async fn initialize(
        backend: Arc<dyn DatabaseBackend>,
        store: Box<dyn RecordStore>,
        steps: Vec<MigrationStep>,
    ) -> StepwiseResult<Self> {
        validate_steps(&steps)?;
        store.ensure_table().await.map_err(|e| {
            tracing::error!(error = %e, "failed to create migration record table");
            StepwiseError::SetupError(e.to_string())
        })?;

        let mut engine = Self {
            backend,
            store,
            steps,
            records: Vec::new(),
        };
        engine.reload().await?;
        tracing::debug!(
            steps = engine.steps.len(),
            records = engine.records.len(),
            "migration engine initialized"
        );
        Ok(engine)
    }

    /// Initializes an engine that records into the default table of `backend`.
    ///
    /// # Errors
    ///
    /// See [`MigrationEngine::initialize`].
    pub async fn for_backend(
        backend: Arc<dyn DatabaseBackend>,
        steps: Vec<MigrationStep>,
    ) -> StepwiseResult<Self> {
        let store = DatabaseRecordStore::new(backend.clone());
        Self::initialize(backend, Box::new(store), steps).await
    }

    /// Replaces the registered steps. Registration order is kept.
    ///
    /// # Errors
    ///
    /// Returns [`StepwiseError::ConfigurationError`] for empty or duplicate names;
    /// the previous registration is kept in that case.
    pub fn register_steps(&mut self, steps: Vec<MigrationStep>) -> StepwiseResult<()> {
        validate_steps(&steps)?;
        self.steps = steps;
        Ok(())
    }

    /// Returns the registered steps.
    pub fn steps(&self) -> &[MigrationStep] {
        &self.steps
    }

    /// Returns the records as of the last load.
    pub fn records(&self) -> &[MigrationRecord] {
        &self.records
    }

    /// Reloads the records from the store.
    ///
    /// # Errors
    ///
    /// Propagates store errors.
    pub async fn reload(&mut self) -> StepwiseResult<()> {
        self.records = self.store.list_ordered().await?;
        Ok(())
    }

    /// Reloads the records and reports whether they match the steps exactly.
    ///
    /// # Errors
    ///
    /// Propagates store errors.
    pub async fn is_synchronized(&mut self) -> StepwiseResult<bool> {
        self.reload().await?;
        Ok(self.records.len() == self.steps.len() && self.find_conflict().is_none())
    }

    /// Runs the engine in the given mode.
    ///
    /// # Errors
    ///
    /// - [`StepwiseError::Unsynchronized`] when a check finds pending or
    ///   divergent migrations.
    /// - [`StepwiseError::Conflict`] when records and steps diverge.
    /// - [`StepwiseError::ExecutionError`] when an action fails.
    /// - Store errors otherwise.
    pub async fn run(&mut self, mode: MigrateMode) -> StepwiseResult<RunOutcome> {
        tracing::info!(mode = %mode, "starting migration run");
        match mode {
            MigrateMode::Check => {
                if self.is_synchronized().await? {
                    tracing::info!("database is synchronized");
                    Ok(RunOutcome::Synchronized)
                } else {
                    tracing::error!(
                        steps = self.steps.len(),
                        records = self.records.len(),
                        "database is not synchronized"
                    );
                    Err(StepwiseError::Unsynchronized)
                }
            }
            MigrateMode::Migrate => {
                if self.is_synchronized().await? {
                    tracing::info!("nothing to migrate, all done");
                    return Ok(RunOutcome::NothingToMigrate);
                }
                let applied = self.advance_loaded().await?;
                Ok(RunOutcome::Migrated { applied })
            }
            MigrateMode::Rollback => {
                self.reload().await?;
                if self.records.is_empty() {
                    tracing::info!("no more migration to rollback");
                    return Ok(RunOutcome::NothingToRollback);
                }
                let name = self.rewind_loaded().await?;
                Ok(RunOutcome::RolledBack { name })
            }
        }
    }

    /// Applies every unrecorded step, in order.
    ///
    /// Returns the names of the steps applied. Stops at the first failing
    /// step; steps applied before it stay recorded.
    ///
    /// # Errors
    ///
    /// [`StepwiseError::Conflict`] before anything runs if the records
    /// diverge from the steps, [`StepwiseError::ExecutionError`] when a
    /// forward action fails.
    pub async fn advance(&mut self) -> StepwiseResult<Vec<String>> {
        self.reload().await?;
        self.advance_loaded().await
    }

    /// Undoes the most recently applied step and returns its name.
    ///
    /// # Errors
    ///
    /// [`StepwiseError::EmptyRewind`] with no records,
    /// [`StepwiseError::Conflict`] if the records diverge from the steps,
    /// [`StepwiseError::ExecutionError`] when the backward action fails (the
    /// record is kept).
    pub async fn rewind(&mut self) -> StepwiseResult<String> {
        self.reload().await?;
        self.rewind_loaded().await
    }

    /// Reloads the records and reports the state of every position.
    ///
    /// # Errors
    ///
    /// Propagates store errors.
    pub async fn status(&mut self) -> StepwiseResult<Vec<StepStatus>> {
        self.reload().await?;
        let len = self.steps.len().max(self.records.len());
        let status = (0..len)
            .map(|position| {
                let step = self.steps.get(position);
                let record = self.records.get(position);
                let state = match (step, record) {
                    (Some(step), Some(record)) if step.name() == record.name => StepState::Applied,
                    (Some(_), Some(_)) => StepState::Conflict,
                    (None, Some(_)) => StepState::Orphaned,
                    (_, None) => StepState::Pending,
                };
                StepStatus {
                    position,
                    registered: step.map(|s| s.name().to_string()),
                    record: record.cloned(),
                    state,
                }
            })
            .collect();
        Ok(status)
    }

    fn find_conflict(&self) -> Option<StepwiseError> {
        self.records
            .iter()
            .enumerate()
            .find_map(|(position, record)| match self.steps.get(position) {
                Some(step) if step.name() == record.name => None,
                step => Some(StepwiseError::Conflict {
                    position,
                    recorded: record.name.clone(),
                    registered: step.map(|s| s.name().to_string()),
                }),
            })
    }

    fn check_prefix(&self) -> StepwiseResult<()> {
        match self.find_conflict() {
            Some(conflict) => {
                tracing::error!(error = %conflict, "migration records diverge from registered steps");
                Err(conflict)
            }
            None => Ok(()),
        }
    }

    async fn advance_loaded(&mut self) -> StepwiseResult<Vec<String>> {
        self.check_prefix()?;

        let mut applied = Vec::new();
        for position in self.records.len()..self.steps.len() {
            let step = &self.steps[position];
            let span = migration_span(step.name(), "forward");

            async {
                tracing::info!(action = %step.forward().describe(), "applying migration");
                step.apply_forward(self.backend.as_ref()).await
            }
            .instrument(span.clone())
            .await
            .map_err(|e| {
                tracing::error!(parent: &span, error = %e, "migration failed");
                e
            })?;

            let record = self.store.insert(step.name()).await.map_err(|e| {
                tracing::error!(
                    parent: &span,
                    error = %e,
                    "migration applied but its record could not be written"
                );
                e
            })?;
            tracing::info!(parent: &span, id = record.id, "migration applied");

            applied.push(record.name.clone());
            self.records.push(record);
        }
        Ok(applied)
    }

    async fn rewind_loaded(&mut self) -> StepwiseResult<String> {
        let Some(last) = self.records.last().cloned() else {
            return Err(StepwiseError::EmptyRewind);
        };
        self.check_prefix()?;

        // The prefix check guarantees a step exists at this position.
        let step = &self.steps[self.records.len() - 1];
        let span = migration_span(step.name(), "backward");

        async {
            tracing::info!(action = %step.backward().describe(), "rolling back migration");
            step.apply_backward(self.backend.as_ref()).await
        }
        .instrument(span.clone())
        .await
        .map_err(|e| {
            tracing::error!(parent: &span, error = %e, "rollback failed");
            e
        })?;

        self.store.delete(&last).await.map_err(|e| {
            tracing::error!(
                parent: &span,
                error = %e,
                "migration rolled back but its record could not be deleted"
            );
            e
        })?;
        self.records.pop();
        tracing::info!(parent: &span, id = last.id, "migration rolled back");
        Ok(last.name)
    }
}

impl fmt::Debug for MigrationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationEngine")
            .field("vendor", &self.backend.vendor())
            .field("steps", &self.steps.len())
            .field("records", &self.records.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::{FnAction, RunSql};
    use crate::recorder::InMemoryRecordStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use stepwise_db_backends::SqliteBackend;

    const NOOP: [&str; 0] = [];

    fn backend() -> Arc<dyn DatabaseBackend> {
        Arc::new(SqliteBackend::memory().unwrap())
    }

    fn noop(name: &str) -> MigrationStep {
        MigrationStep::new(name, RunSql::new(NOOP), RunSql::new(NOOP))
    }

    fn counting(name: &str, counter: Arc<AtomicUsize>) -> MigrationStep {
        let action = FnAction::new("count", move |_db| {
            let counter = counter.clone();
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        });
        MigrationStep::new(name, action, RunSql::new(NOOP))
    }

    async fn engine_with(
        records: &[&str],
        steps: Vec<MigrationStep>,
    ) -> (MigrationEngine, InMemoryRecordStore) {
        let store = InMemoryRecordStore::with_records(records.iter().copied());
        let engine = MigrationEngine::initialize(backend(), Box::new(store.clone()), steps)
            .await
            .unwrap();
        (engine, store)
    }

    struct BrokenStore;

    #[async_trait::async_trait]
    impl RecordStore for BrokenStore {
        async fn ensure_table(&self) -> StepwiseResult<()> {
            Err(StepwiseError::OperationalError("read-only database".into()))
        }
        async fn list_ordered(&self) -> StepwiseResult<Vec<MigrationRecord>> {
            Ok(Vec::new())
        }
        async fn insert(&self, _name: &str) -> StepwiseResult<MigrationRecord> {
            Err(StepwiseError::OperationalError("read-only database".into()))
        }
        async fn delete(&self, _record: &MigrationRecord) -> StepwiseResult<()> {
            Err(StepwiseError::OperationalError("read-only database".into()))
        }
    }

    // ── Initialization ──────────────────────────────────────────────

    #[tokio::test]
    async fn test_initialize_setup_error() {
        let result = MigrationEngine::initialize(backend(), Box::new(BrokenStore), vec![]).await;
        assert!(matches!(result, Err(StepwiseError::SetupError(_))));
    }

    #[tokio::test]
    async fn test_initialize_rejects_duplicates() {
        let result = MigrationEngine::initialize(
            backend(),
            Box::new(InMemoryRecordStore::new()),
            vec![noop("a"), noop("a")],
        )
        .await;
        assert!(matches!(result, Err(StepwiseError::ConfigurationError(_))));
    }

    #[tokio::test]
    async fn test_register_steps_replaces_list() {
        let (mut engine, _) = engine_with(&[], vec![noop("a")]).await;
        engine.register_steps(vec![noop("a"), noop("b")]).unwrap();
        let names: Vec<&str> = engine.steps().iter().map(MigrationStep::name).collect();
        assert_eq!(names, vec!["a", "b"]);

        assert!(engine.register_steps(vec![noop("x"), noop("x")]).is_err());
        assert_eq!(engine.steps().len(), 2);
    }

    // ── Synchronization ─────────────────────────────────────────────

    #[tokio::test]
    async fn test_is_synchronized() {
        let (mut engine, _) = engine_with(&["a", "b"], vec![noop("a"), noop("b")]).await;
        assert!(engine.is_synchronized().await.unwrap());

        let (mut engine, _) = engine_with(&["a"], vec![noop("a"), noop("b")]).await;
        assert!(!engine.is_synchronized().await.unwrap());

        let (mut engine, _) = engine_with(&["a", "c"], vec![noop("a"), noop("b")]).await;
        assert!(!engine.is_synchronized().await.unwrap());
    }

    #[tokio::test]
    async fn test_is_synchronized_reloads() {
        let (mut engine, store) = engine_with(&[], vec![noop("a")]).await;
        assert!(!engine.is_synchronized().await.unwrap());
        store.insert("a").await.unwrap();
        assert!(engine.is_synchronized().await.unwrap());
    }

    #[tokio::test]
    async fn test_check_mode() {
        let (mut engine, _) = engine_with(&["a"], vec![noop("a")]).await;
        assert_eq!(engine.run(MigrateMode::Check).await.unwrap(), RunOutcome::Synchronized);

        let (mut engine, store) = engine_with(&[], vec![noop("a")]).await;
        assert!(matches!(
            engine.run(MigrateMode::Check).await,
            Err(StepwiseError::Unsynchronized)
        ));
        assert!(store.names().await.is_empty());
    }

    // ── Forward ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_advance_applies_tail_only() {
        let counter = Arc::new(AtomicUsize::new(0));
        let steps = vec![
            counting("a", counter.clone()),
            counting("b", counter.clone()),
            counting("c", counter.clone()),
        ];
        let (mut engine, store) = engine_with(&["a"], steps).await;

        let applied = engine.advance().await.unwrap();
        assert_eq!(applied, vec!["b", "c"]);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(store.names().await, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_migrate_twice_is_noop() {
        let counter = Arc::new(AtomicUsize::new(0));
        let (mut engine, _) = engine_with(&[], vec![counting("a", counter.clone())]).await;

        let first = engine.run(MigrateMode::Migrate).await.unwrap();
        assert_eq!(
            first,
            RunOutcome::Migrated {
                applied: vec!["a".into()]
            }
        );
        let second = engine.run(MigrateMode::Migrate).await.unwrap();
        assert_eq!(second, RunOutcome::NothingToMigrate);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_advance_conflict_runs_nothing() {
        let counter = Arc::new(AtomicUsize::new(0));
        let steps = vec![counting("a", counter.clone()), counting("c", counter.clone())];
        let (mut engine, store) = engine_with(&["a", "b"], steps).await;

        let err = engine.run(MigrateMode::Migrate).await.unwrap_err();
        match err {
            StepwiseError::Conflict {
                position,
                recorded,
                registered,
            } => {
                assert_eq!(position, 1);
                assert_eq!(recorded, "b");
                assert_eq!(registered.as_deref(), Some("c"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(store.names().await, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_advance_more_records_than_steps() {
        let (mut engine, _) = engine_with(&["a", "b"], vec![noop("a")]).await;
        let err = engine.advance().await.unwrap_err();
        assert!(matches!(
            err,
            StepwiseError::Conflict {
                position: 1,
                registered: None,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_advance_stops_at_failure() {
        let counter = Arc::new(AtomicUsize::new(0));
        let steps = vec![
            counting("a", counter.clone()),
            MigrationStep::sql("broken", ["NOT SQL"], NOOP),
            counting("c", counter.clone()),
        ];
        let (mut engine, store) = engine_with(&[], steps).await;

        let err = engine.advance().await.unwrap_err();
        assert!(matches!(err, StepwiseError::ExecutionError { ref step, .. } if step == "broken"));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(store.names().await, vec!["a"]);
        assert_eq!(engine.records().len(), 1);
    }

    #[tokio::test]
    async fn test_advance_record_write_failure_is_surfaced() {
        struct InsertFails(InMemoryRecordStore);

        #[async_trait::async_trait]
        impl RecordStore for InsertFails {
            async fn ensure_table(&self) -> StepwiseResult<()> {
                self.0.ensure_table().await
            }
            async fn list_ordered(&self) -> StepwiseResult<Vec<MigrationRecord>> {
                self.0.list_ordered().await
            }
            async fn insert(&self, _name: &str) -> StepwiseResult<MigrationRecord> {
                Err(StepwiseError::DatabaseError("disk full".into()))
            }
            async fn delete(&self, record: &MigrationRecord) -> StepwiseResult<()> {
                self.0.delete(record).await
            }
        }

        let mut engine = MigrationEngine::initialize(
            backend(),
            Box::new(InsertFails(InMemoryRecordStore::new())),
            vec![noop("a"), noop("b")],
        )
        .await
        .unwrap();
        let err = engine.advance().await.unwrap_err();
        assert!(matches!(err, StepwiseError::DatabaseError(_)));
        assert!(engine.records().is_empty());
    }

    // ── Backward ────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_rewind_removes_last_record() {
        let (mut engine, store) = engine_with(&["a", "b"], vec![noop("a"), noop("b")]).await;
        assert_eq!(engine.rewind().await.unwrap(), "b");
        assert_eq!(store.names().await, vec!["a"]);
        assert_eq!(
            engine.run(MigrateMode::Rollback).await.unwrap(),
            RunOutcome::RolledBack { name: "a".into() }
        );
        assert_eq!(
            engine.run(MigrateMode::Rollback).await.unwrap(),
            RunOutcome::NothingToRollback
        );
    }

    #[tokio::test]
    async fn test_rewind_empty() {
        let (mut engine, _) = engine_with(&[], vec![noop("a")]).await;
        assert!(matches!(engine.rewind().await, Err(StepwiseError::EmptyRewind)));
    }

    #[tokio::test]
    async fn test_rewind_uses_step_paired_with_last_record() {
        let counter = Arc::new(AtomicUsize::new(0));
        let backward = {
            let counter = counter.clone();
            FnAction::new("count", move |_db| {
                let counter = counter.clone();
                Box::pin(async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
            })
        };
        let steps = vec![
            MigrationStep::new("a", RunSql::new(NOOP), backward),
            MigrationStep::sql("b", NOOP, ["NOT SQL"]),
        ];
        // Only "a" is applied, so rewinding must run a's backward, not b's.
        let (mut engine, store) = engine_with(&["a"], steps).await;
        assert_eq!(engine.rewind().await.unwrap(), "a");
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(store.names().await.is_empty());
    }

    #[tokio::test]
    async fn test_rewind_failure_keeps_record() {
        let steps = vec![MigrationStep::sql("a", NOOP, ["NOT SQL"])];
        let (mut engine, store) = engine_with(&["a"], steps).await;
        let err = engine.run(MigrateMode::Rollback).await.unwrap_err();
        assert!(matches!(err, StepwiseError::ExecutionError { .. }));
        assert_eq!(store.names().await, vec!["a"]);
    }

    #[tokio::test]
    async fn test_rewind_conflict() {
        let (mut engine, store) = engine_with(&["a", "b"], vec![noop("a")]).await;
        assert!(matches!(
            engine.run(MigrateMode::Rollback).await,
            Err(StepwiseError::Conflict { position: 1, .. })
        ));
        assert_eq!(store.names().await, vec!["a", "b"]);
    }

    // ── Status ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_status_states() {
        let (mut engine, _) =
            engine_with(&["a", "x", "z"], vec![noop("a"), noop("b")]).await;
        let status = engine.status().await.unwrap();
        let states: Vec<StepState> = status.iter().map(|s| s.state).collect();
        assert_eq!(
            states,
            vec![StepState::Applied, StepState::Conflict, StepState::Orphaned]
        );
        assert_eq!(status[2].display_name(), "z");

        let (mut engine, _) = engine_with(&["a"], vec![noop("a"), noop("b")]).await;
        let status = engine.status().await.unwrap();
        assert_eq!(status[1].state, StepState::Pending);
        assert_eq!(status[1].state.marker(), "[ ]");
        assert!(status[1].record.is_none());
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(
            RunOutcome::NothingToMigrate.to_string(),
            "Nothing to migrate, all done"
        );
        assert_eq!(
            RunOutcome::Migrated {
                applied: vec!["a".into(), "b".into()]
            }
            .to_string(),
            "Applied 2 migration(s): a, b"
        );
        assert_eq!(
            RunOutcome::RolledBack { name: "a".into() }.to_string(),
            "Rolled back a"
        );
    }
}
