//! Built-in management commands.
//!
//! Every command opens the configured database, builds a
//! [`MigrationEngine`] over the application's registered steps, and runs one
//! mode. The steps come from a [`StepFactory`] because a step list is not
//! clonable and each invocation needs its own.

pub mod check;
pub mod migrate;
pub mod rollback;
pub mod run;
pub mod showmigrations;

use std::sync::Arc;

pub use check::CheckCommand;
pub use migrate::MigrateCommand;
pub use rollback::RollbackCommand;
pub use run::RunCommand;
pub use showmigrations::ShowmigrationsCommand;

use stepwise_core::{MigrateMode, Settings, StepwiseResult};
use stepwise_db_backends::DatabaseConfig;
use stepwise_migrations::{DatabaseRecordStore, MigrationEngine, MigrationStep, RunOutcome};

use crate::command::CommandRegistry;

/// Produces the application's registered migration steps, in order.
///
/// Building the list may fail (for example when a step name cannot be
/// derived). The error aborts the command before the database is touched.
pub type StepFactory = Arc<dyn Fn() -> StepwiseResult<Vec<MigrationStep>> + Send + Sync>;

/// Wraps a function returning the step list as a [`StepFactory`].
pub fn step_factory<F>(f: F) -> StepFactory
where
    F: Fn() -> Vec<MigrationStep> + Send + Sync + 'static,
{
    Arc::new(move || Ok(f()))
}

/// Wraps a fallible function returning the step list as a [`StepFactory`].
pub fn try_step_factory<F>(f: F) -> StepFactory
where
    F: Fn() -> StepwiseResult<Vec<MigrationStep>> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Opens the database named in `settings` and initializes an engine over it.
///
/// # Errors
///
/// Returns step construction, configuration, connection and setup errors.
pub async fn open_engine(settings: &Settings, steps: &StepFactory) -> StepwiseResult<MigrationEngine> {
    settings.validate()?;
    let steps = steps()?;
    let config = DatabaseConfig::from_settings(&settings.database);
    let backend = stepwise_db_backends::connect(&config)?;
    let store = DatabaseRecordStore::with_table(backend.clone(), &settings.migrations_table)?;
    tracing::debug!(
        database = %config.name,
        table = %settings.migrations_table,
        "opened migration database"
    );
    MigrationEngine::initialize(backend, Box::new(store), steps).await
}

/// Opens an engine and runs it once in `mode`.
///
/// # Errors
///
/// See [`open_engine`] and [`MigrationEngine::run`].
pub async fn run_mode(
    settings: &Settings,
    steps: &StepFactory,
    mode: MigrateMode,
) -> StepwiseResult<RunOutcome> {
    let mut engine = open_engine(settings, steps).await?;
    engine.run(mode).await
}

/// Registers all built-in management commands into the given registry.
pub fn register_builtin_commands(registry: &mut CommandRegistry, steps: &StepFactory) {
    registry.register(Box::new(MigrateCommand::new(steps.clone())));
    registry.register(Box::new(RollbackCommand::new(steps.clone())));
    registry.register(Box::new(CheckCommand::new(steps.clone())));
    registry.register(Box::new(ShowmigrationsCommand::new(steps.clone())));
    registry.register(Box::new(RunCommand::new(steps.clone())));
}
