//! The `migrate` management command.
//!
//! Applies every registered step that has no record yet, in order.

use async_trait::async_trait;
use stepwise_core::{MigrateMode, Settings, StepwiseError};

use super::{run_mode, StepFactory};
use crate::command::ManagementCommand;

/// Applies pending migrations.
///
/// Fails with a conflict, and changes nothing, when the applied records do
/// not match the registered steps.
pub struct MigrateCommand {
    steps: StepFactory,
}

impl MigrateCommand {
    /// Creates the command over the given step list.
    pub fn new(steps: StepFactory) -> Self {
        Self { steps }
    }
}

#[async_trait]
impl ManagementCommand for MigrateCommand {
    fn name(&self) -> &'static str {
        "migrate"
    }

    fn help(&self) -> &'static str {
        "Apply pending migrations"
    }

    async fn handle(
        &self,
        _matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), StepwiseError> {
        tracing::info!("Running migrations on database '{}'", settings.database.name);
        let outcome = run_mode(settings, &self.steps, MigrateMode::Migrate).await?;
        println!("{outcome}");
        Ok(())
    }
}
