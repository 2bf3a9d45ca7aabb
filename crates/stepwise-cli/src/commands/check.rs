//! The `check` management command.

use async_trait::async_trait;
use stepwise_core::{MigrateMode, Settings, StepwiseError};

use super::{run_mode, StepFactory};
use crate::command::ManagementCommand;

/// Verifies that every registered step is applied and nothing else is.
///
/// Never changes the database. Exits with the unsynchronized error code when
/// `migrate` still has work to do or the history diverges.
pub struct CheckCommand {
    steps: StepFactory,
}

impl CheckCommand {
    /// Creates the command over the given step list.
    pub fn new(steps: StepFactory) -> Self {
        Self { steps }
    }
}

#[async_trait]
impl ManagementCommand for CheckCommand {
    fn name(&self) -> &'static str {
        "check"
    }

    fn help(&self) -> &'static str {
        "Verify the database is synchronized with the registered migrations"
    }

    async fn handle(
        &self,
        _matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), StepwiseError> {
        let outcome = run_mode(settings, &self.steps, MigrateMode::Check).await?;
        println!("{outcome}");
        Ok(())
    }
}
