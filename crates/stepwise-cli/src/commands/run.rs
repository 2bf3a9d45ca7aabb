//! The `run` management command.
//!
//! Runs the engine in a single mode picked by `--mode`, falling back to the
//! `mode` setting (and `STEPWISE_MODE`) when the flag is absent. The default
//! mode is `check`, so an unconfigured invocation never changes the database.

use std::str::FromStr;

use async_trait::async_trait;
use stepwise_core::{MigrateMode, Settings, StepwiseError};

use super::{run_mode, StepFactory};
use crate::command::ManagementCommand;

/// Runs one migration mode.
pub struct RunCommand {
    steps: StepFactory,
}

impl RunCommand {
    /// Creates the command over the given step list.
    pub fn new(steps: StepFactory) -> Self {
        Self { steps }
    }
}

/// Returns the mode selected by `--mode`, or the configured default.
///
/// # Errors
///
/// Returns [`StepwiseError::ConfigurationError`] for an unknown mode name.
pub fn selected_mode(matches: &clap::ArgMatches, settings: &Settings) -> Result<MigrateMode, StepwiseError> {
    matches
        .get_one::<String>("mode")
        .map_or(Ok(settings.mode), |raw| MigrateMode::from_str(raw))
}

#[async_trait]
impl ManagementCommand for RunCommand {
    fn name(&self) -> &'static str {
        "run"
    }

    fn help(&self) -> &'static str {
        "Run one mode: check, migrate, or rollback"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("mode")
                .long("mode")
                .short('m')
                .value_name("MODE")
                .help("check (default), migrate, or rollback"),
        )
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), StepwiseError> {
        let mode = selected_mode(matches, settings)?;
        let outcome = run_mode(settings, &self.steps, mode).await?;
        println!("{outcome}");
        Ok(())
    }
}
