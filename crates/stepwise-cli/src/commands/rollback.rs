//! The `rollback` management command.
//!
//! Undoes the most recently applied migration. `--steps N` repeats the
//! rollback up to `N` times, stopping early once nothing is left.

use async_trait::async_trait;
use stepwise_core::{MigrateMode, Settings, StepwiseError};
use stepwise_migrations::RunOutcome;

use super::{open_engine, StepFactory};
use crate::command::ManagementCommand;

/// Rolls back applied migrations, most recent first.
pub struct RollbackCommand {
    steps: StepFactory,
}

impl RollbackCommand {
    /// Creates the command over the given step list.
    pub fn new(steps: StepFactory) -> Self {
        Self { steps }
    }
}

#[async_trait]
impl ManagementCommand for RollbackCommand {
    fn name(&self) -> &'static str {
        "rollback"
    }

    fn help(&self) -> &'static str {
        "Roll back the most recently applied migration"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("steps")
                .long("steps")
                .value_name("N")
                .value_parser(clap::value_parser!(u32).range(1..))
                .default_value("1")
                .help("Number of migrations to roll back"),
        )
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), StepwiseError> {
        let count = matches.get_one::<u32>("steps").copied().unwrap_or(1);
        let mut engine = open_engine(settings, &self.steps).await?;

        for _ in 0..count {
            let outcome = engine.run(MigrateMode::Rollback).await?;
            println!("{outcome}");
            if outcome == RunOutcome::NothingToRollback {
                break;
            }
        }
        Ok(())
    }
}
