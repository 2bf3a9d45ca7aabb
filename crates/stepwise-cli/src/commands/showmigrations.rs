//! The `showmigrations` management command.
//!
//! Lists every registered step with a marker showing whether it is applied.
//! Records that do not match a registered step are listed as well.

use async_trait::async_trait;
use stepwise_core::{Settings, StepwiseError};
use stepwise_migrations::StepStatus;

use super::{open_engine, StepFactory};
use crate::command::ManagementCommand;

/// Shows the applied/pending status of every migration.
pub struct ShowmigrationsCommand {
    steps: StepFactory,
}

impl ShowmigrationsCommand {
    /// Creates the command over the given step list.
    pub fn new(steps: StepFactory) -> Self {
        Self { steps }
    }
}

/// Renders status lines such as ` [X] createUsersTable`.
///
/// Conflicting positions also show the recorded name.
pub fn format_status(status: &[StepStatus]) -> String {
    if status.is_empty() {
        return "(no migrations)\n".to_string();
    }
    let mut out = String::new();
    for entry in status {
        out.push_str(&format!(" {} {}", entry.state.marker(), entry.display_name()));
        if let (Some(registered), Some(record)) = (&entry.registered, &entry.record) {
            if *registered != record.name {
                out.push_str(&format!(" (recorded as {})", record.name));
            }
        }
        out.push('\n');
    }
    out
}

#[async_trait]
impl ManagementCommand for ShowmigrationsCommand {
    fn name(&self) -> &'static str {
        "showmigrations"
    }

    fn help(&self) -> &'static str {
        "Show migration status"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("json")
                .long("json")
                .action(clap::ArgAction::SetTrue)
                .help("Print the status as JSON"),
        )
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), StepwiseError> {
        let mut engine = open_engine(settings, &self.steps).await?;
        let status = engine.status().await?;

        if matches.get_flag("json") {
            let json = serde_json::to_string_pretty(&status).map_err(std::io::Error::from)?;
            println!("{json}");
        } else {
            print!("{}", format_status(&status));
        }
        Ok(())
    }
}
