//! Subcommand plumbing for the `stepwise` binary.
//!
//! A [`ManagementCommand`] is one subcommand: a name, a line of help, optional
//! extra arguments and an async handler that receives the resolved
//! [`Settings`]. A [`CommandRegistry`] owns the commands, turns them into a
//! clap parser with the shared database options, and dispatches the parsed
//! subcommand.
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use stepwise_cli::command::{CommandRegistry, ManagementCommand};
//! use stepwise_core::{Settings, StepwiseError};
//!
//! struct WhereCommand;
//!
//! #[async_trait]
//! impl ManagementCommand for WhereCommand {
//!     fn name(&self) -> &str { "where" }
//!     fn help(&self) -> &str { "Print the configured database" }
//!
//!     async fn handle(&self, _: &clap::ArgMatches, settings: &Settings) -> Result<(), StepwiseError> {
//!         println!("{}", settings.database.name);
//!         Ok(())
//!     }
//! }
//!
//! let mut registry = CommandRegistry::new();
//! registry.register(Box::new(WhereCommand));
//! ```

use std::collections::BTreeMap;

use async_trait::async_trait;
use stepwise_core::{Settings, StepwiseError};

/// One `stepwise` subcommand.
#[async_trait]
pub trait ManagementCommand: Send + Sync {
    /// Subcommand name as typed on the command line.
    fn name(&self) -> &str;

    /// One-line description shown in `--help`.
    fn help(&self) -> &str;

    /// Declares arguments specific to this subcommand.
    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd
    }

    /// Runs the subcommand against the resolved settings.
    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), StepwiseError>;
}

/// Subcommands keyed by name, kept in name order.
#[derive(Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, Box<dyn ManagementCommand>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `command`, replacing any earlier command with the same name.
    pub fn register(&mut self, command: Box<dyn ManagementCommand>) {
        self.commands.insert(command.name().to_string(), command);
    }

    pub fn get(&self, name: &str) -> Option<&dyn ManagementCommand> {
        self.commands.get(name).map(AsRef::as_ref)
    }

    /// Registered names in sorted order.
    pub fn list_commands(&self) -> Vec<&str> {
        self.commands.keys().map(String::as_str).collect()
    }

    /// Builds the parser: one subcommand per registered command plus the
    /// global `--settings`, `--database`, `--table` and `--log-level`
    /// options, accepted on either side of the subcommand.
    pub fn build_cli(&self) -> clap::Command {
        let app = clap::Command::new("stepwise")
            .about("Apply and roll back ordered database migrations")
            .version(env!("CARGO_PKG_VERSION"))
            .subcommand_required(true)
            .arg(global_option("settings", "settings", "PATH", "Settings file (.toml or .json)"))
            .arg(global_option("database", "database", "NAME", "SQLite database path, or :memory:"))
            .arg(global_option("table", "table", "NAME", "Name of the migration record table"))
            .arg(global_option(
                "log_level",
                "log-level",
                "FILTER",
                "Log filter, e.g. info or stepwise_migrations=debug",
            ));

        self.commands.iter().fold(app, |app, (name, command)| {
            // clap wants 'static names; the registry is built once per process.
            let name: &'static str = Box::leak(name.clone().into_boxed_str());
            let sub = clap::Command::new(name).about(command.help().to_string());
            app.subcommand(command.add_arguments(sub))
        })
    }

    /// Hands the parsed subcommand's matches to its handler.
    ///
    /// # Errors
    ///
    /// Returns [`StepwiseError::ConfigurationError`] when no subcommand was
    /// parsed or its name is unknown, otherwise whatever the handler returns.
    pub async fn execute(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), StepwiseError> {
        let Some((name, sub_matches)) = matches.subcommand() else {
            return Err(StepwiseError::ConfigurationError(
                "No subcommand specified".to_string(),
            ));
        };
        let command = self.get(name).ok_or_else(|| {
            StepwiseError::ConfigurationError(format!("Unknown command: {name}"))
        })?;

        tracing::debug!(command = name, "dispatching");
        command.handle(sub_matches, settings).await
    }
}

fn global_option(
    id: &'static str,
    long: &'static str,
    value_name: &'static str,
    help: &'static str,
) -> clap::Arg {
    clap::Arg::new(id)
        .long(long)
        .global(true)
        .value_name(value_name)
        .help(help)
}
