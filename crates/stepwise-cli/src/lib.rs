//! # stepwise-cli
//!
//! Management commands for applying and rolling back stepwise migrations.
//!
//! This crate provides:
//!
//! - **Command framework** - [`ManagementCommand`] and [`CommandRegistry`]
//! - **Built-in commands** - `migrate`, `rollback`, `check`, `showmigrations`,
//!   and `run --mode <MODE>`
//! - **Entry points** - [`execute_from_args`] and [`main`], which load
//!   settings, install logging, and map failures to process exit codes
//!
//! ## Quick Start
//!
//! ```rust
//! use stepwise_cli::command::CommandRegistry;
//! use stepwise_cli::commands::{register_builtin_commands, step_factory};
//!
//! let mut registry = CommandRegistry::new();
//! register_builtin_commands(&mut registry, &step_factory(Vec::new));
//!
//! let names = registry.list_commands();
//! assert!(names.contains(&"migrate"));
//! assert!(names.contains(&"rollback"));
//! ```

// These clippy lints are intentionally allowed:
// - doc_markdown: backtick requirements for documentation items are too strict
// - missing_const_for_fn: some functions may gain runtime logic later
// - module_name_repetitions: re-exports make module-prefixed names redundant
// - unused_async: command handlers maintain consistent async signatures
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::unused_async)]
#![allow(clippy::format_push_string)]

pub mod command;
pub mod commands;

use std::ffi::OsString;
use std::process::ExitCode;

use stepwise_core::logging::setup_logging;
use stepwise_core::{settings_loader, Settings, StepwiseError};

pub use command::{CommandRegistry, ManagementCommand};
pub use commands::{register_builtin_commands, step_factory, try_step_factory, StepFactory};

/// Builds the settings for one invocation.
///
/// Starts from `--settings` (or the defaults), applies `STEPWISE_*`
/// environment overrides, then the `--database`, `--table`, and
/// `--log-level` flags. Flags take precedence over everything else.
///
/// # Errors
///
/// Returns an error if the settings file cannot be read or parsed, an
/// environment override is invalid, or the result fails validation.
pub fn resolve_settings(matches: &clap::ArgMatches) -> Result<Settings, StepwiseError> {
    let mut settings = match matches.get_one::<String>("settings") {
        Some(path) => settings_loader::from_file_with_env(path)?,
        None => settings_loader::from_env()?,
    };
    if let Some(database) = matches.get_one::<String>("database") {
        settings.database.name.clone_from(database);
    }
    if let Some(table) = matches.get_one::<String>("table") {
        settings.migrations_table.clone_from(table);
    }
    if let Some(level) = matches.get_one::<String>("log_level") {
        settings.log_level.clone_from(level);
    }
    settings.validate()?;
    Ok(settings)
}

/// Parses `args`, resolves settings, installs logging, and runs the selected
/// command.
///
/// `--help` and `--version` print their output and return `Ok`.
///
/// # Errors
///
/// Returns [`StepwiseError::ConfigurationError`] for invalid arguments and
/// whatever the command itself returns.
pub async fn execute_from_args<I, T>(registry: &CommandRegistry, args: I) -> Result<(), StepwiseError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = match registry.build_cli().try_get_matches_from(args) {
        Ok(matches) => matches,
        Err(e) => {
            use clap::error::ErrorKind;
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    e.print()?;
                    Ok(())
                }
                _ => Err(StepwiseError::ConfigurationError(e.to_string())),
            };
        }
    };

    let settings = resolve_settings(&matches)?;
    setup_logging(&settings);
    registry.execute(&matches, &settings).await
}

/// Runs the CLI with the process arguments and returns the exit code.
///
/// Failures are printed to stderr; the exit code comes from
/// [`StepwiseError::exit_code`].
pub async fn main(registry: &CommandRegistry) -> ExitCode {
    match execute_from_args(registry, std::env::args_os()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("Error: {e}");
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}
