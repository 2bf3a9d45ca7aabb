//! # stepwise
//!
//! Ordered, reversible schema migrations with conflict detection.
//!
//! This is the meta-crate that re-exports the workspace crates. Depend on
//! `stepwise` to get everything, or on individual crates for finer-grained
//! control.
//!
//! ```rust,no_run
//! use stepwise::migrations::{MigrationStep, TableDef};
//! use stepwise::cli::{register_builtin_commands, step_factory, CommandRegistry};
//!
//! fn steps() -> Vec<MigrationStep> {
//!     vec![MigrationStep::create_table("createUsersTable", TableDef::new("users").id())]
//! }
//!
//! #[tokio::main]
//! async fn main() -> std::process::ExitCode {
//!     let mut registry = CommandRegistry::new();
//!     register_builtin_commands(&mut registry, &step_factory(steps));
//!     stepwise::cli::main(&registry).await
//! }
//! ```

/// Core types, settings, run modes, logging, and error types.
pub use stepwise_core as core;

/// Database backends: the backend trait and the SQLite driver.
pub use stepwise_db_backends as db_backends;

/// Migration steps, record stores, and the migration engine.
#[cfg(feature = "migrations")]
pub use stepwise_migrations as migrations;

/// Management commands (CLI).
#[cfg(feature = "cli")]
pub use stepwise_cli as cli;

// Re-export the types nearly every user touches.
pub use stepwise_core::{MigrateMode, Settings, StepwiseError, StepwiseResult};
#[cfg(feature = "migrations")]
pub use stepwise_migrations::{MigrationEngine, MigrationStep, RunOutcome};

/// Third-party crates re-exported so that applications use matching versions.
pub mod reexports {
    pub use async_trait;
    pub use tokio;
    pub use tracing;
}
