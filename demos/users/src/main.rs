//! # stepwise users demo
//!
//! A small application that owns a `users` table and manages its schema with
//! stepwise.
//!
//! ## Running
//!
//! ```bash
//! cargo run -p users-demo -- --database demo.sqlite3 migrate
//! cargo run -p users-demo -- --database demo.sqlite3 showmigrations
//! cargo run -p users-demo -- --database demo.sqlite3 rollback
//! cargo run -p users-demo -- --database demo.sqlite3 run --mode check
//! ```

mod migrations;

use std::process::ExitCode;

use stepwise::cli::{register_builtin_commands, try_step_factory, CommandRegistry};

#[tokio::main]
async fn main() -> ExitCode {
    let mut registry = CommandRegistry::new();
    register_builtin_commands(&mut registry, &try_step_factory(migrations::steps));
    stepwise::cli::main(&registry).await
}
