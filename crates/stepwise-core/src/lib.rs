//! # stepwise-core
//!
//! Core types, settings, run modes, and error types for the stepwise workspace.
//! This crate has no database dependencies and provides the foundation for all
//! other crates.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`mode`] - The [`MigrateMode`] run mode selector
//! - [`settings`] - Runtime configuration
//! - [`settings_loader`] - Loading settings from TOML, JSON, and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod mode;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use error::{StepwiseError, StepwiseResult};
pub use mode::MigrateMode;
pub use settings::{DatabaseSettings, Settings};
