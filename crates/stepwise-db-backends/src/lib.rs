//! # stepwise-db-backends
//!
//! Database backend implementations for stepwise. Provides the backend-agnostic
//! [`Value`] and [`Row`] types, the [`DatabaseBackend`] trait consumed by the
//! migration engine, transaction helpers, and table/column introspection.
//!
//! Supported backends:
//! - `SQLite` (feature `sqlite`, enabled by default)

// These clippy lints are intentionally allowed:
// - result_large_err: StepwiseError is the workspace-wide error type
// - doc_markdown: backtick requirements for documentation items are too strict
// - significant_drop_tightening: false positives with async Mutex guards
#![allow(clippy::result_large_err)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::significant_drop_tightening)]

pub mod base;
pub mod row;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod transactions;
pub mod value;

pub use base::{DatabaseBackend, DatabaseConfig};
pub use row::{FromValue, Row};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteBackend;
pub use transactions::atomic;
pub use value::Value;

/// Opens the backend described by `config`.
///
/// # Errors
///
/// Returns an error if the database cannot be opened.
#[cfg(feature = "sqlite")]
pub fn connect(
    config: &DatabaseConfig,
) -> Result<std::sync::Arc<dyn DatabaseBackend>, stepwise_core::StepwiseError> {
    Ok(std::sync::Arc::new(SqliteBackend::open_with_config(config)?))
}
