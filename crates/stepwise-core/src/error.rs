//! Core error types for stepwise.
//!
//! This module provides the [`StepwiseError`] enum shared by every crate in the
//! workspace. Migration failures (setup, conflict, execution, empty rewind,
//! unsynchronized check) are distinct variants so that callers can decide
//! whether to retry, abort, or escalate to an operator.

use thiserror::Error;

/// The primary error type for stepwise.
///
/// Each variant maps to a process exit code via [`StepwiseError::exit_code`],
/// which the CLI uses when a run fails. Library code never terminates the
/// process itself.
#[derive(Error, Debug)]
pub enum StepwiseError {
    // ── Migration errors ─────────────────────────────────────────────

    /// The migration record table could not be created or verified.
    #[error("Setup error: {0}")]
    SetupError(String),

    /// A persisted record does not match the step registered at the same position.
    ///
    /// `registered` is `None` when more records exist than registered steps.
    #[error(
        "Migration conflict at position {position}: recorded '{recorded}', registered '{}'",
        .registered.as_deref().unwrap_or("<none>")
    )]
    Conflict {
        /// Zero-based position of the first mismatch.
        position: usize,
        /// The name stored in the record table.
        recorded: String,
        /// The name of the step registered at that position, if any.
        registered: Option<String>,
    },

    /// A step's forward or backward action failed.
    #[error("Migration '{step}' failed: {message}")]
    ExecutionError {
        /// The name of the failing step.
        step: String,
        /// The underlying failure.
        message: String,
    },

    /// A rollback was requested but no migrations have been applied.
    #[error("No more migration to rollback")]
    EmptyRewind,

    /// A check run found pending or divergent migrations.
    #[error("Database is not synchronized, run `migrate` first")]
    Unsynchronized,

    // ── Database ─────────────────────────────────────────────────────

    /// Raised when a query expected exactly one result but found none.
    #[error("Object does not exist: {0}")]
    DoesNotExist(String),

    /// Raised when a query expected exactly one result but found multiple.
    #[error("Multiple objects returned when one expected: {0}")]
    MultipleObjectsReturned(String),

    /// A generic database error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// An operational database error (connection failure, etc.).
    #[error("Operational error: {0}")]
    OperationalError(String),

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl StepwiseError {
    /// Returns the process exit code associated with this error.
    ///
    /// - `ConfigurationError` -> 2
    /// - `Conflict` -> 3
    /// - `Unsynchronized` -> 4
    /// - `EmptyRewind` -> 5
    /// - `ExecutionError` -> 6
    /// - `SetupError` -> 7
    /// - Everything else -> 1
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::ConfigurationError(_) => 2,
            Self::Conflict { .. } => 3,
            Self::Unsynchronized => 4,
            Self::EmptyRewind => 5,
            Self::ExecutionError { .. } => 6,
            Self::SetupError(_) => 7,
            Self::DoesNotExist(_)
            | Self::MultipleObjectsReturned(_)
            | Self::DatabaseError(_)
            | Self::OperationalError(_)
            | Self::IoError(_) => 1,
        }
    }

    /// Returns `true` for errors that leave the record table diverged from
    /// the registered steps and need an operator to resolve.
    pub const fn requires_intervention(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Wraps an action failure with the name of the step that produced it.
    pub fn execution(step: impl Into<String>, source: impl std::fmt::Display) -> Self {
        Self::ExecutionError {
            step: step.into(),
            message: source.to_string(),
        }
    }
}

/// A convenience type alias for `Result<T, StepwiseError>`.
pub type StepwiseResult<T> = Result<T, StepwiseError>;
