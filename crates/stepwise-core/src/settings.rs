//! Settings for stepwise.
//!
//! This module provides the [`Settings`] struct, which holds the database
//! location, the name of the migration record table, the default run mode, and
//! logging options. Use [`settings_loader`](crate::settings_loader) to read
//! them from files and the environment.

use serde::{Deserialize, Serialize};

use crate::error::StepwiseError;
use crate::mode::MigrateMode;

/// The default name of the migration record table.
pub const DEFAULT_MIGRATIONS_TABLE: &str = "schema_migrations";

/// Database connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// The database file path, or `:memory:` for a private in-memory database.
    pub name: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            name: "db.sqlite3".to_string(),
        }
    }
}

impl DatabaseSettings {
    /// Returns `true` if this points at an in-memory database.
    pub fn is_memory(&self) -> bool {
        self.name == ":memory:"
    }
}

/// Runtime configuration.
///
/// # Examples
///
/// ```
/// use stepwise_core::settings::Settings;
/// use stepwise_core::MigrateMode;
///
/// let settings = Settings::default();
/// assert_eq!(settings.migrations_table, "schema_migrations");
/// assert_eq!(settings.mode, MigrateMode::Check);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // ── Database ─────────────────────────────────────────────────────

    /// The database to migrate.
    pub database: DatabaseSettings,
    /// The table holding applied migration records.
    pub migrations_table: String,

    // ── Run ──────────────────────────────────────────────────────────

    /// The mode used when no mode is given on the command line.
    pub mode: MigrateMode,

    // ── Logging ──────────────────────────────────────────────────────

    /// Whether to emit human-readable logs instead of JSON.
    pub debug: bool,
    /// The log level filter (e.g. "info", "debug", "stepwise_migrations=trace").
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: DatabaseSettings::default(),
            migrations_table: DEFAULT_MIGRATIONS_TABLE.to_string(),
            mode: MigrateMode::default(),
            debug: true,
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Checks that the settings can be used to open a database and record
    /// migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StepwiseError::ConfigurationError`] if the database name is
    /// empty or the table name is not a plain SQL identifier.
    pub fn validate(&self) -> Result<(), StepwiseError> {
        if self.database.name.trim().is_empty() {
            return Err(StepwiseError::ConfigurationError(
                "database name must not be empty".to_string(),
            ));
        }
        if !is_identifier(&self.migrations_table) {
            return Err(StepwiseError::ConfigurationError(format!(
                "invalid migrations table name '{}'",
                self.migrations_table
            )));
        }
        Ok(())
    }
}

/// Returns `true` if `name` is a non-empty ASCII identifier that does not
/// start with a digit.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let s = Settings::default();
        assert!(s.debug);
        assert_eq!(s.database.name, "db.sqlite3");
        assert!(!s.database.is_memory());
        assert_eq!(s.migrations_table, DEFAULT_MIGRATIONS_TABLE);
        assert_eq!(s.mode, MigrateMode::Check);
        assert_eq!(s.log_level, "info");
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_database() {
        let mut s = Settings::default();
        s.database.name = "  ".to_string();
        assert!(matches!(s.validate(), Err(StepwiseError::ConfigurationError(_))));
    }

    #[test]
    fn test_validate_bad_table() {
        let mut s = Settings::default();
        s.migrations_table = "drop table; --".to_string();
        assert!(s.validate().is_err());
        s.migrations_table = "1migrations".to_string();
        assert!(s.validate().is_err());
        s.migrations_table = "_applied_steps".to_string();
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("users"));
        assert!(is_identifier("user_2"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("user-2"));
        assert!(!is_identifier("\"users\""));
    }
}
