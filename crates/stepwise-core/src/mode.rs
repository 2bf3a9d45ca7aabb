//! Run mode selection.
//!
//! [`MigrateMode`] chooses what a migration run does: verify that the
//! database is up to date, apply pending steps, or roll back the most recent
//! step. It is an explicit value handed to the engine rather than process-wide
//! state, and parses from the strings accepted on the command line and in
//! settings files.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StepwiseError;

/// What a migration run should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrateMode {
    /// Fail unless every registered step has been applied. Never mutates.
    #[default]
    Check,
    /// Apply every pending step in registration order.
    Migrate,
    /// Undo the most recently applied step.
    Rollback,
}

impl MigrateMode {
    /// All modes, in the order they are listed in help output.
    pub const ALL: [Self; 3] = [Self::Check, Self::Migrate, Self::Rollback];

    /// Returns the lowercase name of this mode.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Check => "check",
            Self::Migrate => "migrate",
            Self::Rollback => "rollback",
        }
    }

    /// Returns `true` if runs in this mode may change the database.
    pub const fn is_mutating(self) -> bool {
        !matches!(self, Self::Check)
    }
}

impl fmt::Display for MigrateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MigrateMode {
    type Err = StepwiseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "check" => Ok(Self::Check),
            "migrate" | "up" | "forward" => Ok(Self::Migrate),
            "rollback" | "down" | "backward" => Ok(Self::Rollback),
            other => Err(StepwiseError::ConfigurationError(format!(
                "Unknown migrate mode '{other}' (expected check, migrate, or rollback)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_check() {
        assert_eq!(MigrateMode::default(), MigrateMode::Check);
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("MIGRATE".parse::<MigrateMode>().unwrap(), MigrateMode::Migrate);
        assert_eq!(" Rollback ".parse::<MigrateMode>().unwrap(), MigrateMode::Rollback);
        assert_eq!("check".parse::<MigrateMode>().unwrap(), MigrateMode::Check);
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("up".parse::<MigrateMode>().unwrap(), MigrateMode::Migrate);
        assert_eq!("down".parse::<MigrateMode>().unwrap(), MigrateMode::Rollback);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "sideways".parse::<MigrateMode>().unwrap_err();
        assert!(matches!(err, StepwiseError::ConfigurationError(_)));
    }

    #[test]
    fn test_display_round_trips() {
        for mode in MigrateMode::ALL {
            assert_eq!(mode.to_string().parse::<MigrateMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_is_mutating() {
        assert!(!MigrateMode::Check.is_mutating());
        assert!(MigrateMode::Migrate.is_mutating());
        assert!(MigrateMode::Rollback.is_mutating());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&MigrateMode::Rollback).unwrap();
        assert_eq!(json, "\"rollback\"");
        let mode: MigrateMode = serde_json::from_str("\"migrate\"").unwrap();
        assert_eq!(mode, MigrateMode::Migrate);
    }
}
