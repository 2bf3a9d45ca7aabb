//! Settings loading from configuration files.
//!
//! This module provides functions to load [`Settings`] from TOML files, JSON
//! files, and to apply environment variable overrides.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (overriding defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `STEPWISE_DATABASE` | `database.name` |
//! | `STEPWISE_MIGRATIONS_TABLE` | `migrations_table` |
//! | `STEPWISE_MODE` | `mode` |
//! | `STEPWISE_DEBUG` | `debug` |
//! | `STEPWISE_LOG_LEVEL` | `log_level` |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use stepwise_core::settings_loader;
//!
//! let settings = settings_loader::from_file_with_env("stepwise.toml").unwrap();
//! ```

use std::path::Path;

use crate::error::StepwiseError;
use crate::settings::Settings;

/// Loads settings from a TOML string.
///
/// Any fields not present in the TOML keep their default values.
///
/// # Errors
///
/// Returns an error if the TOML is malformed or cannot be deserialized.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, StepwiseError> {
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| StepwiseError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;
    merge_over_defaults(toml_to_json(toml_value), "TOML")
}

/// Loads settings from a JSON string.
///
/// # Errors
///
/// Returns an error if the JSON is malformed or cannot be deserialized.
pub fn from_json_str(json_str: &str) -> Result<Settings, StepwiseError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| StepwiseError::ConfigurationError(format!("Failed to parse JSON: {e}")))?;
    merge_over_defaults(json_value, "JSON")
}

/// Loads settings from a file, choosing the format from its extension
/// (`.json` is JSON, anything else is TOML).
///
/// # Errors
///
/// Returns an error if the file cannot be read or its contents are malformed.
pub fn from_file(path: impl AsRef<Path>) -> Result<Settings, StepwiseError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        StepwiseError::ConfigurationError(format!(
            "Failed to read settings file '{}': {e}",
            path.display()
        ))
    })?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => from_json_str(&content),
        _ => from_toml_str(&content),
    }
}

/// Loads settings from a file and then applies environment variable overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is malformed, or if an
/// environment override holds an invalid value.
pub fn from_file_with_env(path: impl AsRef<Path>) -> Result<Settings, StepwiseError> {
    let mut settings = from_file(path)?;
    apply_env_overrides(&mut settings)?;
    Ok(settings)
}

/// Loads settings from just environment variables (starting from defaults).
///
/// # Errors
///
/// Returns an error if an environment override holds an invalid value.
pub fn from_env() -> Result<Settings, StepwiseError> {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings)?;
    Ok(settings)
}

/// Applies environment variable overrides to a settings struct.
///
/// `STEPWISE_DEBUG` accepts "true"/"1"/"yes" as true, anything else as false.
///
/// # Errors
///
/// Returns [`StepwiseError::ConfigurationError`] if `STEPWISE_MODE` is not a
/// known mode.
pub fn apply_env_overrides(settings: &mut Settings) -> Result<(), StepwiseError> {
    if let Ok(val) = std::env::var("STEPWISE_DATABASE") {
        settings.database.name = val;
    }

    if let Ok(val) = std::env::var("STEPWISE_MIGRATIONS_TABLE") {
        settings.migrations_table = val;
    }

    if let Ok(val) = std::env::var("STEPWISE_MODE") {
        settings.mode = val.parse()?;
    }

    if let Ok(val) = std::env::var("STEPWISE_DEBUG") {
        settings.debug = matches!(val.to_lowercase().as_str(), "true" | "1" | "yes");
    }

    if let Ok(val) = std::env::var("STEPWISE_LOG_LEVEL") {
        settings.log_level = val;
    }

    Ok(())
}

// ============================================================
// Helpers
// ============================================================

fn merge_over_defaults(
    value: serde_json::Value,
    format: &str,
) -> Result<Settings, StepwiseError> {
    let default_json = serde_json::to_value(Settings::default()).map_err(|e| {
        StepwiseError::ConfigurationError(format!("Failed to serialize default settings: {e}"))
    })?;

    let merged = merge_json(default_json, value);
    serde_json::from_value(merged).map_err(|e| {
        StepwiseError::ConfigurationError(format!(
            "Failed to deserialize settings from {format}: {e}"
        ))
    })
}

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => {
            let map: serde_json::Map<String, serde_json::Value> = table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect();
            serde_json::Value::Object(map)
        }
    }
}

/// Deep-merges two JSON values. The `override_val` takes precedence.
fn merge_json(base: serde_json::Value, override_val: serde_json::Value) -> serde_json::Value {
    match (base, override_val) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(override_map)) => {
            for (key, override_v) in override_map {
                let merged = if let Some(base_v) = base_map.remove(&key) {
                    merge_json(base_v, override_v)
                } else {
                    override_v
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, override_val) => override_val,
    }
}
