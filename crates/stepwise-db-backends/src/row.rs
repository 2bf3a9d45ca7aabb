//! Result rows.
//!
//! [`Row`] holds a list of column names and their values and provides typed
//! access through [`FromValue`].

use stepwise_core::StepwiseError;

use crate::value::Value;

/// A generic database row returned by [`DatabaseBackend::query`](crate::DatabaseBackend::query).
#[derive(Debug, Clone)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Creates a new row from column names and values.
    ///
    /// # Panics
    ///
    /// Panics if the number of columns does not match the number of values.
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        assert_eq!(
            columns.len(),
            values.len(),
            "Row column count must match value count"
        );
        Self { columns, values }
    }

    /// Returns the column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Gets a typed value by column name.
    ///
    /// # Errors
    ///
    /// Returns an error if the column does not exist or the value cannot be
    /// converted to the requested type.
    pub fn get<T: FromValue>(&self, column: &str) -> Result<T, StepwiseError> {
        let idx = self
            .columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| {
                StepwiseError::DatabaseError(format!("Column '{column}' not found in row"))
            })?;
        T::from_value(&self.values[idx])
    }

    /// Gets a typed value by column index.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of bounds or the value cannot be
    /// converted to the requested type.
    pub fn get_by_index<T: FromValue>(&self, idx: usize) -> Result<T, StepwiseError> {
        let value = self.values.get(idx).ok_or_else(|| {
            StepwiseError::DatabaseError(format!(
                "Column index {idx} out of bounds (row has {} columns)",
                self.values.len()
            ))
        })?;
        T::from_value(value)
    }
}

/// Trait for converting a [`Value`] to a concrete Rust type.
pub trait FromValue: Sized {
    /// Attempts to convert a value reference to this type.
    fn from_value(value: &Value) -> Result<Self, StepwiseError>;
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, StepwiseError> {
        match value {
            Value::Int(i) => Ok(*i),
            _ => Err(StepwiseError::DatabaseError(format!(
                "Expected Int, got {value:?}"
            ))),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, StepwiseError> {
        match value {
            Value::Bool(b) => Ok(*b),
            Value::Int(i) => Ok(*i != 0),
            _ => Err(StepwiseError::DatabaseError(format!(
                "Expected Bool, got {value:?}"
            ))),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, StepwiseError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            _ => Err(StepwiseError::DatabaseError(format!(
                "Expected String, got {value:?}"
            ))),
        }
    }
}

impl FromValue for chrono::NaiveDateTime {
    fn from_value(value: &Value) -> Result<Self, StepwiseError> {
        match value {
            Value::DateTime(dt) => Ok(*dt),
            // SQLite stores CURRENT_TIMESTAMP as text.
            Value::String(s) => chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .map_err(|e| {
                    StepwiseError::DatabaseError(format!("Invalid timestamp '{s}': {e}"))
                }),
            _ => Err(StepwiseError::DatabaseError(format!(
                "Expected DateTime, got {value:?}"
            ))),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, StepwiseError> {
        Ok(value.clone())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, StepwiseError> {
        match value {
            Value::Null => Ok(None),
            _ => T::from_value(value).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Row {
        Row::new(
            vec!["id".into(), "name".into(), "created_at".into(), "note".into()],
            vec![
                Value::Int(1),
                Value::from("createUsersTable"),
                Value::from("2024-05-01 12:30:00"),
                Value::Null,
            ],
        )
    }

    #[test]
    fn test_get_typed() {
        let row = sample();
        assert_eq!(row.get::<i64>("id").unwrap(), 1);
        assert_eq!(row.get::<String>("name").unwrap(), "createUsersTable");
        assert_eq!(row.get::<Option<String>>("note").unwrap(), None);
        assert_eq!(row.len(), 4);
        assert!(!row.is_empty());
    }

    #[test]
    fn test_get_timestamp_from_text() {
        let row = sample();
        let ts = row.get::<chrono::NaiveDateTime>("created_at").unwrap();
        assert_eq!(ts.to_string(), "2024-05-01 12:30:00");
    }

    #[test]
    fn test_get_missing_column() {
        let row = sample();
        assert!(row.get::<i64>("missing").is_err());
    }

    #[test]
    fn test_get_wrong_type() {
        let row = sample();
        assert!(row.get::<i64>("name").is_err());
    }

    #[test]
    fn test_get_by_index_out_of_bounds() {
        let row = sample();
        assert_eq!(row.get_by_index::<i64>(0).unwrap(), 1);
        assert!(row.get_by_index::<i64>(9).is_err());
    }

    #[test]
    #[should_panic(expected = "column count must match")]
    fn test_new_mismatched_lengths() {
        let _ = Row::new(vec!["a".into()], vec![]);
    }
}
