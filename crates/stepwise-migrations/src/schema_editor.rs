//! Schema editor implementations for DDL text.
//!
//! The [`SchemaEditor`] trait turns explicit table, column, and index
//! definitions into backend-specific statements. Definitions are written by
//! the migration author; nothing here derives them from Rust types.

use stepwise_core::StepwiseError;

/// A column definition used by [`CreateTable`](crate::operations::CreateTable)
/// and [`AddColumn`](crate::operations::AddColumn).
///
/// # Examples
///
/// ```
/// use stepwise_migrations::schema_editor::ColumnDef;
///
/// let email = ColumnDef::new("email", "VARCHAR(255)").not_null().unique();
/// assert_eq!(email.name, "email");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    /// The column name.
    pub name: String,
    /// The SQL type, written as the backend expects it (e.g. `TEXT`, `VARCHAR(255)`).
    pub sql_type: String,
    /// Whether NULL values are allowed.
    pub nullable: bool,
    /// Whether this column is the primary key.
    pub primary_key: bool,
    /// Whether the primary key auto-increments.
    pub autoincrement: bool,
    /// Whether values must be unique.
    pub unique: bool,
    /// A raw SQL default expression (e.g. `0`, `'active'`, `CURRENT_TIMESTAMP`).
    pub default: Option<String>,
}

impl ColumnDef {
    /// Creates a nullable column with the given SQL type.
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            nullable: true,
            primary_key: false,
            autoincrement: false,
            unique: false,
            default: None,
        }
    }

    /// Creates an auto-incrementing integer primary key named `id`.
    pub fn id() -> Self {
        Self {
            primary_key: true,
            autoincrement: true,
            nullable: false,
            ..Self::new("id", "INTEGER")
        }
    }

    /// Marks the column `NOT NULL`.
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Marks the column `UNIQUE`.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Marks the column as the primary key.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    /// Sets a raw SQL default expression.
    pub fn default_sql(mut self, expr: impl Into<String>) -> Self {
        self.default = Some(expr.into());
        self
    }
}

/// A table definition used by [`CreateTable`](crate::operations::CreateTable).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDef {
    /// The table name.
    pub name: String,
    /// The columns, in declaration order.
    pub columns: Vec<ColumnDef>,
}

impl TableDef {
    /// Creates a table definition with no columns.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Adds a column.
    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    /// Adds an auto-incrementing `id` primary key.
    pub fn id(self) -> Self {
        self.column(ColumnDef::id())
    }

    /// Adds `created_at`, `updated_at`, and a nullable `deleted_at` column.
    pub fn timestamps(self) -> Self {
        self.column(
            ColumnDef::new("created_at", "DATETIME")
                .not_null()
                .default_sql("CURRENT_TIMESTAMP"),
        )
        .column(
            ColumnDef::new("updated_at", "DATETIME")
                .not_null()
                .default_sql("CURRENT_TIMESTAMP"),
        )
        .column(ColumnDef::new("deleted_at", "DATETIME"))
    }
}

/// An index definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDef {
    /// The index name.
    pub name: String,
    /// The indexed columns, in order.
    pub columns: Vec<String>,
    /// Whether this is a unique index.
    pub unique: bool,
}

impl IndexDef {
    /// Creates a non-unique index over `columns`.
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            unique: false,
        }
    }

    /// Marks the index unique.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// Generates DDL SQL for schema operations.
///
/// The trait returns `Vec<String>` because some operations need more than one
/// statement on some backends.
pub trait SchemaEditor: Send + Sync {
    /// Returns the vendor this editor targets (matches
    /// [`DatabaseBackend::vendor`](stepwise_db_backends::DatabaseBackend::vendor)).
    fn vendor(&self) -> &'static str;

    /// Quotes an identifier.
    fn quote_name(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    /// Generates the SQL fragment for a column definition (name, type, constraints).
    fn column_sql(&self, column: &ColumnDef) -> String;

    /// Generates `CREATE TABLE` DDL.
    fn create_table(&self, table: &TableDef) -> Vec<String>;

    /// Generates `DROP TABLE` DDL.
    fn drop_table(&self, table: &str) -> Vec<String>;

    /// Generates `ALTER TABLE ... ADD COLUMN` DDL.
    fn add_column(&self, table: &str, column: &ColumnDef) -> Vec<String>;

    /// Generates `ALTER TABLE ... DROP COLUMN` DDL.
    fn drop_column(&self, table: &str, column: &str) -> Vec<String>;

    /// Generates `CREATE INDEX` DDL. Creating an index that exists is a no-op.
    fn create_index(&self, table: &str, index: &IndexDef) -> Vec<String>;

    /// Generates `DROP INDEX` DDL. Dropping a missing index is a no-op.
    fn drop_index(&self, index: &str) -> Vec<String>;
}

// ── SQLite ───────────────────────────────────────────────────────────────

/// Schema editor for SQLite databases.
///
/// Requires SQLite 3.35 or newer for `DROP COLUMN`; the bundled library
/// satisfies this.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteSchemaEditor;

impl SchemaEditor for SqliteSchemaEditor {
    fn vendor(&self) -> &'static str {
        "sqlite"
    }

    fn column_sql(&self, column: &ColumnDef) -> String {
        let mut sql = format!("{} {}", self.quote_name(&column.name), column.sql_type);
        if column.primary_key {
            sql.push_str(" PRIMARY KEY");
            if column.autoincrement {
                sql.push_str(" AUTOINCREMENT");
            }
        } else if !column.nullable {
            sql.push_str(" NOT NULL");
        }
        if column.unique && !column.primary_key {
            sql.push_str(" UNIQUE");
        }
        if let Some(default) = &column.default {
            sql.push_str(" DEFAULT ");
            // Expressions other than literals and keywords must be parenthesized.
            if default.contains('(') {
                sql.push('(');
                sql.push_str(default);
                sql.push(')');
            } else {
                sql.push_str(default);
            }
        }
        sql
    }

    fn create_table(&self, table: &TableDef) -> Vec<String> {
        let columns: Vec<String> = table.columns.iter().map(|c| self.column_sql(c)).collect();
        vec![format!(
            "CREATE TABLE {} ({})",
            self.quote_name(&table.name),
            columns.join(", ")
        )]
    }

    fn drop_table(&self, table: &str) -> Vec<String> {
        vec![format!("DROP TABLE {}", self.quote_name(table))]
    }

    fn add_column(&self, table: &str, column: &ColumnDef) -> Vec<String> {
        vec![format!(
            "ALTER TABLE {} ADD COLUMN {}",
            self.quote_name(table),
            self.column_sql(column)
        )]
    }

    fn drop_column(&self, table: &str, column: &str) -> Vec<String> {
        vec![format!(
            "ALTER TABLE {} DROP COLUMN {}",
            self.quote_name(table),
            self.quote_name(column)
        )]
    }

    fn create_index(&self, table: &str, index: &IndexDef) -> Vec<String> {
        let columns: Vec<String> = index.columns.iter().map(|c| self.quote_name(c)).collect();
        vec![format!(
            "CREATE {}INDEX IF NOT EXISTS {} ON {} ({})",
            if index.unique { "UNIQUE " } else { "" },
            self.quote_name(&index.name),
            self.quote_name(table),
            columns.join(", ")
        )]
    }

    fn drop_index(&self, index: &str) -> Vec<String> {
        vec![format!("DROP INDEX IF EXISTS {}", self.quote_name(index))]
    }
}

/// Returns the schema editor for a backend vendor name.
///
/// # Errors
///
/// Returns [`StepwiseError::ConfigurationError`] for vendors without an editor.
pub fn for_vendor(vendor: &str) -> Result<Box<dyn SchemaEditor>, StepwiseError> {
    match vendor {
        "sqlite" => Ok(Box::new(SqliteSchemaEditor)),
        other => Err(StepwiseError::ConfigurationError(format!(
            "No schema editor for database vendor '{other}'"
        ))),
    }
}
