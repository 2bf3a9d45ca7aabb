//! # stepwise-migrations
//!
//! Migration engine for the stepwise workspace. Tracks an ordered list of
//! named, reversible steps against the records of steps already applied to a
//! database, and drives forward and rollback runs one step at a time.
//!
//! ## Architecture
//!
//! - [`MigrationStep`] is a name plus a forward and a backward [`Action`].
//! - [`RecordStore`] persists one [`MigrationRecord`] per applied step.
//! - [`MigrationEngine`] reconciles records against steps and runs them.
//! - [`SchemaEditor`] turns table, column, and index definitions into DDL.
//!
//! ## Module Overview
//!
//! - [`migration`] - `MigrationStep`, step name derivation and validation
//! - [`operations`] - `Action` trait and the built-in actions
//! - [`schema_editor`] - `SchemaEditor` trait and the SQLite implementation
//! - [`recorder`] - `RecordStore` trait, database and in-memory stores
//! - [`engine`] - `MigrationEngine`, `RunOutcome`, `StepStatus`

// Clippy overrides appropriate for a DDL generation / migration crate.
#![allow(clippy::format_push_string)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::struct_excessive_bools)]

pub mod engine;
pub mod migration;
pub mod operations;
pub mod recorder;
pub mod schema_editor;

// Re-export key types at the crate root.
pub use engine::{MigrationEngine, RunOutcome, StepState, StepStatus};
pub use migration::{derive_step_name, MigrationStep};
pub use operations::{Action, FnAction, RunSql};
pub use recorder::{DatabaseRecordStore, InMemoryRecordStore, MigrationRecord, RecordStore};
pub use schema_editor::{ColumnDef, IndexDef, SchemaEditor, SqliteSchemaEditor, TableDef};
