//! The demo application's migrations, in the order they were written.
//!
//! New migrations are appended to [`steps`]; existing entries are never
//! renamed or reordered once released.

use stepwise::core::StepwiseResult;
use stepwise::db_backends::{DatabaseBackend, Value};
use stepwise::migrations::operations::{BoxFuture, RunSql};
use stepwise::migrations::{ColumnDef, MigrationStep, TableDef};

/// Returns the registered steps.
///
/// # Errors
///
/// Fails when a function-named step cannot derive its name.
pub fn steps() -> StepwiseResult<Vec<MigrationStep>> {
    Ok(vec![
        MigrationStep::create_table(
            "createUsersTable",
            TableDef::new("users")
                .id()
                .timestamps()
                .column(ColumnDef::new("name", "VARCHAR(255)"))
                .column(ColumnDef::new("email", "VARCHAR(255)")),
        ),
        MigrationStep::add_column(
            "addAvatarToUsers",
            "users",
            ColumnDef::new("avatar", "VARCHAR(255)"),
        ),
        MigrationStep::sql(
            "addEmailIndexToUsers",
            ["CREATE UNIQUE INDEX idx_users_on_email ON users (email)"],
            ["DROP INDEX idx_users_on_email"],
        ),
        // Named after the function, so the record reads `seed_admin_user`.
        MigrationStep::from_fn(
            seed_admin_user,
            RunSql::new(["DELETE FROM users WHERE email = 'admin@example.com'"]),
        )?,
    ])
}

fn seed_admin_user(db: &dyn DatabaseBackend) -> BoxFuture<'_, StepwiseResult<()>> {
    Box::pin(async move {
        db.execute(
            "INSERT INTO users (name, email) VALUES (?, ?)",
            &[Value::from("admin"), Value::from("admin@example.com")],
        )
        .await?;
        Ok(())
    })
}
