//! Runs the management commands end to end against a SQLite file.

use std::sync::Arc;

use stepwise_cli::commands::{register_builtin_commands, step_factory, StepFactory};
use stepwise_cli::{execute_from_args, CommandRegistry};
use stepwise_core::StepwiseError;
use stepwise_db_backends::{DatabaseBackend, SqliteBackend};
use stepwise_migrations::{ColumnDef, MigrationStep, TableDef};

fn user_steps() -> Vec<MigrationStep> {
    vec![
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
    ]
}

fn registry(steps: &StepFactory) -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    register_builtin_commands(&mut registry, steps);
    registry
}

struct Harness {
    _dir: tempfile::TempDir,
    db_path: String,
}

impl Harness {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("cli.sqlite3").to_string_lossy().to_string();
        Self { _dir: dir, db_path }
    }

    async fn run(&self, registry: &CommandRegistry, args: &[&str]) -> Result<(), StepwiseError> {
        let mut argv = vec!["stepwise", "--database", self.db_path.as_str()];
        argv.extend_from_slice(args);
        execute_from_args(registry, argv).await
    }

    async fn recorded(&self) -> Vec<String> {
        let db: Arc<dyn DatabaseBackend> = Arc::new(SqliteBackend::open(&self.db_path).unwrap());
        db.query("SELECT name FROM schema_migrations ORDER BY id", &[])
            .await
            .unwrap()
            .iter()
            .map(|row| row.get::<String>("name").unwrap())
            .collect()
    }
}

#[tokio::test]
async fn test_check_migrate_rollback_cycle() {
    let harness = Harness::new();
    let registry = registry(&step_factory(user_steps));

    let err = harness.run(&registry, &["check"]).await.unwrap_err();
    assert_eq!(err.exit_code(), 4);

    harness.run(&registry, &["migrate"]).await.unwrap();
    assert_eq!(
        harness.recorded().await,
        vec!["createUsersTable", "addAvatarToUsers", "addEmailIndexToUsers"]
    );
    harness.run(&registry, &["check"]).await.unwrap();
    // A second migrate is a no-op.
    harness.run(&registry, &["migrate"]).await.unwrap();

    harness.run(&registry, &["rollback"]).await.unwrap();
    assert_eq!(
        harness.recorded().await,
        vec!["createUsersTable", "addAvatarToUsers"]
    );

    harness
        .run(&registry, &["rollback", "--steps", "5"])
        .await
        .unwrap();
    assert!(harness.recorded().await.is_empty());
}

#[tokio::test]
async fn test_run_with_mode_flag() {
    let harness = Harness::new();
    let registry = registry(&step_factory(user_steps));

    harness.run(&registry, &["run", "--mode", "migrate"]).await.unwrap();
    assert_eq!(harness.recorded().await.len(), 3);

    harness.run(&registry, &["run", "--mode", "rollback"]).await.unwrap();
    assert_eq!(harness.recorded().await.len(), 2);

    // No flag means check, which now fails.
    let err = harness.run(&registry, &["run"]).await.unwrap_err();
    assert!(matches!(err, StepwiseError::Unsynchronized));

    let err = harness
        .run(&registry, &["run", "--mode", "sideways"])
        .await
        .unwrap_err();
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_conflict_exit_code() {
    let harness = Harness::new();
    harness
        .run(&registry(&step_factory(user_steps)), &["migrate"])
        .await
        .unwrap();

    // A build where the second step was replaced.
    let diverged = step_factory(|| {
        let mut steps = user_steps();
        steps[1] = MigrationStep::add_column(
            "addBioToUsers",
            "users",
            ColumnDef::new("bio", "TEXT"),
        );
        steps
    });
    let registry = registry(&diverged);

    for command in ["migrate", "rollback"] {
        let err = harness.run(&registry, &[command]).await.unwrap_err();
        assert_eq!(err.exit_code(), 3, "{command}");
    }
    assert_eq!(harness.recorded().await.len(), 3);

    harness.run(&registry, &["showmigrations"]).await.unwrap();
    harness
        .run(&registry, &["showmigrations", "--json"])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_custom_table_flag() {
    let harness = Harness::new();
    let registry = registry(&step_factory(user_steps));
    harness
        .run(&registry, &["migrate", "--table", "applied_steps"])
        .await
        .unwrap();

    let db = SqliteBackend::open(&harness.db_path).unwrap();
    assert!(db.has_table("applied_steps").await.unwrap());
    assert!(!db.has_table("schema_migrations").await.unwrap());
}

#[tokio::test]
async fn test_rollback_on_empty_database_is_not_an_error() {
    let harness = Harness::new();
    let registry = registry(&step_factory(user_steps));
    harness.run(&registry, &["rollback"]).await.unwrap();
    assert!(harness.recorded().await.is_empty());
}
