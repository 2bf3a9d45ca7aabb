//! Transaction helpers.
//!
//! [`atomic()`] runs a closure between `BEGIN` and `COMMIT`, rolling back if
//! the closure fails, so that a group of statements applies all-or-nothing.

use std::future::Future;

use stepwise_core::StepwiseError;

use crate::base::DatabaseBackend;

/// Executes a closure within a transaction.
///
/// The transaction is committed if the closure returns `Ok` and rolled back
/// if it returns `Err`. When the rollback itself fails the original error is
/// returned and the rollback failure is logged.
///
/// # Examples
///
/// ```rust,no_run
/// use stepwise_db_backends::{atomic, DatabaseBackend, SqliteBackend};
///
/// # async fn demo() -> Result<(), stepwise_core::StepwiseError> {
/// let db = SqliteBackend::memory()?;
/// atomic(&db, |tx| async move {
///     tx.execute("CREATE TABLE a (id INTEGER)", &[]).await?;
///     tx.execute("CREATE TABLE b (id INTEGER)", &[]).await?;
///     Ok(())
/// })
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn atomic<'a, F, Fut, T>(db: &'a dyn DatabaseBackend, f: F) -> Result<T, StepwiseError>
where
    F: FnOnce(&'a dyn DatabaseBackend) -> Fut + Send,
    Fut: Future<Output = Result<T, StepwiseError>> + Send,
    T: Send,
{
    db.begin_transaction().await?;

    match f(db).await {
        Ok(result) => {
            db.commit().await?;
            Ok(result)
        }
        Err(e) => {
            if let Err(rollback_err) = db.rollback().await {
                tracing::error!(error = %rollback_err, "rollback failed");
            }
            Err(e)
        }
    }
}
