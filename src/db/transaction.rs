/*!
 * Transaction Helper Utilities
 *
 * Runs a unit of work inside a database transaction: commit on `Ok`,
 * rollback on `Err`, with the caller's error type preserved.
 */

use sea_orm::{DatabaseConnection, DatabaseTransaction, DbErr, TransactionError, TransactionTrait};
use std::future::Future;
use std::pin::Pin;

/// Type alias for boxed future used in transactions
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Execute a function within a database transaction
///
/// # Example
///
/// ```rust,ignore
/// use crate::db::transaction::with_transaction;
///
/// let review = with_transaction(&db, move |txn| {
///     Box::pin(async move {
///         let review = new_review.insert(txn).await?;
///         rating::recompute(txn, product_id).await?;
///         Ok(review)
///     })
/// }).await?;
/// ```
pub async fn with_transaction<F, T, E>(db: &DatabaseConnection, f: F) -> Result<T, E>
where
    F: for<'c> FnOnce(&'c DatabaseTransaction) -> BoxFuture<'c, Result<T, E>> + Send,
    T: Send,
    E: std::fmt::Display + std::fmt::Debug + Send + From<DbErr>,
{
    db.transaction::<F, T, E>(f).await.map_err(|e| match e {
        TransactionError::Connection(db_err) => E::from(db_err),
        TransactionError::Transaction(err) => err,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ServiceError;
    use sea_orm::{ConnectionTrait, Database, Statement};

    async fn scratch_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.expect("connect");
        db.execute_unprepared("CREATE TABLE scratch (id INTEGER PRIMARY KEY)")
            .await
            .expect("create");
        db
    }

    async fn count(db: &DatabaseConnection) -> i64 {
        let row = db
            .query_one(Statement::from_string(
                db.get_database_backend(),
                "SELECT COUNT(*) AS n FROM scratch",
            ))
            .await
            .expect("query")
            .expect("row");
        row.try_get::<i64>("", "n").expect("n")
    }

    #[tokio::test]
    async fn commits_on_success() {
        let db = scratch_db().await;
        let result: Result<(), ServiceError> = with_transaction(&db, |txn| {
            Box::pin(async move {
                txn.execute_unprepared("INSERT INTO scratch (id) VALUES (1)")
                    .await?;
                Ok(())
            })
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(count(&db).await, 1);
    }

    #[tokio::test]
    async fn rolls_back_and_keeps_error_variant() {
        let db = scratch_db().await;
        let result: Result<(), ServiceError> = with_transaction(&db, |txn| {
            Box::pin(async move {
                txn.execute_unprepared("INSERT INTO scratch (id) VALUES (1)")
                    .await?;
                Err(ServiceError::InvalidGrade(9))
            })
        })
        .await;

        assert!(matches!(result, Err(ServiceError::InvalidGrade(9))));
        assert_eq!(count(&db).await, 0);
    }
}
