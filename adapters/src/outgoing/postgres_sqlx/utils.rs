use craftads_application::error::{AppError, AppResult};
use sqlx::postgres::PgRow;
use sqlx::{Decode, Error as SqlxError, PgPool, Postgres, Row, Transaction, Type};
use std::fmt::Display;
use std::str::FromStr;
use std::{future::Future, time::Duration};
use tokio::time::timeout;

pub struct PostgresExecutor {
    timeout: Duration,
}

impl PostgresExecutor {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub async fn execute_with_timeout<T, F, Fut>(
        &self,
        operation: F,
        error_context: &str,
    ) -> AppResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, sqlx::Error>>,
    {
        timeout(self.timeout, operation())
            .await
            .map_err(|_| AppError::StorageUnavailable {
                message: format!("{}: DB timeout", error_context),
            })?
            .map_err(db_error(error_context))
    }

    /// Runs a whole multi-statement unit (usually a transaction) under the
    /// query deadline. A dropped transaction rolls back.
    pub async fn bound<T, Fut>(&self, operation: Fut, error_context: &str) -> AppResult<T>
    where
        Fut: Future<Output = AppResult<T>>,
    {
        timeout(self.timeout, operation)
            .await
            .map_err(|_| AppError::StorageUnavailable {
                message: format!("{}: DB timeout", error_context),
            })?
    }
}

pub async fn begin_transaction(pool: &PgPool) -> AppResult<Transaction<'_, Postgres>> {
    pool.begin()
        .await
        .map_err(db_error("Failed to begin transaction"))
}

pub async fn commit_transaction(tx: Transaction<'_, Postgres>) -> AppResult<()> {
    tx.commit()
        .await
        .map_err(db_error("Failed to commit transaction"))
}

/// Connection loss, pool exhaustion, serialization failures and deadlocks.
/// Everything else, constraint violations included, is a data error.
fn is_transient(e: &SqlxError) -> bool {
    match e {
        SqlxError::Io(_)
        | SqlxError::Tls(_)
        | SqlxError::PoolTimedOut
        | SqlxError::PoolClosed
        | SqlxError::WorkerCrashed => true,
        SqlxError::Database(db) => matches!(
            db.code().as_deref(),
            Some("40001" | "40P01" | "57P01" | "08000" | "08003" | "08006")
        ),
        _ => false,
    }
}

pub fn db_error(context: &str) -> impl FnOnce(SqlxError) -> AppError + '_ {
    move |e| {
        let message = format!("{}: {}", context, e);
        if is_transient(&e) {
            AppError::StorageUnavailable { message }
        } else {
            AppError::DatabaseError { message }
        }
    }
}

pub fn column<'r, T>(row: &'r PgRow, name: &str) -> AppResult<T>
where
    T: Decode<'r, Postgres> + Type<Postgres>,
{
    row.try_get(name).map_err(|e| AppError::DatabaseError {
        message: format!("Failed to get {}: {}", name, e),
    })
}

/// Parses an enum-like text column, treating an unknown value as corrupt data.
pub fn parsed_column<T>(row: &PgRow, name: &str) -> AppResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw: String = column(row, name)?;
    raw.parse().map_err(|e: T::Err| AppError::DatabaseError {
        message: format!("Invalid {} value '{}': {}", name, raw, e),
    })
}

#[cfg(test)]
mod tests {
    use std::io::{Error as IoError, ErrorKind};

    use super::*;

    #[test]
    fn lost_connections_are_transient() {
        let err = db_error("Failed to commit transaction")(SqlxError::Io(IoError::new(
            ErrorKind::ConnectionReset,
            "connection reset by peer",
        )));
        assert!(err.is_transient());

        let err = db_error("Failed to begin transaction")(SqlxError::PoolTimedOut);
        assert!(matches!(err, AppError::StorageUnavailable { .. }));
    }

    #[test]
    fn data_errors_are_not_transient() {
        let err = db_error("Failed to decode row")(SqlxError::RowNotFound);
        assert!(matches!(err, AppError::DatabaseError { .. }));
        assert!(!err.is_transient());

        let err = db_error("Failed to read column")(SqlxError::ColumnNotFound(
            "balance".to_string(),
        ));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn deadline_is_reported_as_unavailable() {
        let executor = PostgresExecutor::new(0);
        let result: AppResult<()> = executor
            .bound(
                async {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok(())
                },
                "Failed to apply ledger mutation",
            )
            .await;

        assert!(matches!(result, Err(AppError::StorageUnavailable { .. })));
    }
}
