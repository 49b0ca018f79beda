use sqlx::{PgPool, Postgres, Row, Transaction};
use time::OffsetDateTime;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use craftads_application::{
    error::{AppError, AppResult},
    ports::outgoing::credit_store::CreditStorePort,
};
use domain::auth::UserId;
use domain::credits::{
    CreditAccount, CreditTransaction, LedgerEntry, LedgerMutation, TransactionStatus,
    TransactionType,
};

use super::ledger_sql::{self, TRANSACTION_COLUMNS, transaction_from_row};
use super::utils::{PostgresExecutor, begin_transaction, commit_transaction, db_error};

pub const RESERVATION_REFERENCE_TYPE: &str = "reservation";

pub struct PostgresCreditStoreAdapter {
    pool: PgPool,
    executor: PostgresExecutor,
}

impl PostgresCreditStoreAdapter {
    pub fn new(pool: PgPool, query_timeout_secs: u64) -> Self {
        Self {
            pool,
            executor: PostgresExecutor::new(query_timeout_secs),
        }
    }

    async fn apply_in_transaction(&self, mutation: &LedgerMutation) -> AppResult<LedgerEntry> {
        let mut tx = begin_transaction(&self.pool).await?;
        let entry = ledger_sql::apply_mutation(&mut *tx, mutation).await?;
        commit_transaction(tx).await?;
        Ok(entry)
    }

    /// A reservation that is already committed is returned as is, so a retried
    /// commit whose first attempt landed succeeds.
    async fn commit_in_transaction(&self, transaction_id: Uuid) -> AppResult<CreditTransaction> {
        let mut tx = begin_transaction(&self.pool).await?;
        let mut reservation = ledger_sql::lock_reservation(&mut *tx, transaction_id).await?;
        match reservation.status {
            TransactionStatus::Committed => return Ok(reservation),
            TransactionStatus::Released => return Err(ledger_sql::settled_twice(&reservation)),
            TransactionStatus::Pending => {}
        }
        ledger_sql::set_status(&mut *tx, transaction_id, TransactionStatus::Committed).await?;
        commit_transaction(tx).await?;

        reservation.status = TransactionStatus::Committed;
        Ok(reservation)
    }

    /// A reservation that is already released returns its refund row.
    async fn release_in_transaction(
        &self,
        transaction_id: Uuid,
        description: &str,
    ) -> AppResult<LedgerEntry> {
        let mut tx = begin_transaction(&self.pool).await?;
        let reservation = ledger_sql::lock_reservation(&mut *tx, transaction_id).await?;
        match reservation.status {
            TransactionStatus::Released => {
                return ledger_sql::release_refund(
                    &mut *tx,
                    transaction_id,
                    RESERVATION_REFERENCE_TYPE,
                )
                .await;
            }
            TransactionStatus::Committed => return Err(ledger_sql::settled_twice(&reservation)),
            TransactionStatus::Pending => {}
        }

        let entry = Self::refund(&mut tx, &reservation, description).await?;
        commit_transaction(tx).await?;
        Ok(entry)
    }

    /// Releases one stale reservation, or nothing when it was settled since it
    /// was listed.
    async fn sweep_in_transaction(
        &self,
        transaction_id: Uuid,
        description: &str,
    ) -> AppResult<Option<LedgerEntry>> {
        let mut tx = begin_transaction(&self.pool).await?;
        let reservation = ledger_sql::lock_reservation(&mut *tx, transaction_id).await?;
        if reservation.status != TransactionStatus::Pending {
            return Ok(None);
        }

        let entry = Self::refund(&mut tx, &reservation, description).await?;
        commit_transaction(tx).await?;
        Ok(Some(entry))
    }

    async fn refund(
        tx: &mut Transaction<'_, Postgres>,
        reservation: &CreditTransaction,
        description: &str,
    ) -> AppResult<LedgerEntry> {
        ledger_sql::set_status(&mut **tx, reservation.id, TransactionStatus::Released).await?;

        let refund = LedgerMutation::credit(
            reservation.user_id,
            -reservation.amount,
            TransactionType::Refund,
            description,
        )?
        .with_reference(
            Some(reservation.id.to_string()),
            Some(RESERVATION_REFERENCE_TYPE.to_string()),
        );
        ledger_sql::apply_mutation(&mut **tx, &refund).await
    }

    async fn stale_reservation_ids(&self, cutoff: OffsetDateTime) -> AppResult<Vec<Uuid>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(db_error("Failed to acquire connection"))?;
        ledger_sql::stale_reservation_ids(&mut *conn, cutoff).await
    }
}

#[async_trait::async_trait]
impl CreditStorePort for PostgresCreditStoreAdapter {
    #[instrument(skip(self))]
    async fn get_account(&self, user_id: &UserId) -> AppResult<Option<CreditAccount>> {
        let row = self
            .executor
            .execute_with_timeout(
                || {
                    sqlx::query(
                        r"
                    SELECT credits_balance, updated_at
                    FROM users
                    WHERE id = $1
                    ",
                    )
                    .bind(user_id.as_uuid())
                    .fetch_optional(&self.pool)
                },
                &format!("Failed to get credits for user {}", user_id.as_uuid()),
            )
            .await?;

        let Some(record) = row else {
            return Ok(None);
        };

        let balance: i64 = record
            .try_get("credits_balance")
            .map_err(|e| AppError::DatabaseError {
                message: format!("Failed to get credits_balance: {}", e),
            })?;
        let updated_at: OffsetDateTime =
            record
                .try_get("updated_at")
                .map_err(|e| AppError::DatabaseError {
                    message: format!("Failed to get updated_at: {}", e),
                })?;

        Ok(Some(CreditAccount {
            user_id: *user_id,
            balance,
            updated_at,
        }))
    }

    #[instrument(skip(self, mutation), fields(user_id = %mutation.user_id, amount = mutation.amount))]
    async fn apply_mutation(&self, mutation: &LedgerMutation) -> AppResult<LedgerEntry> {
        let entry = self
            .executor
            .bound(
                self.apply_in_transaction(mutation),
                "Failed to apply ledger mutation",
            )
            .await?;

        debug!(
            "Applied {} of {} for user {}, balance now {}",
            entry.transaction.transaction_type,
            entry.transaction.amount,
            mutation.user_id,
            entry.new_balance
        );

        Ok(entry)
    }

    #[instrument(skip(self))]
    async fn commit_reservation(&self, transaction_id: Uuid) -> AppResult<CreditTransaction> {
        self.executor
            .bound(
                self.commit_in_transaction(transaction_id),
                "Failed to commit reservation",
            )
            .await
    }

    #[instrument(skip(self, description))]
    async fn release_reservation(
        &self,
        transaction_id: Uuid,
        description: &str,
    ) -> AppResult<LedgerEntry> {
        let entry = self
            .executor
            .bound(
                self.release_in_transaction(transaction_id, description),
                "Failed to release reservation",
            )
            .await?;

        debug!(
            "Released reservation {}, balance restored to {}",
            transaction_id, entry.new_balance
        );

        Ok(entry)
    }

    #[instrument(skip(self, description))]
    async fn release_stale_reservations(
        &self,
        cutoff: OffsetDateTime,
        description: &str,
    ) -> AppResult<Vec<LedgerEntry>> {
        let ids = self
            .executor
            .bound(
                self.stale_reservation_ids(cutoff),
                "Failed to list stale reservations",
            )
            .await?;

        let mut released = Vec::with_capacity(ids.len());
        for transaction_id in ids {
            let swept = self
                .executor
                .bound(
                    self.sweep_in_transaction(transaction_id, description),
                    "Failed to release stale reservation",
                )
                .await;
            match swept {
                Ok(Some(entry)) => released.push(entry),
                Ok(None) => {}
                Err(err) => warn!("Stale reservation {} left pending: {}", transaction_id, err),
            }
        }

        if !released.is_empty() {
            info!("Released {} stale reservations", released.len());
        }

        Ok(released)
    }

    #[instrument(skip(self))]
    async fn list_transactions(
        &self,
        user_id: &UserId,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<CreditTransaction>> {
        let sql = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM credit_transactions \
             WHERE user_id = $1 ORDER BY created_at DESC, seq DESC LIMIT $2 OFFSET $3"
        );
        let rows = self
            .executor
            .execute_with_timeout(
                || {
                    sqlx::query(&sql)
                        .bind(user_id.as_uuid())
                        .bind(limit)
                        .bind(offset)
                        .fetch_all(&self.pool)
                },
                &format!("Failed to list transactions for user {}", user_id),
            )
            .await?;

        rows.iter().map(transaction_from_row).collect()
    }

    #[instrument(skip(self))]
    async fn count_transactions(&self, user_id: &UserId) -> AppResult<i64> {
        let row = self
            .executor
            .execute_with_timeout(
                || {
                    sqlx::query("SELECT COUNT(*) AS total FROM credit_transactions WHERE user_id = $1")
                        .bind(user_id.as_uuid())
                        .fetch_one(&self.pool)
                },
                &format!("Failed to count transactions for user {}", user_id),
            )
            .await?;

        row.try_get("total").map_err(|e| AppError::DatabaseError {
            message: format!("Failed to get total: {}", e),
        })
    }
}
