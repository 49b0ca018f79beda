use sqlx::PgPool;
use sqlx::postgres::PgRow;
use tracing::{debug, instrument};
use uuid::Uuid;

use craftads_application::{
    error::{AppError, AppResult},
    ports::outgoing::payment_store::PaymentStorePort,
};
use domain::auth::UserId;
use domain::credits::{CreditPackage, LedgerEntry, LedgerMutation};
use domain::payment::{Payment, PaymentStatus};

use super::ledger_sql;
use super::utils::{
    PostgresExecutor, begin_transaction, column, commit_transaction, db_error, parsed_column,
};

const PACKAGE_COLUMNS: &str = "id, name, description, credit_amount, price_cents, currency, \
     is_active, is_featured, sort_order";

const PAYMENT_COLUMNS: &str = "id, user_id, package_id, provider, provider_payment_id, \
     amount_cents, currency, status, credits_purchased, created_at, updated_at";

fn package_from_row(row: &PgRow) -> AppResult<CreditPackage> {
    Ok(CreditPackage {
        id: column(row, "id")?,
        name: column(row, "name")?,
        description: column(row, "description")?,
        credit_amount: column(row, "credit_amount")?,
        price_cents: column(row, "price_cents")?,
        currency: column(row, "currency")?,
        is_active: column(row, "is_active")?,
        is_featured: column(row, "is_featured")?,
        sort_order: column(row, "sort_order")?,
    })
}

fn payment_from_row(row: &PgRow) -> AppResult<Payment> {
    Ok(Payment {
        id: column(row, "id")?,
        user_id: UserId::from_uuid(column(row, "user_id")?),
        package_id: column(row, "package_id")?,
        provider: column(row, "provider")?,
        provider_payment_id: column(row, "provider_payment_id")?,
        amount_cents: column(row, "amount_cents")?,
        currency: column(row, "currency")?,
        status: parsed_column::<PaymentStatus>(row, "status")?,
        credits_purchased: column(row, "credits_purchased")?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}

fn not_pending() -> AppError {
    AppError::ValidationError {
        message: "Payment is not pending".to_string(),
    }
}

pub struct PostgresPaymentStoreAdapter {
    pool: PgPool,
    executor: PostgresExecutor,
}

impl PostgresPaymentStoreAdapter {
    pub fn new(pool: PgPool, query_timeout_secs: u64) -> Self {
        Self {
            pool,
            executor: PostgresExecutor::new(query_timeout_secs),
        }
    }

    async fn complete_in_transaction(
        &self,
        payment_id: Uuid,
        provider_payment_id: Option<&str>,
        credit: &LedgerMutation,
    ) -> AppResult<LedgerEntry> {
        let mut tx = begin_transaction(&self.pool).await?;

        // The credit row is written in the same transaction as the status flip,
        // so finding it means an earlier attempt already completed the payment.
        if let Some(existing) = ledger_sql::find_transaction(&mut *tx, credit.id).await? {
            return Ok(LedgerEntry {
                new_balance: existing.balance_after,
                transaction: existing,
            });
        }

        let updated = sqlx::query(
            r"
            UPDATE payments
            SET status = 'completed', provider_payment_id = $2, updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            ",
        )
        .bind(payment_id)
        .bind(provider_payment_id)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to complete payment"))?;

        if updated.rows_affected() == 0 {
            return Err(not_pending());
        }

        let entry = ledger_sql::apply_mutation(&mut *tx, credit).await?;
        commit_transaction(tx).await?;
        Ok(entry)
    }
}

#[async_trait::async_trait]
impl PaymentStorePort for PostgresPaymentStoreAdapter {
    #[instrument(skip(self))]
    async fn list_active_packages(&self) -> AppResult<Vec<CreditPackage>> {
        let sql = format!(
            "SELECT {PACKAGE_COLUMNS} FROM credit_packages WHERE is_active ORDER BY sort_order, name"
        );
        let rows = self
            .executor
            .execute_with_timeout(
                || sqlx::query(&sql).fetch_all(&self.pool),
                "Failed to list credit packages",
            )
            .await?;

        rows.iter().map(package_from_row).collect()
    }

    #[instrument(skip(self))]
    async fn find_package(&self, package_id: Uuid) -> AppResult<Option<CreditPackage>> {
        let sql = format!("SELECT {PACKAGE_COLUMNS} FROM credit_packages WHERE id = $1");
        let row = self
            .executor
            .execute_with_timeout(
                || sqlx::query(&sql).bind(package_id).fetch_optional(&self.pool),
                &format!("Failed to find package {}", package_id),
            )
            .await?;

        row.as_ref().map(package_from_row).transpose()
    }

    #[instrument(skip(self, payment), fields(payment_id = %payment.id))]
    async fn create_payment(&self, payment: &Payment) -> AppResult<()> {
        self.executor
            .execute_with_timeout(
                || {
                    sqlx::query(
                        r"
                    INSERT INTO payments
                        (id, user_id, package_id, provider, provider_payment_id, amount_cents,
                         currency, status, credits_purchased, created_at, updated_at)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                    ",
                    )
                    .bind(payment.id)
                    .bind(payment.user_id.as_uuid())
                    .bind(payment.package_id)
                    .bind(payment.provider.as_str())
                    .bind(payment.provider_payment_id.as_deref())
                    .bind(payment.amount_cents)
                    .bind(payment.currency.as_str())
                    .bind(payment.status.as_str())
                    .bind(payment.credits_purchased)
                    .bind(payment.created_at)
                    .bind(payment.updated_at)
                    .execute(&self.pool)
                },
                &format!("Failed to create payment {}", payment.id),
            )
            .await?;

        debug!(
            "Created {} payment {} for user {}",
            payment.provider, payment.id, payment.user_id
        );

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_payment(&self, payment_id: Uuid) -> AppResult<Option<Payment>> {
        let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1");
        let row = self
            .executor
            .execute_with_timeout(
                || sqlx::query(&sql).bind(payment_id).fetch_optional(&self.pool),
                &format!("Failed to find payment {}", payment_id),
            )
            .await?;

        row.as_ref().map(payment_from_row).transpose()
    }

    #[instrument(skip(self, credit))]
    async fn complete_payment(
        &self,
        payment_id: Uuid,
        provider_payment_id: Option<&str>,
        credit: &LedgerMutation,
    ) -> AppResult<LedgerEntry> {
        let entry = self
            .executor
            .bound(
                self.complete_in_transaction(payment_id, provider_payment_id, credit),
                "Failed to complete payment",
            )
            .await?;

        debug!(
            "Completed payment {}, balance now {}",
            payment_id, entry.new_balance
        );

        Ok(entry)
    }

    #[instrument(skip(self))]
    async fn fail_payment(
        &self,
        payment_id: Uuid,
        provider_payment_id: Option<&str>,
    ) -> AppResult<()> {
        let result = self
            .executor
            .execute_with_timeout(
                || {
                    sqlx::query(
                        r"
                    UPDATE payments
                    SET status = 'failed', provider_payment_id = $2, updated_at = NOW()
                    WHERE id = $1 AND status = 'pending'
                    ",
                    )
                    .bind(payment_id)
                    .bind(provider_payment_id)
                    .execute(&self.pool)
                },
                &format!("Failed to mark payment {} as failed", payment_id),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_pending());
        }

        Ok(())
    }
}
