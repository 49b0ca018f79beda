//! Ledger statements shared by every store that moves credits.
//!
//! Callers run these inside their own transaction. The balance update takes
//! the user row lock, so the ledger row written right after it sees a stable
//! `balance_after` and a `created_at` that orders the same way the balances
//! were applied.

use sqlx::PgConnection;
use sqlx::postgres::PgRow;
use time::OffsetDateTime;
use uuid::Uuid;

use craftads_application::error::{AppError, AppResult};
use domain::auth::UserId;
use domain::credits::{
    CreditTransaction, LedgerEntry, LedgerMutation, TransactionStatus, TransactionType,
};

use super::utils::{column, db_error, parsed_column};

pub const TRANSACTION_COLUMNS: &str = "id, user_id, amount, type, status, reference_id, \
     reference_type, description, balance_after, created_at";

pub fn transaction_from_row(row: &PgRow) -> AppResult<CreditTransaction> {
    Ok(CreditTransaction {
        id: column(row, "id")?,
        user_id: UserId::from_uuid(column(row, "user_id")?),
        amount: column(row, "amount")?,
        transaction_type: parsed_column::<TransactionType>(row, "type")?,
        status: parsed_column::<TransactionStatus>(row, "status")?,
        reference_id: column(row, "reference_id")?,
        reference_type: column(row, "reference_type")?,
        description: column(row, "description")?,
        balance_after: column(row, "balance_after")?,
        created_at: column(row, "created_at")?,
    })
}

/// Conditionally moves the balance and appends the matching ledger row.
///
/// A mutation whose row already exists is not applied again; the stored row
/// is returned instead.
pub async fn apply_mutation(
    conn: &mut PgConnection,
    mutation: &LedgerMutation,
) -> AppResult<LedgerEntry> {
    if let Some(existing) = find_transaction(conn, mutation.id).await? {
        return Ok(LedgerEntry {
            new_balance: existing.balance_after,
            transaction: existing,
        });
    }

    let updated = sqlx::query(
        r"
        UPDATE users
        SET credits_balance = credits_balance + $2, updated_at = NOW()
        WHERE id = $1 AND credits_balance + $2 >= 0
        RETURNING credits_balance
        ",
    )
    .bind(mutation.user_id.as_uuid())
    .bind(mutation.amount)
    .fetch_optional(&mut *conn)
    .await
    .map_err(db_error("Failed to update balance"))?;

    let Some(updated) = updated else {
        return Err(rejection(conn, mutation).await);
    };
    let new_balance: i64 = column(&updated, "credits_balance")?;

    let mut transaction = mutation
        .clone()
        .into_transaction(new_balance, OffsetDateTime::now_utc());

    let inserted = sqlx::query(
        r"
        INSERT INTO credit_transactions
            (id, user_id, amount, type, status, reference_id, reference_type, description, balance_after)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING created_at
        ",
    )
    .bind(transaction.id)
    .bind(transaction.user_id.as_uuid())
    .bind(transaction.amount)
    .bind(transaction.transaction_type.as_str())
    .bind(transaction.status.as_str())
    .bind(transaction.reference_id.as_deref())
    .bind(transaction.reference_type.as_deref())
    .bind(transaction.description.as_str())
    .bind(transaction.balance_after)
    .fetch_one(&mut *conn)
    .await
    .map_err(db_error("Failed to insert credit transaction"))?;

    transaction.created_at = column(&inserted, "created_at")?;

    Ok(LedgerEntry {
        new_balance,
        transaction,
    })
}

async fn rejection(conn: &mut PgConnection, mutation: &LedgerMutation) -> AppError {
    let current = sqlx::query("SELECT credits_balance FROM users WHERE id = $1")
        .bind(mutation.user_id.as_uuid())
        .fetch_optional(&mut *conn)
        .await;

    match current {
        Ok(None) => AppError::NotFound {
            message: "User not found".to_string(),
        },
        Ok(Some(row)) => match column::<i64>(&row, "credits_balance") {
            Ok(available) => AppError::InsufficientCredits {
                required: -mutation.amount,
                available,
            },
            Err(err) => err,
        },
        Err(e) => db_error("Failed to read balance")(e),
    }
}

pub async fn find_transaction(
    conn: &mut PgConnection,
    transaction_id: Uuid,
) -> AppResult<Option<CreditTransaction>> {
    let row = sqlx::query(&format!(
        "SELECT {TRANSACTION_COLUMNS} FROM credit_transactions WHERE id = $1"
    ))
    .bind(transaction_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(db_error("Failed to load credit transaction"))?;

    row.as_ref().map(transaction_from_row).transpose()
}

/// Locks a reservation row for a status change.
pub async fn lock_reservation(
    conn: &mut PgConnection,
    transaction_id: Uuid,
) -> AppResult<CreditTransaction> {
    let row = sqlx::query(&format!(
        "SELECT {TRANSACTION_COLUMNS} FROM credit_transactions WHERE id = $1 FOR UPDATE"
    ))
    .bind(transaction_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(db_error("Failed to load reservation"))?
    .ok_or_else(|| AppError::NotFound {
        message: "Reservation not found".to_string(),
    })?;

    transaction_from_row(&row)
}

pub fn settled_twice(reservation: &CreditTransaction) -> AppError {
    AppError::ValidationError {
        message: format!("Reservation is already {}", reservation.status),
    }
}

/// The refund row written when a reservation was released.
pub async fn release_refund(
    conn: &mut PgConnection,
    transaction_id: Uuid,
    reference_type: &str,
) -> AppResult<LedgerEntry> {
    let row = sqlx::query(&format!(
        "SELECT {TRANSACTION_COLUMNS} FROM credit_transactions \
         WHERE reference_id = $1 AND reference_type = $2 AND type = $3"
    ))
    .bind(transaction_id.to_string())
    .bind(reference_type)
    .bind(TransactionType::Refund.as_str())
    .fetch_optional(&mut *conn)
    .await
    .map_err(db_error("Failed to load release refund"))?
    .ok_or_else(|| AppError::NotFound {
        message: "Release refund not found".to_string(),
    })?;

    let transaction = transaction_from_row(&row)?;
    Ok(LedgerEntry {
        new_balance: transaction.balance_after,
        transaction,
    })
}

/// Pending reservations created before `cutoff`, oldest first.
pub async fn stale_reservation_ids(
    conn: &mut PgConnection,
    cutoff: OffsetDateTime,
) -> AppResult<Vec<Uuid>> {
    let rows = sqlx::query(
        r"
        SELECT id FROM credit_transactions
        WHERE status = 'pending' AND created_at <= $1
        ORDER BY created_at
        ",
    )
    .bind(cutoff)
    .fetch_all(&mut *conn)
    .await
    .map_err(db_error("Failed to list stale reservations"))?;

    rows.iter().map(|row| column(row, "id")).collect()
}

pub async fn set_status(
    conn: &mut PgConnection,
    transaction_id: Uuid,
    status: TransactionStatus,
) -> AppResult<()> {
    sqlx::query("UPDATE credit_transactions SET status = $2 WHERE id = $1")
        .bind(transaction_id)
        .bind(status.as_str())
        .execute(&mut *conn)
        .await
        .map_err(db_error("Failed to update reservation status"))?;
    Ok(())
}
