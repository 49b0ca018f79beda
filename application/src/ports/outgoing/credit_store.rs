use std::sync::Arc;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppResult;
use domain::auth::UserId;
use domain::credits::{CreditAccount, CreditTransaction, LedgerEntry, LedgerMutation};

/// Persistence for balances and the transaction ledger.
///
/// Every mutating method changes `credits_balance` and writes the matching
/// ledger row as one atomic unit. Implementations report a shortfall as
/// `AppError::InsufficientCredits` and an unknown user as `AppError::NotFound`,
/// leaving state untouched in both cases.
#[async_trait::async_trait]
pub trait CreditStorePort: Send + Sync {
    async fn get_account(&self, user_id: &UserId) -> AppResult<Option<CreditAccount>>;

    /// Idempotent by `mutation.id`: when that row already exists it is
    /// returned and the balance is left alone.
    async fn apply_mutation(&self, mutation: &LedgerMutation) -> AppResult<LedgerEntry>;

    /// Flips a pending reservation to committed. The balance is not touched.
    /// Committing an already committed reservation returns it unchanged.
    async fn commit_reservation(&self, transaction_id: Uuid) -> AppResult<CreditTransaction>;

    /// Flips a pending reservation to released and writes a compensating
    /// refund row restoring the reserved amount. Releasing an already
    /// released reservation returns the existing refund row.
    async fn release_reservation(
        &self,
        transaction_id: Uuid,
        description: &str,
    ) -> AppResult<LedgerEntry>;

    /// Releases every reservation still pending that was created at or before
    /// `cutoff`. Returns the refund rows written.
    async fn release_stale_reservations(
        &self,
        cutoff: OffsetDateTime,
        description: &str,
    ) -> AppResult<Vec<LedgerEntry>>;

    /// Newest first.
    async fn list_transactions(
        &self,
        user_id: &UserId,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<CreditTransaction>>;

    async fn count_transactions(&self, user_id: &UserId) -> AppResult<i64>;
}

pub type DynCreditStorePort = Arc<dyn CreditStorePort>;
