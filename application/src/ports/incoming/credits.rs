use std::time::Duration;

use uuid::Uuid;

use crate::error::AppResult;
use domain::auth::UserId;
use domain::credits::{
    CreditAccount, CreditCheck, CreditTransaction, LedgerEntry, TransactionType,
};
use domain::pagination::Page;

#[derive(Debug, Clone)]
pub struct DeductCredits {
    pub amount: i64,
    pub description: Option<String>,
    pub reference_id: Option<String>,
    pub reference_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AddCredits {
    pub amount: i64,
    pub transaction_type: TransactionType,
    pub description: String,
    pub reference_id: Option<String>,
    pub reference_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReserveCredits {
    pub amount: i64,
    pub description: String,
    pub reference_id: Option<String>,
    pub reference_type: Option<String>,
}

#[async_trait::async_trait]
pub trait CreditUseCase: Send + Sync {
    async fn get_balance(&self, user_id: &UserId) -> AppResult<CreditAccount>;
    async fn deduct(&self, user_id: &UserId, request: DeductCredits) -> AppResult<LedgerEntry>;
    async fn add(&self, user_id: &UserId, request: AddCredits) -> AppResult<LedgerEntry>;
    async fn history(
        &self,
        user_id: &UserId,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> AppResult<Page<CreditTransaction>>;
    async fn validate(
        &self,
        user_id: &UserId,
        required: i64,
        operation: String,
    ) -> AppResult<CreditCheck>;
    async fn reserve(&self, user_id: &UserId, request: ReserveCredits) -> AppResult<LedgerEntry>;
    async fn commit_reservation(&self, transaction_id: Uuid) -> AppResult<CreditTransaction>;
    async fn release_reservation(&self, transaction_id: Uuid) -> AppResult<LedgerEntry>;
    /// Refunds reservations left pending for longer than `max_age`.
    async fn release_stale_reservations(&self, max_age: Duration) -> AppResult<Vec<LedgerEntry>>;
}
