use std::sync::Arc;

use uuid::Uuid;

use crate::error::AppResult;
use domain::credits::{CreditPackage, LedgerEntry, LedgerMutation};
use domain::payment::Payment;

#[async_trait::async_trait]
pub trait PaymentStorePort: Send + Sync {
    async fn list_active_packages(&self) -> AppResult<Vec<CreditPackage>>;
    async fn find_package(&self, package_id: Uuid) -> AppResult<Option<CreditPackage>>;
    async fn create_payment(&self, payment: &Payment) -> AppResult<()>;
    async fn find_payment(&self, payment_id: Uuid) -> AppResult<Option<Payment>>;

    /// Moves a pending payment to completed and applies `credit` to the
    /// ledger in the same transaction. A payment that is no longer pending
    /// is rejected with `AppError::ValidationError` and nothing is credited.
    async fn complete_payment(
        &self,
        payment_id: Uuid,
        provider_payment_id: Option<&str>,
        credit: &LedgerMutation,
    ) -> AppResult<LedgerEntry>;

    async fn fail_payment(
        &self,
        payment_id: Uuid,
        provider_payment_id: Option<&str>,
    ) -> AppResult<()>;
}

pub type DynPaymentStorePort = Arc<dyn PaymentStorePort>;
