use uuid::Uuid;

use crate::error::AppResult;
use domain::auth::UserId;
use domain::credits::CreditPackage;
use domain::payment::{Payment, PaymentOutcome, PurchaseSession};

#[derive(Debug, Clone)]
pub struct PurchaseCompletion {
    pub payment: Payment,
    /// Set when the payment completed and credits were added.
    pub new_balance: Option<i64>,
    pub transaction_id: Option<Uuid>,
}

#[async_trait::async_trait]
pub trait PurchaseUseCase: Send + Sync {
    async fn list_packages(&self) -> AppResult<Vec<CreditPackage>>;
    async fn initiate_purchase(
        &self,
        user_id: &UserId,
        package_id: Uuid,
    ) -> AppResult<PurchaseSession>;
    async fn complete_purchase(
        &self,
        user_id: &UserId,
        payment_id: Uuid,
        provider_payment_id: Option<String>,
        outcome: PaymentOutcome,
    ) -> AppResult<PurchaseCompletion>;
}
