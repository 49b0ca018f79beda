use std::sync::Arc;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::config::{PaymentSettings, RetryPolicy};
use crate::credits::retry::with_ledger_retry;
use crate::error::{AppError, AppResult};
use crate::ports::incoming::purchases::{PurchaseCompletion, PurchaseUseCase};
use crate::ports::outgoing::delay::DelayPort;
use crate::ports::outgoing::payment_store::PaymentStorePort;
use domain::auth::UserId;
use domain::credits::{CreditPackage, LedgerMutation, TransactionType};
use domain::payment::{Payment, PaymentOutcome, PaymentStatus, PurchaseSession};

pub const PAYMENT_REFERENCE_TYPE: &str = "payment";

pub struct PurchaseService {
    payment_store: Arc<dyn PaymentStorePort>,
    delay: Arc<dyn DelayPort>,
    retry: RetryPolicy,
    settings: PaymentSettings,
}

impl PurchaseService {
    pub fn new(
        payment_store: Arc<dyn PaymentStorePort>,
        delay: Arc<dyn DelayPort>,
        retry: RetryPolicy,
        settings: PaymentSettings,
    ) -> Self {
        Self {
            payment_store,
            delay,
            retry,
            settings,
        }
    }

    fn redirect_url(&self, payment_id: Uuid) -> String {
        format!("{}?paymentId={payment_id}", self.settings.mock_payment_url)
    }

    async fn purchase_description(&self, package_id: Uuid) -> AppResult<String> {
        let name = self
            .payment_store
            .find_package(package_id)
            .await?
            .map_or_else(|| "credits".to_string(), |package| package.name);
        Ok(format!("Purchased {name}"))
    }
}

fn payment_not_found() -> AppError {
    AppError::NotFound {
        message: "Payment not found".to_string(),
    }
}

#[async_trait::async_trait]
impl PurchaseUseCase for PurchaseService {
    async fn list_packages(&self) -> AppResult<Vec<CreditPackage>> {
        self.payment_store.list_active_packages().await
    }

    async fn initiate_purchase(
        &self,
        user_id: &UserId,
        package_id: Uuid,
    ) -> AppResult<PurchaseSession> {
        let package = self
            .payment_store
            .find_package(package_id)
            .await?
            .filter(|package| package.is_active)
            .ok_or_else(|| AppError::NotFound {
                message: "Credit package not found".to_string(),
            })?;

        let now = OffsetDateTime::now_utc();
        let payment = Payment {
            id: Uuid::new_v4(),
            user_id: *user_id,
            package_id: package.id,
            provider: self.settings.provider.clone(),
            provider_payment_id: None,
            amount_cents: package.price_cents,
            currency: package.currency,
            status: PaymentStatus::Pending,
            credits_purchased: package.credit_amount,
            created_at: now,
            updated_at: now,
        };

        self.payment_store.create_payment(&payment).await?;

        tracing::info!(
            user_id = %user_id,
            payment_id = %payment.id,
            package = %package.name,
            amount_cents = payment.amount_cents,
            "Payment initiated"
        );

        Ok(PurchaseSession {
            payment_id: payment.id,
            status: payment.status,
            redirect_url: self.redirect_url(payment.id),
        })
    }

    async fn complete_purchase(
        &self,
        user_id: &UserId,
        payment_id: Uuid,
        provider_payment_id: Option<String>,
        outcome: PaymentOutcome,
    ) -> AppResult<PurchaseCompletion> {
        let mut payment = self
            .payment_store
            .find_payment(payment_id)
            .await?
            .filter(|payment| payment.is_owned_by(user_id))
            .ok_or_else(payment_not_found)?;

        payment.transition(outcome.target_status())?;
        payment.provider_payment_id.clone_from(&provider_payment_id);

        match outcome {
            PaymentOutcome::Completed => {
                let description = self.purchase_description(payment.package_id).await?;
                let credit = LedgerMutation::credit(
                    *user_id,
                    payment.credits_purchased,
                    TransactionType::Purchase,
                    description,
                )?
                .with_reference(
                    Some(payment.id.to_string()),
                    Some(PAYMENT_REFERENCE_TYPE.to_string()),
                );

                let credit = &credit;
                let provider_payment_id = provider_payment_id.as_deref();
                let entry = with_ledger_retry(
                    self.retry,
                    self.delay.as_ref(),
                    "complete_payment",
                    || {
                        self.payment_store
                            .complete_payment(payment_id, provider_payment_id, credit)
                    },
                )
                .await?;

                tracing::info!(
                    user_id = %user_id,
                    payment_id = %payment_id,
                    credits = payment.credits_purchased,
                    new_balance = entry.new_balance,
                    "Payment completed"
                );

                Ok(PurchaseCompletion {
                    payment,
                    new_balance: Some(entry.new_balance),
                    transaction_id: Some(entry.transaction.id),
                })
            }
            PaymentOutcome::Failed => {
                self.payment_store
                    .fail_payment(payment_id, provider_payment_id.as_deref())
                    .await?;

                tracing::info!(user_id = %user_id, payment_id = %payment_id, "Payment failed");

                Ok(PurchaseCompletion {
                    payment,
                    new_balance: None,
                    transaction_id: None,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::test_support::{InMemoryStore, NoDelay, credit_settings};
    use domain::credits::verify_chain;

    fn service(store: &Arc<InMemoryStore>) -> PurchaseService {
        let payments: Arc<InMemoryStore> = Arc::clone(store);
        PurchaseService::new(
            payments,
            Arc::new(NoDelay),
            RetryPolicy {
                max_retries: 2,
                backoff: Duration::from_millis(1),
            },
            PaymentSettings {
                provider: "mock".to_string(),
                mock_payment_url: "/mock-payment".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn purchase_flow_credits_the_package() {
        let store = Arc::new(InMemoryStore::new());
        let user = store.seed_user("ada@example.com", credit_settings().signup_bonus);
        let package = store.seed_package("Pro Pack", 100, 1999);
        let purchases = service(&store);

        let session = purchases.initiate_purchase(&user, package).await.unwrap();
        assert_eq!(session.status, PaymentStatus::Pending);
        assert_eq!(
            session.redirect_url,
            format!("/mock-payment?paymentId={}", session.payment_id)
        );

        let completion = purchases
            .complete_purchase(
                &user,
                session.payment_id,
                Some("mock_txn_1".to_string()),
                PaymentOutcome::Completed,
            )
            .await
            .unwrap();

        assert_eq!(completion.new_balance, Some(110));
        assert_eq!(completion.payment.status, PaymentStatus::Completed);

        let rows = store.transactions_of(&user);
        let purchase = rows.last().unwrap();
        assert_eq!(purchase.transaction_type, TransactionType::Purchase);
        assert_eq!(purchase.balance_after, 110);
        assert_eq!(purchase.description, "Purchased Pro Pack");
        assert_eq!(purchase.reference_type.as_deref(), Some("payment"));
        assert_eq!(verify_chain(0, &rows).unwrap(), 110);
    }

    #[tokio::test]
    async fn completing_twice_is_rejected_without_double_credit() {
        let store = Arc::new(InMemoryStore::new());
        let user = store.seed_user("ada@example.com", 0);
        let package = store.seed_package("Starter", 50, 999);
        let purchases = service(&store);

        let session = purchases.initiate_purchase(&user, package).await.unwrap();
        purchases
            .complete_purchase(&user, session.payment_id, None, PaymentOutcome::Completed)
            .await
            .unwrap();

        let second = purchases
            .complete_purchase(&user, session.payment_id, None, PaymentOutcome::Completed)
            .await;

        assert!(matches!(second, Err(AppError::ValidationError { .. })));
        assert_eq!(store.balance_of(&user), 50);
    }

    #[tokio::test]
    async fn lost_completion_ack_credits_the_package_once() {
        let store = Arc::new(InMemoryStore::new());
        let user = store.seed_user("ada@example.com", 0);
        let package = store.seed_package("Starter", 50, 999);
        let purchases = service(&store);

        let session = purchases.initiate_purchase(&user, package).await.unwrap();
        store.lose_next_acks(1);
        let completion = purchases
            .complete_purchase(&user, session.payment_id, None, PaymentOutcome::Completed)
            .await
            .unwrap();

        assert_eq!(completion.new_balance, Some(50));
        assert_eq!(store.balance_of(&user), 50);
        let purchases_written = store
            .transactions_of(&user)
            .iter()
            .filter(|tx| tx.transaction_type == TransactionType::Purchase)
            .count();
        assert_eq!(purchases_written, 1);
    }

    #[tokio::test]
    async fn failed_payment_adds_nothing() {
        let store = Arc::new(InMemoryStore::new());
        let user = store.seed_user("ada@example.com", 10);
        let package = store.seed_package("Starter", 50, 999);
        let purchases = service(&store);

        let session = purchases.initiate_purchase(&user, package).await.unwrap();
        let completion = purchases
            .complete_purchase(&user, session.payment_id, None, PaymentOutcome::Failed)
            .await
            .unwrap();

        assert_eq!(completion.payment.status, PaymentStatus::Failed);
        assert_eq!(completion.new_balance, None);
        assert_eq!(store.balance_of(&user), 10);
        assert_eq!(store.transactions_of(&user).len(), 1);
    }

    #[tokio::test]
    async fn someone_elses_payment_is_not_found() {
        let store = Arc::new(InMemoryStore::new());
        let owner = store.seed_user("ada@example.com", 10);
        let intruder = store.seed_user("eve@example.com", 10);
        let package = store.seed_package("Starter", 50, 999);
        let purchases = service(&store);

        let session = purchases.initiate_purchase(&owner, package).await.unwrap();
        let result = purchases
            .complete_purchase(&intruder, session.payment_id, None, PaymentOutcome::Completed)
            .await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
        assert_eq!(store.balance_of(&intruder), 10);
    }

    #[tokio::test]
    async fn inactive_packages_cannot_be_bought() {
        let store = Arc::new(InMemoryStore::new());
        let user = store.seed_user("ada@example.com", 10);
        let package = store.seed_package("Legacy", 500, 4999);
        store.deactivate_package(package);
        let purchases = service(&store);

        assert!(matches!(
            purchases.initiate_purchase(&user, package).await,
            Err(AppError::NotFound { .. })
        ));
        assert!(purchases.list_packages().await.unwrap().is_empty());
    }
}
