use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::config::CreditSettings;
use crate::credits::retry::with_ledger_retry;
use crate::error::{AppError, AppResult};
use crate::ports::incoming::credits::{AddCredits, CreditUseCase, DeductCredits, ReserveCredits};
use crate::ports::outgoing::credit_store::CreditStorePort;
use crate::ports::outgoing::delay::DelayPort;
use domain::auth::UserId;
use domain::credits::{
    CreditAccount, CreditCheck, CreditTransaction, LedgerEntry, LedgerMutation,
};
use domain::error::DomainError;
use domain::pagination::{Page, PageInfo, PageRequest};

pub const DEFAULT_USAGE_DESCRIPTION: &str = "Ad generation";
pub const DEFAULT_USAGE_REFERENCE_TYPE: &str = "generation";
const RELEASE_DESCRIPTION: &str = "Refund for failed generation";
const STALE_RELEASE_DESCRIPTION: &str = "Refund for abandoned generation";

pub struct CreditService {
    credit_store: Arc<dyn CreditStorePort>,
    delay: Arc<dyn DelayPort>,
    settings: CreditSettings,
}

impl CreditService {
    pub fn new(
        credit_store: Arc<dyn CreditStorePort>,
        delay: Arc<dyn DelayPort>,
        settings: CreditSettings,
    ) -> Self {
        Self {
            credit_store,
            delay,
            settings,
        }
    }

    async fn apply(&self, operation: &str, mutation: LedgerMutation) -> AppResult<LedgerEntry> {
        let mutation = &mutation;
        with_ledger_retry(self.settings.retry, self.delay.as_ref(), operation, || {
            self.credit_store.apply_mutation(mutation)
        })
        .await
    }
}

fn invalid_amount(err: &DomainError) -> AppError {
    AppError::ValidationError {
        message: err.to_string(),
    }
}

#[async_trait::async_trait]
impl CreditUseCase for CreditService {
    async fn get_balance(&self, user_id: &UserId) -> AppResult<CreditAccount> {
        self.credit_store
            .get_account(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound {
                message: "User not found".to_string(),
            })
    }

    async fn deduct(&self, user_id: &UserId, request: DeductCredits) -> AppResult<LedgerEntry> {
        let description = request
            .description
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USAGE_DESCRIPTION.to_string());
        let reference_type = request
            .reference_type
            .or_else(|| Some(DEFAULT_USAGE_REFERENCE_TYPE.to_string()));

        let mutation = LedgerMutation::debit(*user_id, request.amount, description)
            .map_err(|err| invalid_amount(&err))?
            .with_reference(request.reference_id, reference_type);

        let entry = self.apply("deduct", mutation).await?;

        tracing::info!(
            user_id = %user_id,
            amount = request.amount,
            new_balance = entry.new_balance,
            transaction_id = %entry.transaction.id,
            "Credits deducted"
        );

        Ok(entry)
    }

    async fn add(&self, user_id: &UserId, request: AddCredits) -> AppResult<LedgerEntry> {
        let mutation = LedgerMutation::credit(
            *user_id,
            request.amount,
            request.transaction_type,
            request.description,
        )
        .map_err(|err| invalid_amount(&err))?
        .with_reference(request.reference_id, request.reference_type);

        let entry = self.apply("add", mutation).await?;

        tracing::info!(
            user_id = %user_id,
            amount = request.amount,
            transaction_type = %request.transaction_type,
            new_balance = entry.new_balance,
            "Credits added"
        );

        Ok(entry)
    }

    async fn history(
        &self,
        user_id: &UserId,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> AppResult<Page<CreditTransaction>> {
        if page == Some(0) {
            return Err(AppError::ValidationError {
                message: "page must be at least 1".to_string(),
            });
        }

        self.get_balance(user_id).await?;

        let request = PageRequest::clamped(
            page,
            limit,
            self.settings.history_default_limit,
            self.settings.history_max_limit,
        );

        let items = self
            .credit_store
            .list_transactions(user_id, request.offset(), i64::from(request.limit))
            .await?;
        let total = self.credit_store.count_transactions(user_id).await?;

        Ok(Page {
            items,
            info: PageInfo::new(request, total),
        })
    }

    async fn validate(
        &self,
        user_id: &UserId,
        required: i64,
        operation: String,
    ) -> AppResult<CreditCheck> {
        if required <= 0 {
            return Err(AppError::ValidationError {
                message: "requiredCredits must be positive".to_string(),
            });
        }

        let account = self.get_balance(user_id).await?;

        Ok(CreditCheck {
            required,
            available: account.balance,
            operation,
        })
    }

    async fn reserve(&self, user_id: &UserId, request: ReserveCredits) -> AppResult<LedgerEntry> {
        let mutation = LedgerMutation::debit(*user_id, request.amount, request.description)
            .map_err(|err| invalid_amount(&err))?
            .with_reference(request.reference_id, request.reference_type)
            .pending();

        let entry = self.apply("reserve", mutation).await?;

        tracing::debug!(
            user_id = %user_id,
            amount = request.amount,
            transaction_id = %entry.transaction.id,
            "Credits reserved"
        );

        Ok(entry)
    }

    async fn commit_reservation(&self, transaction_id: Uuid) -> AppResult<CreditTransaction> {
        with_ledger_retry(
            self.settings.retry,
            self.delay.as_ref(),
            "commit_reservation",
            || self.credit_store.commit_reservation(transaction_id),
        )
        .await
    }

    async fn release_reservation(&self, transaction_id: Uuid) -> AppResult<LedgerEntry> {
        let entry = with_ledger_retry(
            self.settings.retry,
            self.delay.as_ref(),
            "release_reservation",
            || {
                self.credit_store
                    .release_reservation(transaction_id, RELEASE_DESCRIPTION)
            },
        )
        .await?;

        tracing::info!(
            user_id = %entry.transaction.user_id,
            reservation_id = %transaction_id,
            new_balance = entry.new_balance,
            "Reservation released"
        );

        Ok(entry)
    }

    async fn release_stale_reservations(&self, max_age: Duration) -> AppResult<Vec<LedgerEntry>> {
        let cutoff = OffsetDateTime::now_utc() - max_age;
        let released = self
            .credit_store
            .release_stale_reservations(cutoff, STALE_RELEASE_DESCRIPTION)
            .await?;

        for entry in &released {
            tracing::warn!(
                user_id = %entry.transaction.user_id,
                reservation_id = ?entry.transaction.reference_id,
                new_balance = entry.new_balance,
                "Stale reservation released"
            );
        }

        Ok(released)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::test_support::{InMemoryStore, NoDelay, credit_settings};
    use domain::credits::{TransactionStatus, TransactionType, verify_chain};
    use domain::shuffle::SeededRng;

    fn service(store: &Arc<InMemoryStore>) -> CreditService {
        let ledger: Arc<InMemoryStore> = Arc::clone(store);
        CreditService::new(ledger, Arc::new(NoDelay), credit_settings())
    }

    fn deduct(amount: i64) -> DeductCredits {
        DeductCredits {
            amount,
            description: None,
            reference_id: None,
            reference_type: None,
        }
    }

    fn reserve(amount: i64) -> ReserveCredits {
        ReserveCredits {
            amount,
            description: "Ad generation".to_string(),
            reference_id: None,
            reference_type: Some("generation".to_string()),
        }
    }

    fn purchase(amount: i64) -> AddCredits {
        AddCredits {
            amount,
            transaction_type: TransactionType::Purchase,
            description: "Purchased Starter".to_string(),
            reference_id: None,
            reference_type: Some("payment".to_string()),
        }
    }

    #[tokio::test]
    async fn balance_of_unknown_user_is_not_found_and_creates_nothing() {
        let store = Arc::new(InMemoryStore::new());
        let credits = service(&store);

        let result = credits.get_balance(&UserId::new()).await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
        assert_eq!(store.user_count(), 0);
    }

    #[tokio::test]
    async fn deduct_uses_generation_defaults() {
        let store = Arc::new(InMemoryStore::new());
        let user = store.seed_user("ada@example.com", 10);

        let entry = service(&store).deduct(&user, deduct(3)).await.unwrap();

        assert_eq!(entry.new_balance, 7);
        assert_eq!(entry.transaction.amount, -3);
        assert_eq!(entry.transaction.description, "Ad generation");
        assert_eq!(
            entry.transaction.reference_type.as_deref(),
            Some("generation")
        );
        assert_eq!(entry.transaction.balance_after, 7);
    }

    #[tokio::test]
    async fn non_positive_amounts_are_validation_errors() {
        let store = Arc::new(InMemoryStore::new());
        let user = store.seed_user("ada@example.com", 10);
        let credits = service(&store);

        assert!(matches!(
            credits.deduct(&user, deduct(0)).await,
            Err(AppError::ValidationError { .. })
        ));
        assert!(matches!(
            credits.add(&user, purchase(-5)).await,
            Err(AppError::ValidationError { .. })
        ));
    }

    #[tokio::test]
    async fn usage_type_cannot_be_added() {
        let store = Arc::new(InMemoryStore::new());
        let user = store.seed_user("ada@example.com", 10);

        let mut request = purchase(5);
        request.transaction_type = TransactionType::Usage;

        assert!(matches!(
            service(&store).add(&user, request).await,
            Err(AppError::ValidationError { .. })
        ));
        assert_eq!(store.balance_of(&user), 10);
    }

    #[tokio::test]
    async fn failed_deduct_leaves_no_trace() {
        let store = Arc::new(InMemoryStore::new());
        let user = store.seed_user("ada@example.com", 2);
        let rows_before = store.transactions_of(&user);

        let result = service(&store).deduct(&user, deduct(5)).await;

        assert!(matches!(
            result,
            Err(AppError::InsufficientCredits {
                required: 5,
                available: 2
            })
        ));
        assert_eq!(store.balance_of(&user), 2);
        assert_eq!(store.transactions_of(&user), rows_before);
    }

    #[tokio::test]
    async fn random_sequences_keep_the_chain_consistent() {
        let store = Arc::new(InMemoryStore::new());
        let user = store.seed_user("ada@example.com", 10);
        let credits = service(&store);
        let mut rng = SeededRng::from_seed("ledger-walk");

        for _ in 0..200 {
            let amount = i64::try_from(rng.next_index(20) + 1).unwrap();
            if rng.next_unit() < 0.5 {
                credits.add(&user, purchase(amount)).await.unwrap();
            } else {
                if let Err(err) = credits.deduct(&user, deduct(amount)).await {
                    assert!(matches!(err, AppError::InsufficientCredits { .. }));
                }
            }
        }

        let rows = store.transactions_of(&user);
        let closing = verify_chain(0, &rows).unwrap();
        assert_eq!(closing, store.balance_of(&user));
        assert!(rows.iter().all(|tx| tx.balance_after >= 0));
    }

    #[tokio::test]
    async fn concurrent_deducts_cannot_overdraw() {
        let store = Arc::new(InMemoryStore::new());
        let user = store.seed_user("ada@example.com", 5);
        let credits = service(&store);

        let (first, second) = tokio::join!(
            credits.deduct(&user, deduct(3)),
            credits.deduct(&user, deduct(3))
        );

        let outcomes = [first, second];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(
            outcomes
                .iter()
                .any(|r| matches!(r, Err(AppError::InsufficientCredits { .. })))
        );
        assert_eq!(store.balance_of(&user), 2);
        assert_eq!(store.transactions_of(&user).len(), 2);
    }

    #[tokio::test]
    async fn history_pages_are_newest_first_and_cover_everything() {
        let store = Arc::new(InMemoryStore::new());
        let user = store.seed_user("ada@example.com", 10);
        let credits = service(&store);
        for _ in 0..6 {
            credits.deduct(&user, deduct(1)).await.unwrap();
        }

        let mut collected = Vec::new();
        for page in 1..=3 {
            let result = credits.history(&user, Some(page), Some(3)).await.unwrap();
            assert_eq!(result.info.total, 7);
            assert_eq!(result.info.pages, 3);
            collected.extend(result.items);
        }

        assert_eq!(collected.len(), 7);
        assert!(
            collected
                .windows(2)
                .all(|pair| pair[0].balance_after < pair[1].balance_after)
        );

        let mut chronological = store.transactions_of(&user);
        chronological.reverse();
        assert_eq!(collected, chronological);
    }

    #[tokio::test]
    async fn history_limit_is_clamped_and_page_zero_rejected() {
        let store = Arc::new(InMemoryStore::new());
        let user = store.seed_user("ada@example.com", 10);
        let credits = service(&store);

        let page = credits.history(&user, None, Some(500)).await.unwrap();
        assert_eq!(page.info.limit, 100);
        assert_eq!(page.info.page, 1);

        assert!(matches!(
            credits.history(&user, Some(0), None).await,
            Err(AppError::ValidationError { .. })
        ));
    }

    #[tokio::test]
    async fn validate_reports_shortfall_without_mutation() {
        let store = Arc::new(InMemoryStore::new());
        let user = store.seed_user("ada@example.com", 2);

        let check = service(&store)
            .validate(&user, 5, "generate".to_string())
            .await
            .unwrap();

        assert!(!check.is_sufficient());
        assert_eq!(check.available, 2);
        assert_eq!(store.transactions_of(&user).len(), 1);
    }

    #[tokio::test]
    async fn committed_reservation_keeps_the_debit() {
        let store = Arc::new(InMemoryStore::new());
        let user = store.seed_user("ada@example.com", 10);
        let credits = service(&store);

        let reservation = credits
            .reserve(
                &user,
                ReserveCredits {
                    amount: 1,
                    description: "Ad generation".to_string(),
                    reference_id: None,
                    reference_type: Some("generation".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(reservation.transaction.status, TransactionStatus::Pending);
        assert_eq!(store.balance_of(&user), 9);

        let committed = credits
            .commit_reservation(reservation.transaction.id)
            .await
            .unwrap();
        assert_eq!(committed.status, TransactionStatus::Committed);
        assert_eq!(store.balance_of(&user), 9);

        let again = credits
            .commit_reservation(reservation.transaction.id)
            .await
            .unwrap();
        assert_eq!(again, committed);

        assert!(matches!(
            credits.release_reservation(reservation.transaction.id).await,
            Err(AppError::ValidationError { .. })
        ));
        assert_eq!(store.balance_of(&user), 9);
    }

    #[tokio::test]
    async fn released_reservation_restores_the_balance() {
        let store = Arc::new(InMemoryStore::new());
        let user = store.seed_user("ada@example.com", 10);
        let credits = service(&store);

        let reservation = credits
            .reserve(
                &user,
                ReserveCredits {
                    amount: 4,
                    description: "Ad generation".to_string(),
                    reference_id: None,
                    reference_type: None,
                },
            )
            .await
            .unwrap();

        let refund = credits
            .release_reservation(reservation.transaction.id)
            .await
            .unwrap();

        assert_eq!(refund.new_balance, 10);
        assert_eq!(refund.transaction.transaction_type, TransactionType::Refund);

        let rows = store.transactions_of(&user);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].status, TransactionStatus::Released);
        assert_eq!(verify_chain(0, &rows).unwrap(), 10);
    }

    #[tokio::test]
    async fn transient_failures_are_retried_within_budget() {
        let store = Arc::new(InMemoryStore::new());
        let user = store.seed_user("ada@example.com", 10);
        let credits = service(&store);

        store.fail_next_writes(2);
        let entry = credits.deduct(&user, deduct(1)).await.unwrap();
        assert_eq!(entry.new_balance, 9);

        store.fail_next_writes(3);
        assert!(matches!(
            credits.deduct(&user, deduct(1)).await,
            Err(AppError::LedgerWriteFailed { .. })
        ));
        assert_eq!(store.balance_of(&user), 9);
    }

    #[tokio::test]
    async fn retry_after_a_lost_commit_ack_charges_once() {
        let store = Arc::new(InMemoryStore::new());
        let user = store.seed_user("ada@example.com", 10);
        let credits = service(&store);

        store.lose_next_acks(1);
        let entry = credits.deduct(&user, deduct(3)).await.unwrap();

        assert_eq!(entry.new_balance, 7);
        assert_eq!(store.balance_of(&user), 7);
        let usage: Vec<_> = store
            .transactions_of(&user)
            .into_iter()
            .filter(|tx| tx.transaction_type == TransactionType::Usage)
            .collect();
        assert_eq!(usage.len(), 1);
        assert_eq!(usage[0].id, entry.transaction.id);
    }

    #[tokio::test]
    async fn reservation_settles_once_when_acks_are_lost() {
        let store = Arc::new(InMemoryStore::new());
        let user = store.seed_user("ada@example.com", 10);
        let credits = service(&store);

        store.lose_next_acks(1);
        let reservation = credits.reserve(&user, reserve(2)).await.unwrap();
        assert_eq!(store.balance_of(&user), 8);

        store.lose_next_acks(1);
        let refund = credits
            .release_reservation(reservation.transaction.id)
            .await
            .unwrap();

        assert_eq!(refund.new_balance, 10);
        assert_eq!(store.balance_of(&user), 10);
        let rows = store.transactions_of(&user);
        assert_eq!(rows.len(), 3);
        assert_eq!(verify_chain(0, &rows).unwrap(), 10);
    }

    #[tokio::test]
    async fn stale_reservations_are_refunded_and_fresh_ones_kept() {
        let store = Arc::new(InMemoryStore::new());
        let user = store.seed_user("ada@example.com", 10);
        let credits = service(&store);

        let stale = credits.reserve(&user, reserve(2)).await.unwrap();
        let fresh = credits.reserve(&user, reserve(3)).await.unwrap();
        store.backdate(stale.transaction.id, Duration::from_secs(600));

        let released = credits
            .release_stale_reservations(Duration::from_secs(300))
            .await
            .unwrap();

        assert_eq!(released.len(), 1);
        assert_eq!(
            released[0].transaction.reference_id,
            Some(stale.transaction.id.to_string())
        );
        assert_eq!(store.balance_of(&user), 7);

        let statuses: Vec<_> = store
            .transactions_of(&user)
            .into_iter()
            .filter(|tx| tx.id == stale.transaction.id || tx.id == fresh.transaction.id)
            .map(|tx| tx.status)
            .collect();
        assert_eq!(
            statuses,
            vec![TransactionStatus::Released, TransactionStatus::Pending]
        );
    }
}
