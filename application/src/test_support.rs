//! In-memory port implementations for service tests.
//!
//! The ledger fake applies each mutation under one mutex with the same
//! conditional rule as the Postgres store: the balance change and its row are
//! written together or not at all.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::config::{CreditSettings, RetryPolicy};
use crate::error::{AppError, AppResult};
use crate::ports::outgoing::credit_store::CreditStorePort;
use crate::ports::outgoing::delay::DelayPort;
use crate::ports::outgoing::gallery_store::GalleryStorePort;
use crate::ports::outgoing::generation_backend::DynGenerationBackendPort;
use crate::ports::outgoing::generation_store::GenerationStorePort;
use crate::ports::outgoing::payment_store::PaymentStorePort;
use crate::ports::outgoing::timeout::{GenerationTimeoutPort, TimeoutError};
use crate::ports::outgoing::user_store::UserStorePort;
use domain::auth::{SocialIdentity, UserId, UserPublic};
use domain::credits::{
    CreditAccount, CreditPackage, CreditTransaction, LedgerEntry, LedgerMutation,
    SIGNUP_BONUS_DESCRIPTION, TransactionStatus, TransactionType,
};
use domain::gallery::{Category, CategorySummary, Template, TemplateFeedback, TemplateFilter};
use domain::generation::{GenerationInput, GenerationRecord, GenerationResult};
use domain::payment::{Payment, PaymentStatus};

pub struct NoDelay;

impl DelayPort for NoDelay {
    fn sleep(&self, _duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + 'static>> {
        Box::pin(async {})
    }
}

/// Runs the backend inline without enforcing the deadline.
pub struct InlineTimeout {
    pub backend: DynGenerationBackendPort,
}

impl GenerationTimeoutPort for InlineTimeout {
    fn generate_with_timeout(
        &self,
        input: GenerationInput,
        _duration: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<GenerationResult, TimeoutError>> + Send + 'static>>
    {
        let backend = Arc::clone(&self.backend);
        Box::pin(async move { Ok(backend.generate(input).await) })
    }
}

/// Every call hits the deadline.
pub struct ExpiredTimeout;

impl GenerationTimeoutPort for ExpiredTimeout {
    fn generate_with_timeout(
        &self,
        _input: GenerationInput,
        _duration: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<GenerationResult, TimeoutError>> + Send + 'static>>
    {
        Box::pin(async { Err(TimeoutError) })
    }
}

struct UserRow {
    user: UserPublic,
    provider: String,
    provider_user_id: String,
}

#[derive(Default)]
struct State {
    users: HashMap<UserId, UserRow>,
    transactions: Vec<CreditTransaction>,
    packages: Vec<CreditPackage>,
    payments: HashMap<Uuid, Payment>,
    generations: Vec<GenerationRecord>,
}

impl State {
    fn apply(&mut self, mutation: &LedgerMutation) -> AppResult<LedgerEntry> {
        if let Some(existing) = self.transactions.iter().find(|tx| tx.id == mutation.id) {
            return Ok(LedgerEntry {
                new_balance: existing.balance_after,
                transaction: existing.clone(),
            });
        }

        let row = self
            .users
            .get_mut(&mutation.user_id)
            .ok_or_else(|| AppError::NotFound {
                message: "User not found".to_string(),
            })?;

        let new_balance = mutation.apply_to(row.user.credits_balance)?;
        let now = OffsetDateTime::now_utc();
        row.user.credits_balance = new_balance;
        row.user.updated_at = now;

        let transaction = mutation.clone().into_transaction(new_balance, now);
        self.transactions.push(transaction.clone());

        Ok(LedgerEntry {
            new_balance,
            transaction,
        })
    }

    fn reservation_mut(&mut self, transaction_id: Uuid) -> AppResult<&mut CreditTransaction> {
        self.transactions
            .iter_mut()
            .find(|tx| tx.id == transaction_id)
            .ok_or_else(|| AppError::NotFound {
                message: "Reservation not found".to_string(),
            })
    }

    fn commit(&mut self, transaction_id: Uuid) -> AppResult<CreditTransaction> {
        let reservation = self.reservation_mut(transaction_id)?;
        match reservation.status {
            TransactionStatus::Pending => reservation.status = TransactionStatus::Committed,
            TransactionStatus::Committed => {}
            TransactionStatus::Released => return Err(settled_twice(reservation)),
        }
        Ok(reservation.clone())
    }

    fn release(&mut self, transaction_id: Uuid, description: &str) -> AppResult<LedgerEntry> {
        match self.reservation_mut(transaction_id)?.status {
            TransactionStatus::Pending => {}
            TransactionStatus::Released => return self.refund_of(transaction_id),
            TransactionStatus::Committed => {
                return Err(settled_twice(self.reservation_mut(transaction_id)?));
            }
        }
        let reservation = self.reservation_mut(transaction_id)?;
        reservation.status = TransactionStatus::Released;
        let refund = LedgerMutation::credit(
            reservation.user_id,
            -reservation.amount,
            TransactionType::Refund,
            description,
        )?
        .with_reference(Some(transaction_id.to_string()), Some("reservation".to_string()));
        self.apply(&refund)
    }

    fn refund_of(&self, transaction_id: Uuid) -> AppResult<LedgerEntry> {
        let reference = transaction_id.to_string();
        self.transactions
            .iter()
            .find(|tx| {
                tx.transaction_type == TransactionType::Refund
                    && tx.reference_id.as_deref() == Some(reference.as_str())
            })
            .map(|tx| LedgerEntry {
                new_balance: tx.balance_after,
                transaction: tx.clone(),
            })
            .ok_or_else(|| AppError::NotFound {
                message: "Release refund not found".to_string(),
            })
    }
}

fn settled_twice(reservation: &CreditTransaction) -> AppError {
    AppError::ValidationError {
        message: format!("Reservation is already {}", reservation.status),
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    transient_failures: AtomicU32,
    lost_acks: AtomicU32,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user whose opening balance is recorded as a signup bonus row.
    pub fn seed_user(&self, email: &str, balance: i64) -> UserId {
        let id = UserId::new();
        let now = OffsetDateTime::now_utc();
        let mut state = self.state.lock().unwrap();
        state.users.insert(
            id,
            UserRow {
                user: UserPublic {
                    id,
                    email: email.to_string(),
                    display_name: None,
                    avatar_url: None,
                    auth_provider: "google".to_string(),
                    credits_balance: 0,
                    created_at: now,
                    updated_at: now,
                    last_login: None,
                },
                provider: "google".to_string(),
                provider_user_id: format!("google-{email}"),
            },
        );
        if balance > 0 {
            let bonus = LedgerMutation::credit(
                id,
                balance,
                TransactionType::SignupBonus,
                SIGNUP_BONUS_DESCRIPTION,
            )
            .unwrap();
            state.apply(&bonus).unwrap();
        }
        id
    }

    pub fn seed_package(&self, name: &str, credit_amount: i64, price_cents: i64) -> Uuid {
        let id = Uuid::new_v4();
        let mut state = self.state.lock().unwrap();
        let sort_order = i32::try_from(state.packages.len()).unwrap();
        state.packages.push(CreditPackage {
            id,
            name: name.to_string(),
            description: None,
            credit_amount,
            price_cents,
            currency: "USD".to_string(),
            is_active: true,
            is_featured: false,
            sort_order,
        });
        id
    }

    pub fn deactivate_package(&self, package_id: Uuid) {
        let mut state = self.state.lock().unwrap();
        if let Some(package) = state.packages.iter_mut().find(|p| p.id == package_id) {
            package.is_active = false;
        }
    }

    /// Overwrites the balance without writing a ledger row.
    pub fn force_balance(&self, user_id: &UserId, balance: i64) {
        let mut state = self.state.lock().unwrap();
        state.users.get_mut(user_id).unwrap().user.credits_balance = balance;
    }

    /// The next `count` ledger writes fail with a transient database error.
    pub fn fail_next_writes(&self, count: u32) {
        self.transient_failures.store(count, Ordering::SeqCst);
    }

    /// The next `count` ledger writes land, then report a transient error as
    /// if the commit acknowledgement was lost.
    pub fn lose_next_acks(&self, count: u32) {
        self.lost_acks.store(count, Ordering::SeqCst);
    }

    /// Moves a row's timestamp back, as if it was written `age` ago.
    pub fn backdate(&self, transaction_id: Uuid, age: Duration) {
        let mut state = self.state.lock().unwrap();
        let row = state.reservation_mut(transaction_id).unwrap();
        row.created_at -= age;
    }

    pub fn balance_of(&self, user_id: &UserId) -> i64 {
        self.state.lock().unwrap().users[user_id].user.credits_balance
    }

    /// A user's rows in the order they were written.
    pub fn transactions_of(&self, user_id: &UserId) -> Vec<CreditTransaction> {
        self.state
            .lock()
            .unwrap()
            .transactions
            .iter()
            .filter(|tx| tx.user_id == *user_id)
            .cloned()
            .collect()
    }

    pub fn user_count(&self) -> usize {
        self.state.lock().unwrap().users.len()
    }

    pub fn generations_of(&self, user_id: &UserId) -> Vec<GenerationRecord> {
        self.state
            .lock()
            .unwrap()
            .generations
            .iter()
            .filter(|record| record.user_id == *user_id)
            .cloned()
            .collect()
    }

    fn take_transient_failure(&self) -> AppResult<()> {
        take_one(&self.transient_failures, "connection reset")
    }

    fn take_lost_ack(&self) -> AppResult<()> {
        take_one(&self.lost_acks, "Failed to commit transaction: connection reset")
    }

    /// Runs a ledger write with the configured failures around it.
    fn write<T>(&self, op: impl FnOnce(&mut State) -> AppResult<T>) -> AppResult<T> {
        self.take_transient_failure()?;
        let written = op(&mut *self.state.lock().unwrap())?;
        self.take_lost_ack()?;
        Ok(written)
    }
}

fn take_one(counter: &AtomicU32, message: &str) -> AppResult<()> {
    let remaining = counter.load(Ordering::SeqCst);
    if remaining > 0 {
        counter.store(remaining - 1, Ordering::SeqCst);
        return Err(AppError::StorageUnavailable {
            message: message.to_string(),
        });
    }
    Ok(())
}

fn page<T: Clone>(items: &[T], offset: i64, limit: i64) -> Vec<T> {
    items
        .iter()
        .skip(usize::try_from(offset).unwrap())
        .take(usize::try_from(limit).unwrap())
        .cloned()
        .collect()
}

#[async_trait::async_trait]
impl CreditStorePort for InMemoryStore {
    async fn get_account(&self, user_id: &UserId) -> AppResult<Option<CreditAccount>> {
        let state = self.state.lock().unwrap();
        Ok(state.users.get(user_id).map(|row| CreditAccount {
            user_id: *user_id,
            balance: row.user.credits_balance,
            updated_at: row.user.updated_at,
        }))
    }

    async fn apply_mutation(&self, mutation: &LedgerMutation) -> AppResult<LedgerEntry> {
        self.write(|state| state.apply(mutation))
    }

    async fn commit_reservation(&self, transaction_id: Uuid) -> AppResult<CreditTransaction> {
        self.write(|state| state.commit(transaction_id))
    }

    async fn release_reservation(
        &self,
        transaction_id: Uuid,
        description: &str,
    ) -> AppResult<LedgerEntry> {
        self.write(|state| state.release(transaction_id, description))
    }

    async fn release_stale_reservations(
        &self,
        cutoff: OffsetDateTime,
        description: &str,
    ) -> AppResult<Vec<LedgerEntry>> {
        let mut state = self.state.lock().unwrap();
        let stale: Vec<Uuid> = state
            .transactions
            .iter()
            .filter(|tx| tx.status == TransactionStatus::Pending && tx.created_at <= cutoff)
            .map(|tx| tx.id)
            .collect();
        stale
            .into_iter()
            .map(|id| state.release(id, description))
            .collect()
    }

    async fn list_transactions(
        &self,
        user_id: &UserId,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<CreditTransaction>> {
        let mut rows = self.transactions_of(user_id);
        rows.reverse();
        Ok(page(&rows, offset, limit))
    }

    async fn count_transactions(&self, user_id: &UserId) -> AppResult<i64> {
        Ok(i64::try_from(self.transactions_of(user_id).len()).unwrap())
    }
}

#[async_trait::async_trait]
impl UserStorePort for InMemoryStore {
    async fn find_user_by_id(&self, id: &UserId) -> AppResult<Option<UserPublic>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .users
            .get(id)
            .map(|row| row.user.clone()))
    }

    async fn find_user_by_identity(
        &self,
        provider: &str,
        provider_user_id: &str,
    ) -> AppResult<Option<UserPublic>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .users
            .values()
            .find(|row| row.provider == provider && row.provider_user_id == provider_user_id)
            .map(|row| row.user.clone()))
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<UserPublic>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .users
            .values()
            .find(|row| row.user.email == email)
            .map(|row| row.user.clone()))
    }

    async fn create_user(
        &self,
        identity: &SocialIdentity,
        signup_bonus: i64,
    ) -> AppResult<Option<UserPublic>> {
        let mut state = self.state.lock().unwrap();
        if state.users.values().any(|row| row.user.email == identity.email) {
            return Ok(None);
        }

        let id = UserId::new();
        let now = OffsetDateTime::now_utc();
        state.users.insert(
            id,
            UserRow {
                user: UserPublic {
                    id,
                    email: identity.email.clone(),
                    display_name: identity.display_name.clone(),
                    avatar_url: identity.avatar_url.clone(),
                    auth_provider: identity.provider.as_str().to_string(),
                    credits_balance: 0,
                    created_at: now,
                    updated_at: now,
                    last_login: None,
                },
                provider: identity.provider.as_str().to_string(),
                provider_user_id: identity.provider_user_id.clone(),
            },
        );

        if signup_bonus > 0 {
            let bonus = LedgerMutation::credit(
                id,
                signup_bonus,
                TransactionType::SignupBonus,
                SIGNUP_BONUS_DESCRIPTION,
            )?;
            state.apply(&bonus)?;
        }

        Ok(state.users.get(&id).map(|row| row.user.clone()))
    }

    async fn link_identity(&self, user_id: &UserId, identity: &SocialIdentity) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        let row = state.users.get_mut(user_id).ok_or_else(|| AppError::NotFound {
            message: "User not found".to_string(),
        })?;
        row.provider = identity.provider.as_str().to_string();
        row.provider_user_id = identity.provider_user_id.clone();
        Ok(())
    }

    async fn record_login(&self, user_id: &UserId) -> AppResult<UserPublic> {
        let mut state = self.state.lock().unwrap();
        let row = state.users.get_mut(user_id).ok_or_else(|| AppError::NotFound {
            message: "User not found".to_string(),
        })?;
        row.user.last_login = Some(OffsetDateTime::now_utc());
        Ok(row.user.clone())
    }
}

#[async_trait::async_trait]
impl PaymentStorePort for InMemoryStore {
    async fn list_active_packages(&self) -> AppResult<Vec<CreditPackage>> {
        let mut packages: Vec<CreditPackage> = self
            .state
            .lock()
            .unwrap()
            .packages
            .iter()
            .filter(|p| p.is_active)
            .cloned()
            .collect();
        packages.sort_by_key(|p| p.sort_order);
        Ok(packages)
    }

    async fn find_package(&self, package_id: Uuid) -> AppResult<Option<CreditPackage>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .packages
            .iter()
            .find(|p| p.id == package_id)
            .cloned())
    }

    async fn create_payment(&self, payment: &Payment) -> AppResult<()> {
        self.state
            .lock()
            .unwrap()
            .payments
            .insert(payment.id, payment.clone());
        Ok(())
    }

    async fn find_payment(&self, payment_id: Uuid) -> AppResult<Option<Payment>> {
        Ok(self.state.lock().unwrap().payments.get(&payment_id).cloned())
    }

    async fn complete_payment(
        &self,
        payment_id: Uuid,
        provider_payment_id: Option<&str>,
        credit: &LedgerMutation,
    ) -> AppResult<LedgerEntry> {
        self.write(|state| {
            if state.transactions.iter().any(|tx| tx.id == credit.id) {
                return state.apply(credit);
            }

            let payment = state
                .payments
                .get(&payment_id)
                .cloned()
                .ok_or_else(|| AppError::NotFound {
                    message: "Payment not found".to_string(),
                })?;
            if payment.status != PaymentStatus::Pending {
                return Err(AppError::ValidationError {
                    message: "Payment is not pending".to_string(),
                });
            }

            let entry = state.apply(credit)?;
            if let Some(stored) = state.payments.get_mut(&payment_id) {
                stored.status = PaymentStatus::Completed;
                stored.provider_payment_id = provider_payment_id.map(ToString::to_string);
            }
            Ok(entry)
        })
    }

    async fn fail_payment(
        &self,
        payment_id: Uuid,
        provider_payment_id: Option<&str>,
    ) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        let payment = state
            .payments
            .get_mut(&payment_id)
            .filter(|p| p.status == PaymentStatus::Pending)
            .ok_or_else(|| AppError::ValidationError {
                message: "Payment is not pending".to_string(),
            })?;
        payment.status = PaymentStatus::Failed;
        payment.provider_payment_id = provider_payment_id.map(ToString::to_string);
        Ok(())
    }
}

#[async_trait::async_trait]
impl GenerationStorePort for InMemoryStore {
    async fn record_generation(&self, record: &GenerationRecord) -> AppResult<()> {
        self.state.lock().unwrap().generations.push(record.clone());
        Ok(())
    }

    async fn list_generations(
        &self,
        user_id: &UserId,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<GenerationRecord>> {
        let mut records = self.generations_of(user_id);
        records.reverse();
        Ok(page(&records, offset, limit))
    }

    async fn count_generations(&self, user_id: &UserId) -> AppResult<i64> {
        Ok(i64::try_from(self.generations_of(user_id).len()).unwrap())
    }
}

#[derive(Default)]
struct GalleryState {
    templates: Vec<(Template, bool)>,
    categories: Vec<Category>,
    favorites: HashSet<(UserId, Uuid)>,
    feedback: HashMap<(UserId, Uuid), TemplateFeedback>,
}

#[derive(Default)]
pub struct InMemoryGallery {
    state: Mutex<GalleryState>,
}

impl InMemoryGallery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_category(&self, name: &str, slug: &str) -> Category {
        let mut state = self.state.lock().unwrap();
        let category = Category {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug: slug.to_string(),
            description: None,
            icon_name: None,
            color: None,
            parent_id: None,
            sort_order: i32::try_from(state.categories.len()).unwrap(),
        };
        state.categories.push(category.clone());
        category
    }

    /// Adds an active template; `usage_count` drives the base order.
    pub fn seed_template(&self, slug: &str, usage_count: i64, categories: &[&Category]) -> Template {
        let template = Template {
            id: Uuid::new_v4(),
            title: slug.replace('-', " "),
            slug: slug.to_string(),
            description: Some(format!("Template {slug}")),
            preview_image_url: format!("/images/templates/{slug}.jpg"),
            width: 1080,
            height: 1080,
            is_premium: false,
            is_featured: false,
            view_count: 0,
            usage_count,
            tags: Vec::new(),
            categories: categories
                .iter()
                .map(|c| CategorySummary {
                    id: c.id,
                    name: c.name.clone(),
                    slug: c.slug.clone(),
                })
                .collect(),
            created_at: OffsetDateTime::now_utc(),
        };
        self.state
            .lock()
            .unwrap()
            .templates
            .push((template.clone(), true));
        template
    }

    pub fn seed_inactive_template(&self, slug: &str) -> Template {
        let template = self.seed_template(slug, 0, &[]);
        let mut state = self.state.lock().unwrap();
        if let Some(entry) = state.templates.iter_mut().find(|(t, _)| t.id == template.id) {
            entry.1 = false;
        }
        template
    }

    pub fn feedback_for(&self, user_id: &UserId, template_id: Uuid) -> Option<TemplateFeedback> {
        self.state
            .lock()
            .unwrap()
            .feedback
            .get(&(*user_id, template_id))
            .cloned()
    }
}

#[async_trait::async_trait]
impl GalleryStorePort for InMemoryGallery {
    async fn search_templates(&self, filter: &TemplateFilter) -> AppResult<Vec<Template>> {
        let state = self.state.lock().unwrap();
        let query = filter.normalized_query().map(str::to_lowercase);
        let mut matches: Vec<Template> = state
            .templates
            .iter()
            .filter(|(_, active)| *active)
            .map(|(template, _)| template)
            .filter(|t| {
                query.as_ref().is_none_or(|q| {
                    t.title.to_lowercase().contains(q)
                        || t.description
                            .as_ref()
                            .is_some_and(|d| d.to_lowercase().contains(q))
                })
            })
            .filter(|t| {
                filter.category_slugs.is_empty()
                    || t.categories
                        .iter()
                        .any(|c| filter.category_slugs.contains(&c.slug))
            })
            .filter(|t| filter.is_premium.is_none_or(|p| t.is_premium == p))
            .filter(|t| filter.is_featured.is_none_or(|f| t.is_featured == f))
            .cloned()
            .collect();

        matches.sort_by(|a, b| {
            b.is_featured
                .cmp(&a.is_featured)
                .then(b.usage_count.cmp(&a.usage_count))
                .then(b.view_count.cmp(&a.view_count))
                .then(b.created_at.cmp(&a.created_at))
                .then(a.id.cmp(&b.id))
        });

        Ok(matches
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect())
    }

    async fn find_template_by_slug(&self, slug: &str) -> AppResult<Option<Template>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .templates
            .iter()
            .find(|(t, active)| *active && t.slug == slug)
            .map(|(t, _)| t.clone()))
    }

    async fn template_exists(&self, template_id: Uuid) -> AppResult<bool> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .templates
            .iter()
            .any(|(t, active)| *active && t.id == template_id))
    }

    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        Ok(self.state.lock().unwrap().categories.clone())
    }

    async fn find_category_by_slug(&self, slug: &str) -> AppResult<Option<Category>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .categories
            .iter()
            .find(|c| c.slug == slug)
            .cloned())
    }

    async fn list_favorites(&self, user_id: &UserId) -> AppResult<Vec<Template>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .templates
            .iter()
            .filter(|(t, _)| state.favorites.contains(&(*user_id, t.id)))
            .map(|(t, _)| t.clone())
            .collect())
    }

    async fn add_favorite(&self, user_id: &UserId, template_id: Uuid) -> AppResult<()> {
        self.state
            .lock()
            .unwrap()
            .favorites
            .insert((*user_id, template_id));
        Ok(())
    }

    async fn remove_favorite(&self, user_id: &UserId, template_id: Uuid) -> AppResult<()> {
        self.state
            .lock()
            .unwrap()
            .favorites
            .remove(&(*user_id, template_id));
        Ok(())
    }

    async fn is_favorite(&self, user_id: &UserId, template_id: Uuid) -> AppResult<bool> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .favorites
            .contains(&(*user_id, template_id)))
    }

    async fn upsert_feedback(&self, feedback: &TemplateFeedback) -> AppResult<()> {
        self.state
            .lock()
            .unwrap()
            .feedback
            .insert((feedback.user_id, feedback.template_id), feedback.clone());
        Ok(())
    }
}

pub fn credit_settings() -> CreditSettings {
    CreditSettings {
        signup_bonus: 10,
        history_default_limit: 20,
        history_max_limit: 100,
        retry: RetryPolicy {
            max_retries: 2,
            backoff: Duration::from_millis(1),
        },
    }
}
