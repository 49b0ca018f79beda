use std::sync::Arc;

use crate::error::AppResult;
use domain::auth::{SocialIdentity, UserId, UserPublic};

#[async_trait::async_trait]
pub trait UserStorePort: Send + Sync {
    async fn find_user_by_id(&self, id: &UserId) -> AppResult<Option<UserPublic>>;
    async fn find_user_by_identity(
        &self,
        provider: &str,
        provider_user_id: &str,
    ) -> AppResult<Option<UserPublic>>;
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<UserPublic>>;
    /// Inserts the user with `signup_bonus` credits and the matching
    /// `signup_bonus` ledger row in one transaction. Returns `None` when a
    /// concurrent sign-in already created a user with the same email.
    async fn create_user(
        &self,
        identity: &SocialIdentity,
        signup_bonus: i64,
    ) -> AppResult<Option<UserPublic>>;
    async fn link_identity(&self, user_id: &UserId, identity: &SocialIdentity) -> AppResult<()>;
    async fn record_login(&self, user_id: &UserId) -> AppResult<UserPublic>;
}

pub type DynUserStorePort = Arc<dyn UserStorePort>;
