use crate::error::AppResult;
use domain::auth::{SocialIdentity, UserId, UserPublic};

#[async_trait::async_trait]
pub trait AuthUseCase: Send + Sync {
    /// Idempotent "ensure user exists" step run once per successful sign-in.
    async fn sign_in(&self, identity: SocialIdentity) -> AppResult<UserPublic>;
    async fn logout(&self) -> AppResult<()>;
    async fn me(&self, user_id: &UserId) -> AppResult<UserPublic>;
}
