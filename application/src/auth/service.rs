use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::ports::incoming::auth::AuthUseCase;
use crate::ports::outgoing::user_store::UserStorePort;
use domain::auth::{SocialIdentity, UserId, UserPublic};

pub struct AuthService {
    user_store: Arc<dyn UserStorePort>,
    signup_bonus: i64,
}

impl AuthService {
    pub fn new(user_store: Arc<dyn UserStorePort>, signup_bonus: i64) -> Self {
        Self {
            user_store,
            signup_bonus,
        }
    }

    async fn ensure_user(&self, identity: &SocialIdentity) -> AppResult<UserPublic> {
        if let Some(user) = self
            .user_store
            .find_user_by_identity(identity.provider.as_str(), &identity.provider_user_id)
            .await?
        {
            return Ok(user);
        }

        if let Some(user) = self.user_store.find_user_by_email(&identity.email).await? {
            self.user_store.link_identity(&user.id, identity).await?;
            tracing::info!(
                user_id = %user.id,
                provider = identity.provider.as_str(),
                "Linked sign-in identity to existing user"
            );
            return Ok(user);
        }

        if let Some(user) = self
            .user_store
            .create_user(identity, self.signup_bonus)
            .await?
        {
            tracing::info!(
                user_id = %user.id,
                signup_bonus = self.signup_bonus,
                "Provisioned new user"
            );
            return Ok(user);
        }

        // Lost a race with a concurrent first sign-in for the same email.
        self.user_store
            .find_user_by_email(&identity.email)
            .await?
            .ok_or(AppError::InternalServerError)
    }
}

#[async_trait::async_trait]
impl AuthUseCase for AuthService {
    async fn sign_in(&self, identity: SocialIdentity) -> AppResult<UserPublic> {
        if identity.email.trim().is_empty() {
            return Err(AppError::ValidationError {
                message: "Sign-in provider did not return an email address".to_string(),
            });
        }

        let user = self.ensure_user(&identity).await?;
        self.user_store.record_login(&user.id).await
    }

    async fn logout(&self) -> AppResult<()> {
        Ok(())
    }

    async fn me(&self, user_id: &UserId) -> AppResult<UserPublic> {
        self.user_store
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound {
                message: "User not found".to_string(),
            })
    }
}
