use axum_login::{AuthUser, AuthnBackend, UserId as AxumUserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use craftads_application::error::AppError;
use craftads_application::ports::outgoing::user_store::DynUserStorePort;
use domain::auth::{UserId, UserPublic};

/// Session principal. Only stable identity fields live in the session;
/// balances are always read fresh from the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub auth_provider: String,
}

impl User {
    pub fn user_id(&self) -> UserId {
        UserId::from_uuid(self.id)
    }
}

impl From<UserPublic> for User {
    fn from(user_public: UserPublic) -> Self {
        Self {
            id: *user_public.id.as_uuid(),
            email: user_public.email,
            auth_provider: user_public.auth_provider,
        }
    }
}

impl AuthUser for User {
    type Id = Uuid;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn session_auth_hash(&self) -> &[u8] {
        self.email.as_bytes()
    }
}

/// A provider identity that has already been verified by the OAuth exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub provider: String,
    pub provider_user_id: String,
}

#[derive(Clone)]
pub struct AuthBackend {
    user_store: DynUserStorePort,
}

impl AuthBackend {
    pub fn new(user_store: DynUserStorePort) -> Self {
        Self { user_store }
    }
}

impl AuthnBackend for AuthBackend {
    type User = User;
    type Credentials = Credentials;
    type Error = AppError;

    async fn authenticate(
        &self,
        creds: Self::Credentials,
    ) -> Result<Option<Self::User>, Self::Error> {
        let user = self
            .user_store
            .find_user_by_identity(&creds.provider, &creds.provider_user_id)
            .await
            .map_err(|_| AppError::InternalServerError)?;

        Ok(user.map(User::from))
    }

    async fn get_user(
        &self,
        user_id: &AxumUserId<Self>,
    ) -> Result<Option<Self::User>, Self::Error> {
        let user = self
            .user_store
            .find_user_by_id(&UserId::from_uuid(*user_id))
            .await
            .map_err(|_| AppError::InternalServerError)?;

        Ok(user.map(User::from))
    }
}
