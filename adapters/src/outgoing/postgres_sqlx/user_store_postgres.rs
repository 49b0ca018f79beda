use sqlx::PgPool;
use sqlx::postgres::PgRow;
use tracing::{debug, instrument};
use uuid::Uuid;

use craftads_application::{
    error::{AppError, AppResult},
    ports::outgoing::user_store::UserStorePort,
};
use domain::auth::{SocialIdentity, UserId, UserPublic};
use domain::credits::{LedgerMutation, SIGNUP_BONUS_DESCRIPTION, TransactionType};

use super::ledger_sql;
use super::utils::{PostgresExecutor, begin_transaction, column, commit_transaction, db_error};

const USER_COLUMNS: &str = "id, email, display_name, avatar_url, auth_provider, \
     credits_balance, created_at, updated_at, last_login";

const JOINED_USER_COLUMNS: &str = "u.id, u.email, u.display_name, u.avatar_url, u.auth_provider, \
     u.credits_balance, u.created_at, u.updated_at, u.last_login";

fn user_from_row(row: &PgRow) -> AppResult<UserPublic> {
    Ok(UserPublic {
        id: UserId::from_uuid(column(row, "id")?),
        email: column(row, "email")?,
        display_name: column(row, "display_name")?,
        avatar_url: column(row, "avatar_url")?,
        auth_provider: column(row, "auth_provider")?,
        credits_balance: column(row, "credits_balance")?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
        last_login: column(row, "last_login")?,
    })
}

pub struct PostgresUserStoreAdapter {
    pool: PgPool,
    executor: PostgresExecutor,
}

impl PostgresUserStoreAdapter {
    pub fn new(pool: PgPool, query_timeout_secs: u64) -> Self {
        Self {
            pool,
            executor: PostgresExecutor::new(query_timeout_secs),
        }
    }

    async fn create_in_transaction(
        &self,
        identity: &SocialIdentity,
        signup_bonus: i64,
    ) -> AppResult<Option<UserPublic>> {
        let mut tx = begin_transaction(&self.pool).await?;

        let inserted = sqlx::query(
            r"
            INSERT INTO users (id, email, display_name, avatar_url, auth_provider, auth_provider_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (email) DO NOTHING
            RETURNING id
            ",
        )
        .bind(Uuid::new_v4())
        .bind(identity.email.as_str())
        .bind(identity.display_name.as_deref())
        .bind(identity.avatar_url.as_deref())
        .bind(identity.provider.as_str())
        .bind(identity.provider_user_id.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to insert user"))?;

        let Some(inserted) = inserted else {
            return Ok(None);
        };
        let user_id = UserId::from_uuid(column(&inserted, "id")?);

        sqlx::query(
            r"
            INSERT INTO user_identities (id, user_id, provider, provider_user_id)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(Uuid::new_v4())
        .bind(user_id.as_uuid())
        .bind(identity.provider.as_str())
        .bind(identity.provider_user_id.as_str())
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to insert identity"))?;

        if signup_bonus > 0 {
            let bonus = LedgerMutation::credit(
                user_id,
                signup_bonus,
                TransactionType::SignupBonus,
                SIGNUP_BONUS_DESCRIPTION,
            )?;
            ledger_sql::apply_mutation(&mut *tx, &bonus).await?;
        }

        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(user_id.as_uuid())
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error("Failed to reload user"))?;
        let user = user_from_row(&row)?;

        commit_transaction(tx).await?;
        Ok(Some(user))
    }
}

#[async_trait::async_trait]
impl UserStorePort for PostgresUserStoreAdapter {
    #[instrument(skip(self))]
    async fn find_user_by_id(&self, id: &UserId) -> AppResult<Option<UserPublic>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = self
            .executor
            .execute_with_timeout(
                || sqlx::query(&sql).bind(id.as_uuid()).fetch_optional(&self.pool),
                &format!("Failed to find user {}", id),
            )
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn find_user_by_identity(
        &self,
        provider: &str,
        provider_user_id: &str,
    ) -> AppResult<Option<UserPublic>> {
        let sql = format!(
            "SELECT {JOINED_USER_COLUMNS} FROM user_identities ui JOIN users u ON ui.user_id = u.id \
             WHERE ui.provider = $1 AND ui.provider_user_id = $2"
        );
        let row = self
            .executor
            .execute_with_timeout(
                || {
                    sqlx::query(&sql)
                        .bind(provider)
                        .bind(provider_user_id)
                        .fetch_optional(&self.pool)
                },
                &format!(
                    "Failed to find identity for provider {} user {}",
                    provider, provider_user_id
                ),
            )
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<UserPublic>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = self
            .executor
            .execute_with_timeout(
                || sqlx::query(&sql).bind(email).fetch_optional(&self.pool),
                &format!("Failed to find user with email {}", email),
            )
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    #[instrument(skip(self, identity), fields(email = %identity.email))]
    async fn create_user(
        &self,
        identity: &SocialIdentity,
        signup_bonus: i64,
    ) -> AppResult<Option<UserPublic>> {
        let created = self
            .executor
            .bound(
                self.create_in_transaction(identity, signup_bonus),
                "Failed to create user",
            )
            .await?;

        match &created {
            Some(user) => debug!(
                "Created user {} with {} signup credits",
                user.id, user.credits_balance
            ),
            None => debug!("User with email {} already exists", identity.email),
        }

        Ok(created)
    }

    #[instrument(skip(self, identity))]
    async fn link_identity(&self, user_id: &UserId, identity: &SocialIdentity) -> AppResult<()> {
        let identity_id = Uuid::new_v4();
        self.executor
            .execute_with_timeout(
                || {
                    sqlx::query(
                        r"
                    INSERT INTO user_identities (id, user_id, provider, provider_user_id)
                    VALUES ($1, $2, $3, $4)
                    ON CONFLICT (provider, provider_user_id) DO NOTHING
                    ",
                    )
                    .bind(identity_id)
                    .bind(user_id.as_uuid())
                    .bind(identity.provider.as_str())
                    .bind(identity.provider_user_id.as_str())
                    .execute(&self.pool)
                },
                &format!(
                    "Failed to create identity for provider {} user {}",
                    identity.provider.as_str(),
                    identity.provider_user_id
                ),
            )
            .await?;

        debug!(
            "Linked identity for provider {} user {} to user {}",
            identity.provider.as_str(),
            identity.provider_user_id,
            user_id
        );

        Ok(())
    }

    #[instrument(skip(self))]
    async fn record_login(&self, user_id: &UserId) -> AppResult<UserPublic> {
        let sql = format!(
            "UPDATE users SET last_login = NOW(), updated_at = NOW() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let row = self
            .executor
            .execute_with_timeout(
                || sqlx::query(&sql).bind(user_id.as_uuid()).fetch_optional(&self.pool),
                &format!("Failed to record login for user {}", user_id),
            )
            .await?
            .ok_or_else(|| AppError::NotFound {
                message: "User not found".to_string(),
            })?;

        user_from_row(&row)
    }
}
