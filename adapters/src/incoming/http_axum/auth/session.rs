use tower_sessions::{Expiry, SessionManagerLayer, cookie::SameSite};
use tower_sessions_redis_store::{RedisStore, fred::prelude::*};

use craftads_application::error::AppError;
use craftads_application::infrastructure_config::AuthConfig;

const SESSION_TTL_DAYS: i64 = 30;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub secure: bool,
    pub same_site: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "craftads_session".to_string(),
            secure: false,
            same_site: "Lax".to_string(),
        }
    }
}

impl From<&AuthConfig> for SessionConfig {
    fn from(auth: &AuthConfig) -> Self {
        Self {
            cookie_name: auth.cookie_name.clone(),
            secure: auth.cookie_secure,
            ..Self::default()
        }
    }
}

fn same_site(value: &str) -> SameSite {
    match value.to_lowercase().as_str() {
        "strict" => SameSite::Strict,
        "none" => SameSite::None,
        _ => SameSite::Lax,
    }
}

pub async fn create_session_layer(
    redis_url: &str,
    session_config: &SessionConfig,
) -> Result<SessionManagerLayer<RedisStore<Client>>, AppError> {
    let redis_config = Config::from_url(redis_url).map_err(|e| AppError::CacheError {
        message: format!("Invalid session store URL: {}", e),
    })?;

    let redis_client = Client::new(redis_config, None, None, None);
    redis_client.connect();
    redis_client
        .wait_for_connect()
        .await
        .map_err(|e| AppError::CacheError {
            message: format!("Failed to connect to session store: {}", e),
        })?;

    let session_layer = SessionManagerLayer::new(RedisStore::new(redis_client))
        .with_name(session_config.cookie_name.clone())
        .with_same_site(same_site(&session_config.same_site))
        .with_secure(session_config.secure)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(time::Duration::days(SESSION_TTL_DAYS)));

    Ok(session_layer)
}
