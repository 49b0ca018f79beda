use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_login::AuthSession;
use oauth2::{
    AccessToken, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet,
    EndpointSet, PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl,
    basic::BasicClient,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{error, info};
use url::Url;
#[cfg(feature = "docs")]
use utoipa::ToSchema;

use crate::incoming::http_axum::auth::backend::{AuthBackend, User};
use crate::incoming::http_axum::error_mapper::HttpError;
use crate::shared::app_state::AppState;
use craftads_application::{error::AppError, infrastructure_config::AuthConfig};
use domain::auth::{AuthProvider, SocialIdentity};

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://www.googleapis.com/oauth2/v4/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";
const OAUTH_STATE_KEY: &str = "oauth_state";

type GoogleClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

#[derive(Debug, Serialize, Deserialize)]
struct GoogleUserInfo {
    sub: String,
    email: String,
    name: Option<String>,
    picture: Option<String>,
}

impl From<GoogleUserInfo> for SocialIdentity {
    fn from(info: GoogleUserInfo) -> Self {
        Self {
            provider: AuthProvider::Google,
            provider_user_id: info.sub,
            email: info.email,
            display_name: info.name,
            avatar_url: info.picture,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct OAuthState {
    csrf_state: CsrfToken,
    pkce_verifier: PkceCodeVerifier,
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "docs", derive(ToSchema))]
pub struct AuthRequest {
    code: String,
    state: String,
}

/// Builds the Google client, or `ServiceUnavailable` when sign-in is not configured.
fn google_client(config: &AuthConfig) -> Result<GoogleClient, AppError> {
    let (Some(client_id), Some(client_secret), Some(redirect_url)) = (
        config.google_client_id.clone(),
        config.google_client_secret.clone(),
        config.google_redirect_url.clone(),
    ) else {
        return Err(AppError::ServiceUnavailable);
    };

    let invalid = |what: &str| AppError::ConfigError {
        message: format!("Invalid Google OAuth {what}"),
    };

    Ok(BasicClient::new(ClientId::new(client_id))
        .set_client_secret(ClientSecret::new(client_secret))
        .set_auth_uri(
            AuthUrl::new(GOOGLE_AUTH_URL.to_string()).map_err(|_| invalid("auth URL"))?,
        )
        .set_token_uri(
            TokenUrl::new(GOOGLE_TOKEN_URL.to_string()).map_err(|_| invalid("token URL"))?,
        )
        .set_redirect_uri(RedirectUrl::new(redirect_url).map_err(|_| invalid("redirect URL"))?))
}

#[cfg_attr(feature = "docs", utoipa::path(
    get,
    path = "/auth/google/start",
    tag = "auth",
    summary = "Start Google sign-in",
    description = "Redirects to Google's authorization server with PKCE and CSRF protection.",
    responses(
        (status = 302, description = "Redirect to Google OAuth authorization server"),
        (status = 503, description = "Google sign-in is not configured"),
        (status = 500, description = "Internal server error")
    )
))]
pub async fn google_auth_start(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, HttpError> {
    let client = google_client(&state.config.auth)?;

    let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
    let csrf_token = CsrfToken::new_random();

    let oauth_state = OAuthState {
        csrf_state: csrf_token.clone(),
        pkce_verifier,
    };

    session
        .insert(OAUTH_STATE_KEY, &oauth_state)
        .await
        .map_err(|e| {
            error!("Failed to store OAuth state in session: {}", e);
            HttpError(AppError::InternalServerError)
        })?;

    let (auth_url, _) = client
        .authorize_url(|| csrf_token)
        .add_scope(Scope::new("openid".to_string()))
        .add_scope(Scope::new("email".to_string()))
        .add_scope(Scope::new("profile".to_string()))
        .set_pkce_challenge(pkce_challenge)
        .url();

    info!("Redirecting to Google sign-in");

    Ok(Redirect::to(auth_url.as_ref()).into_response())
}

fn error_redirect_target(config: &AuthConfig, error_type: &str) -> String {
    if let Ok(mut url) = Url::parse(&config.frontend_error_url) {
        url.query_pairs_mut().append_pair("error", error_type);
        return url.into();
    }

    error!("Invalid frontend error URL configuration");
    match Url::parse(&format!("{}/login", config.public_base_url)) {
        Ok(mut fallback) => {
            fallback
                .query_pairs_mut()
                .append_pair("error", "config_error");
            fallback.into()
        }
        Err(_) => "/login?error=config_error".to_string(),
    }
}

fn redirect_to_error(config: &AuthConfig, error_type: &str) -> Response {
    let target = error_redirect_target(config, error_type);
    error!("Auth error, redirecting to: {}", target);
    Redirect::to(&target).into_response()
}

async fn validate_oauth_state(
    session: &Session,
    state_param: &str,
    config: &AuthConfig,
) -> Result<OAuthState, Response> {
    let oauth_state: OAuthState = match session.get(OAUTH_STATE_KEY).await {
        Ok(Some(state)) => state,
        Ok(None) => {
            error!("OAuth state not found in session");
            return Err(redirect_to_error(config, "invalid_state"));
        }
        Err(e) => {
            error!("Failed to retrieve OAuth state from session: {}", e);
            return Err(redirect_to_error(config, "session_error"));
        }
    };

    if oauth_state.csrf_state.secret() != state_param {
        error!("CSRF state validation failed");
        return Err(redirect_to_error(config, "invalid_state"));
    }

    if let Err(e) = session.remove::<OAuthState>(OAUTH_STATE_KEY).await {
        error!("Failed to remove OAuth state from session: {}", e);
        return Err(redirect_to_error(config, "session_error"));
    }

    Ok(oauth_state)
}

async fn fetch_user_info(
    access_token: &AccessToken,
    config: &AuthConfig,
) -> Result<GoogleUserInfo, Response> {
    let response = match reqwest::Client::new()
        .get(GOOGLE_USERINFO_URL)
        .bearer_auth(access_token.secret())
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            error!("Failed to fetch user info: {}", e);
            return Err(redirect_to_error(config, "userinfo_fetch_failed"));
        }
    };

    if !response.status().is_success() {
        error!("Google API returned error: {}", response.status());
        return Err(redirect_to_error(config, "userinfo_api_error"));
    }

    match response.json().await {
        Ok(info) => Ok(info),
        Err(e) => {
            error!("Failed to parse user info: {}", e);
            Err(redirect_to_error(config, "userinfo_parse_failed"))
        }
    }
}

#[cfg_attr(feature = "docs", utoipa::path(
    get,
    path = "/auth/google/callback",
    tag = "auth",
    summary = "Handle Google OAuth callback",
    description = "Exchanges the authorization code, ensures the user exists (new users receive the signup bonus) and starts a session. Redirects to the frontend success URL, or to the error URL with an error parameter.",
    params(
        ("code" = String, Query, description = "Authorization code from Google OAuth"),
        ("state" = String, Query, description = "CSRF state token for validation")
    ),
    responses(
        (status = 302, description = "Redirect to the frontend")
    )
))]
pub async fn google_auth_callback(
    State(state): State<AppState>,
    session: Session,
    mut auth_session: AuthSession<AuthBackend>,
    Query(params): Query<AuthRequest>,
) -> Response {
    let config = &state.config.auth;

    let oauth_state = match validate_oauth_state(&session, &params.state, config).await {
        Ok(state) => state,
        Err(response) => return response,
    };

    let client = match google_client(config) {
        Ok(client) => client,
        Err(e) => {
            error!("Google OAuth client unavailable: {}", e);
            return redirect_to_error(config, "config_error");
        }
    };

    let token_result = match client
        .exchange_code(AuthorizationCode::new(params.code))
        .set_pkce_verifier(oauth_state.pkce_verifier)
        .request_async(&reqwest::Client::new())
        .await
    {
        Ok(result) => result,
        Err(e) => {
            error!("Failed to exchange authorization code: {}", e);
            return redirect_to_error(config, "token_exchange_failed");
        }
    };

    let user_info = match fetch_user_info(token_result.access_token(), config).await {
        Ok(info) => info,
        Err(response) => return response,
    };

    let user_public = match state.auth_use_case.sign_in(user_info.into()).await {
        Ok(user) => user,
        Err(e) => {
            error!("Failed to sign in Google identity: {}", e);
            return redirect_to_error(config, "auth_failed");
        }
    };

    let user = User::from(user_public);

    if let Err(e) = auth_session.login(&user).await {
        error!("Failed to log user into session: {}", e);
        return redirect_to_error(config, "login_failed");
    }

    info!(user_id = %user.id, "Google sign-in successful");

    Redirect::to(&config.frontend_success_url).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_in_is_unavailable_without_credentials() {
        let config = AuthConfig::default();
        assert!(matches!(
            google_client(&config),
            Err(AppError::ServiceUnavailable)
        ));
    }

    #[test]
    fn configured_client_builds() {
        let config = AuthConfig {
            google_client_id: Some("client".to_string()),
            google_client_secret: Some("secret".to_string()),
            google_redirect_url: Some("http://localhost:3001/auth/google/callback".to_string()),
            ..AuthConfig::default()
        };
        assert!(google_client(&config).is_ok());
    }

    #[test]
    fn error_redirect_appends_error_type() {
        let config = AuthConfig::default();
        let target = error_redirect_target(&config, "invalid_state");
        assert!(target.starts_with("http://localhost:3000/login?"));
        assert!(target.contains("error=auth_failed"));
        assert!(target.ends_with("error=invalid_state"));
    }

    #[test]
    fn broken_error_url_falls_back_to_login() {
        let config = AuthConfig {
            frontend_error_url: "not a url".to_string(),
            ..AuthConfig::default()
        };
        assert_eq!(
            error_redirect_target(&config, "auth_failed"),
            "http://localhost:3001/login?error=config_error"
        );
    }

    #[test]
    fn google_profile_becomes_social_identity() {
        let identity = SocialIdentity::from(GoogleUserInfo {
            sub: "1234".to_string(),
            email: "ada@example.com".to_string(),
            name: Some("Ada".to_string()),
            picture: None,
        });
        assert_eq!(identity.provider, AuthProvider::Google);
        assert_eq!(identity.provider_user_id, "1234");
        assert_eq!(identity.display_name.as_deref(), Some("Ada"));
    }
}
