use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use axum_login::AuthManagerLayerBuilder;
use craftads_application::error::AppError;
use craftads_application::ports::outgoing::user_store::DynUserStorePort;
#[cfg(feature = "docs")]
use utoipa::OpenApi;
#[cfg(feature = "docs")]
use utoipa_swagger_ui::SwaggerUi;

use crate::incoming::http_axum::{
    auth::{
        backend::AuthBackend,
        oauth_google::{google_auth_callback, google_auth_start},
        session::{SessionConfig, create_session_layer},
    },
    handlers::{
        auth::{logout_handler, me_handler},
        credits::{deduct_credits, get_balance, get_history, validate_credits},
        gallery::{
            get_template, list_categories, list_favorites, list_templates, submit_feedback,
            update_favorite,
        },
        generation::{generate_ad, generation_history, list_prompts, model_info},
        health::health_check,
        purchases::{complete_purchase, initiate_purchase, list_packages},
    },
    middleware::rate_limit::{
        RateLimiter, create_auth_rate_limiter, create_general_rate_limiter,
        create_generation_rate_limiter,
    },
    router_ext::{RouterExt, SessionAuthLayer},
};
use crate::shared::app_state::AppState;

#[cfg(feature = "docs")]
use crate::incoming::http_axum::docs::ApiDoc;

/// Source images arrive inline as data URIs, so `/generate` accepts larger bodies.
const GENERATE_BODY_LIMIT_BYTES: usize = 20 * 1024 * 1024;

pub async fn build_application_router(
    state: &AppState,
    user_store: DynUserStorePort,
) -> Result<Router<AppState>, AppError> {
    let session_config = SessionConfig::from(&state.config.auth);
    let session_layer =
        create_session_layer(&state.config.redis.redis_url, &session_config).await?;
    let auth_layer =
        AuthManagerLayerBuilder::new(AuthBackend::new(user_store), session_layer).build();

    let rate_limit = &state.config.rate_limit;
    let (general, auth, generation) = if rate_limit.enabled {
        (
            Some(create_general_rate_limiter(rate_limit)),
            Some(create_auth_rate_limiter(rate_limit)),
            Some(create_generation_rate_limiter(rate_limit)),
        )
    } else {
        (None, None, None)
    };

    let router = build_public_routes(general.clone())
        .merge(build_account_routes(auth_layer.clone(), general))
        .merge(build_generation_routes(auth_layer.clone(), generation))
        .merge(build_sign_in_routes(auth_layer, auth));

    Ok(router.with_request_id())
}

fn build_public_routes(limiter: Option<Arc<RateLimiter>>) -> Router<AppState> {
    let router = Router::new()
        .route("/health", get(health_check))
        .route("/credits/packages", get(list_packages))
        .route("/generate/model", get(model_info))
        .route("/prompts", get(list_prompts))
        .route("/gallery/templates", get(list_templates))
        .route("/gallery/templates/{template}", get(get_template))
        .route("/gallery/categories", get(list_categories))
        .with_rate_limit(limiter);

    #[cfg(feature = "docs")]
    {
        router.merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
    }

    #[cfg(not(feature = "docs"))]
    {
        router
    }
}

fn build_account_routes(
    auth_layer: SessionAuthLayer,
    limiter: Option<Arc<RateLimiter>>,
) -> Router<AppState> {
    Router::new()
        .route("/credits/balance", get(get_balance))
        .route("/credits/deduct", post(deduct_credits))
        .route("/credits/history", get(get_history))
        .route("/credits/validate", post(validate_credits))
        .route("/credits/purchase", post(initiate_purchase))
        .route("/credits/purchase/complete", post(complete_purchase))
        .route("/generations/history", get(generation_history))
        .route(
            "/gallery/favorites",
            get(list_favorites).post(update_favorite),
        )
        .route(
            "/gallery/templates/{template}/feedback",
            post(submit_feedback),
        )
        .route("/auth/logout", post(logout_handler))
        .route("/auth/me", get(me_handler))
        .with_auth(auth_layer)
        .with_rate_limit(limiter)
}

fn build_generation_routes(
    auth_layer: SessionAuthLayer,
    limiter: Option<Arc<RateLimiter>>,
) -> Router<AppState> {
    Router::new()
        .route("/generate", post(generate_ad))
        .with_body_limit(GENERATE_BODY_LIMIT_BYTES)
        .with_auth(auth_layer)
        .with_rate_limit(limiter)
}

fn build_sign_in_routes(
    auth_layer: SessionAuthLayer,
    limiter: Option<Arc<RateLimiter>>,
) -> Router<AppState> {
    Router::new()
        .route("/auth/google/start", get(google_auth_start))
        .route("/auth/google/callback", get(google_auth_callback))
        .with_auth(auth_layer)
        .with_rate_limit(limiter)
}
