use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::bootstrap::state::AppState;
use craftads_adapters::incoming::http_axum::routes::build_application_router;
use craftads_application::error::AppError;

const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

pub async fn create_router(state: AppState) -> Result<Router, AppError> {
    let (adapters_state, user_store) = state.to_adapters_state();
    let cors_layer = create_cors_layer(adapters_state.config.server.cors_origin.as_deref());

    let application_router = build_application_router(&adapters_state, user_store).await?;

    Ok(application_router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer),
        )
        .with_state(adapters_state))
}

fn create_cors_layer(cors_origin: Option<&str>) -> CorsLayer {
    let base_cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("authorization"),
            HeaderName::from_static("accept"),
            HeaderName::from_static("origin"),
            HeaderName::from_static("x-requested-with"),
        ])
        .allow_credentials(true);

    base_cors.allow_origin(cors_origin_header(cors_origin))
}

fn cors_origin_header(cors_origin: Option<&str>) -> HeaderValue {
    cors_origin
        .and_then(|origin| origin.parse::<HeaderValue>().ok())
        .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CORS_ORIGIN))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_origin_is_used() {
        assert_eq!(
            cors_origin_header(Some("https://app.craftads.example")),
            "https://app.craftads.example"
        );
    }

    #[test]
    fn missing_or_invalid_origin_falls_back_to_local_frontend() {
        assert_eq!(cors_origin_header(None), DEFAULT_CORS_ORIGIN);
        assert_eq!(cors_origin_header(Some("bad\norigin")), DEFAULT_CORS_ORIGIN);
    }
}
