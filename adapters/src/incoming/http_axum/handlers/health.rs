use axum::{Json, extract::State, http::StatusCode};
use tracing::warn;

use crate::incoming::http_axum::dto::responses::{ApiResponse, HealthResponse};
use crate::shared::app_state::AppState;

#[cfg_attr(feature = "docs", utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Database reachable", body = ApiResponse<HealthResponse>,
         example = json!({
             "success": true,
             "data": { "status": "ok", "database": "ok", "generation": "available" }
         })
        ),
        (status = 503, description = "Database unreachable", body = ApiResponse<HealthResponse>)
    ),
    tag = "system",
    summary = "System health check",
    description = "Pings the database and reports whether the generation backend accepts work. A disabled backend does not make the service unhealthy.",
    operation_id = "health_check"
))]
pub async fn health_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let database_ok = match state.health_probe.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!("Health check database ping failed: {}", e);
            false
        }
    };

    let generation = if state.generation_use_case.model_info().available {
        "available"
    } else {
        "disabled"
    };

    let body = HealthResponse {
        status: if database_ok { "ok" } else { "degraded" }.to_string(),
        database: if database_ok { "ok" } else { "unreachable" }.to_string(),
        generation: generation.to_string(),
    };

    if database_ok {
        (StatusCode::OK, Json(ApiResponse::success_with_data(body)))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse {
                success: false,
                data: Some(body),
                error: None,
            }),
        )
    }
}
