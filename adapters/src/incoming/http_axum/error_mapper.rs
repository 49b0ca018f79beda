use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use craftads_application::error::AppError;

use super::dto::responses::ApiResponse;

pub struct HttpError(pub AppError);

/// Status, stable error code and client-facing message for an application error.
///
/// Server-side failures get a generic message and the detail only reaches the
/// logs. A generation backend's own failure message is shown as is.
pub(crate) fn classify(app_error: &AppError) -> (StatusCode, &'static str, String) {
    match app_error {
        AppError::Domain(_) => (
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            app_error.to_string(),
        ),

        AppError::ValidationError { message } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "VALIDATION_ERROR",
            message.clone(),
        ),

        AppError::MissingInput { message } => {
            (StatusCode::BAD_REQUEST, "MISSING_INPUT", message.clone())
        }

        AppError::InsufficientCredits {
            required,
            available,
        } => (
            StatusCode::FORBIDDEN,
            "INSUFFICIENT_CREDITS",
            format!(
                "Insufficient credits: {} required, {} available",
                required, available
            ),
        ),

        AppError::NotFound { message } => {
            (StatusCode::NOT_FOUND, "RESOURCE_NOT_FOUND", message.clone())
        }

        AppError::Unauthorized => (
            StatusCode::UNAUTHORIZED,
            "UNAUTHORIZED",
            "Authentication required".to_string(),
        ),

        AppError::Forbidden => (
            StatusCode::FORBIDDEN,
            "FORBIDDEN",
            "Forbidden".to_string(),
        ),

        AppError::LedgerWriteFailed { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "LEDGER_WRITE_FAILED",
            "Failed to record credit transaction".to_string(),
        ),

        AppError::UpstreamGenerationFailure { message } => (
            StatusCode::BAD_GATEWAY,
            "GENERATION_FAILED",
            message.clone(),
        ),

        AppError::GenerationTimeout => (
            StatusCode::GATEWAY_TIMEOUT,
            "GENERATION_TIMEOUT",
            "Image generation timed out".to_string(),
        ),

        AppError::ServiceUnavailable | AppError::StorageUnavailable { .. } => (
            StatusCode::SERVICE_UNAVAILABLE,
            "SERVICE_UNAVAILABLE",
            "Service unavailable".to_string(),
        ),

        AppError::ConfigError { .. }
        | AppError::DatabaseError { .. }
        | AppError::CacheError { .. }
        | AppError::ExternalServiceError { .. }
        | AppError::InternalServerError => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "SERVER_ERROR",
            "Internal server error".to_string(),
        ),
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let app_error = &self.0;
        let (status_code, code, message) = classify(app_error);

        if status_code.is_server_error() {
            error!("Server error response generated: {}", app_error);
        } else {
            debug!("Client error response generated: {}", app_error);
        }

        (
            status_code,
            Json(ApiResponse::<()>::failure(code, message)),
        )
            .into_response()
    }
}

impl From<AppError> for HttpError {
    fn from(app_error: AppError) -> Self {
        HttpError(app_error)
    }
}
