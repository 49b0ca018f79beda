use axum_login::AuthSession;
use validator::Validate;

use craftads_application::error::AppError;
use domain::auth::UserId;

use crate::incoming::http_axum::auth::backend::AuthBackend;
use crate::incoming::http_axum::error_mapper::HttpError;

/// The signed-in user's id, or 401 when the request carries no session.
pub fn require_user(auth_session: &AuthSession<AuthBackend>) -> Result<UserId, HttpError> {
    auth_session
        .user
        .as_ref()
        .map(|user| user.user_id())
        .ok_or(HttpError(AppError::Unauthorized))
}

pub fn validate_request<T: Validate>(request: &T) -> Result<(), HttpError> {
    request.validate().map_err(|e| {
        HttpError(AppError::ValidationError {
            message: format!("Validation failed: {}", e),
        })
    })
}
