#[cfg(feature = "docs")]
use crate::incoming::http_axum::dto::common_responses::{
    InternalServerErrorResponse, RateLimitExceededResponse, UnauthorizedResponse,
};
use axum::{Json, extract::State};
use axum_login::AuthSession;
use craftads_application::error::AppError;

use crate::{
    incoming::http_axum::{
        auth::backend::AuthBackend,
        core::extractors::require_user,
        dto::responses::{ApiResponse, UserResponse},
        error_mapper::HttpError,
    },
    shared::app_state::AppState,
};

#[cfg_attr(feature = "docs", utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Session cleared"),
        (status = 429, response = RateLimitExceededResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    tag = "auth",
    summary = "Logout current user",
    description = "Clears the session. Succeeds even when no one is signed in."
))]
pub async fn logout_handler(
    State(state): State<AppState>,
    mut auth_session: AuthSession<AuthBackend>,
) -> Result<Json<ApiResponse<()>>, HttpError> {
    state.auth_use_case.logout().await?;

    auth_session
        .logout()
        .await
        .map_err(|_| HttpError(AppError::InternalServerError))?;

    Ok(Json(ApiResponse::success()))
}

#[cfg_attr(feature = "docs", utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current user with a fresh balance", body = ApiResponse<UserResponse>),
        (status = 401, response = UnauthorizedResponse),
        (status = 429, response = RateLimitExceededResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    tag = "auth",
    summary = "Get current user information"
))]
pub async fn me_handler(
    State(state): State<AppState>,
    auth_session: AuthSession<AuthBackend>,
) -> Result<Json<ApiResponse<UserResponse>>, HttpError> {
    let user_id = require_user(&auth_session)?;

    let user_public = state.auth_use_case.me(&user_id).await?;

    Ok(Json(ApiResponse::success_with_data(user_public.into())))
}
