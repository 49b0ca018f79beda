use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_login::AuthSession;

#[cfg(feature = "docs")]
use crate::incoming::http_axum::dto::common_responses::{
    InsufficientCreditsResponse, InternalServerErrorResponse, NotFoundResponse,
    RateLimitExceededResponse, UnauthorizedResponse, ValidationErrorResponse,
};
use crate::incoming::http_axum::{
    auth::backend::AuthBackend,
    core::extractors::{require_user, validate_request},
    dto::{
        requests::{DeductCreditsRequest, PageQuery, ValidateCreditsRequest},
        responses::{
            ApiResponse, BalanceResponse, CreditCheckResponse, DeductResponse, PaginationResponse,
            TransactionHistoryResponse, TransactionResponse,
        },
    },
    error_mapper::HttpError,
};
use crate::shared::app_state::AppState;

#[cfg_attr(feature = "docs", utoipa::path(
    get,
    path = "/credits/balance",
    responses(
        (status = 200, description = "Current credit balance", body = ApiResponse<BalanceResponse>),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 429, response = RateLimitExceededResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    tag = "credits",
    summary = "Get credit balance",
    description = "Returns the signed-in user's balance as stored on the account row."
))]
pub async fn get_balance(
    State(state): State<AppState>,
    auth_session: AuthSession<AuthBackend>,
) -> Result<Json<ApiResponse<BalanceResponse>>, HttpError> {
    let user_id = require_user(&auth_session)?;

    let account = state.credit_use_case.get_balance(&user_id).await?;

    Ok(Json(ApiResponse::success_with_data(account.into())))
}

#[cfg_attr(feature = "docs", utoipa::path(
    post,
    path = "/credits/deduct",
    request_body = DeductCreditsRequest,
    responses(
        (status = 200, description = "Credits deducted", body = ApiResponse<DeductResponse>),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = InsufficientCreditsResponse),
        (status = 422, response = ValidationErrorResponse),
        (status = 429, response = RateLimitExceededResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    tag = "credits",
    summary = "Deduct credits",
    description = "Atomically debits the balance and appends a usage transaction. Fails without side effects when the balance is too low."
))]
pub async fn deduct_credits(
    State(state): State<AppState>,
    auth_session: AuthSession<AuthBackend>,
    Json(request): Json<DeductCreditsRequest>,
) -> Result<Json<ApiResponse<DeductResponse>>, HttpError> {
    let user_id = require_user(&auth_session)?;
    validate_request(&request)?;

    let entry = state
        .credit_use_case
        .deduct(&user_id, request.into())
        .await?;

    Ok(Json(ApiResponse::success_with_data(entry.into())))
}

#[cfg_attr(feature = "docs", utoipa::path(
    get,
    path = "/credits/history",
    params(PageQuery),
    responses(
        (status = 200, description = "Transactions, newest first", body = ApiResponse<TransactionHistoryResponse>),
        (status = 401, response = UnauthorizedResponse),
        (status = 429, response = RateLimitExceededResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    tag = "credits",
    summary = "Credit transaction history"
))]
pub async fn get_history(
    State(state): State<AppState>,
    auth_session: AuthSession<AuthBackend>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<TransactionHistoryResponse>>, HttpError> {
    let user_id = require_user(&auth_session)?;

    let page = state
        .credit_use_case
        .history(&user_id, query.page, query.limit)
        .await?;

    Ok(Json(ApiResponse::success_with_data(
        TransactionHistoryResponse {
            transactions: page
                .items
                .into_iter()
                .map(TransactionResponse::from)
                .collect(),
            pagination: PaginationResponse::from(page.info),
        },
    )))
}

#[cfg_attr(feature = "docs", utoipa::path(
    post,
    path = "/credits/validate",
    request_body = ValidateCreditsRequest,
    responses(
        (status = 200, description = "Balance covers the operation", body = ApiResponse<CreditCheckResponse>),
        (status = 403, description = "Balance is too low; the same payload is returned", body = ApiResponse<CreditCheckResponse>),
        (status = 401, response = UnauthorizedResponse),
        (status = 422, response = ValidationErrorResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    tag = "credits",
    summary = "Check whether the balance covers an operation",
    description = "Read-only check; never mutates the balance."
))]
pub async fn validate_credits(
    State(state): State<AppState>,
    auth_session: AuthSession<AuthBackend>,
    Json(request): Json<ValidateCreditsRequest>,
) -> Result<Response, HttpError> {
    let user_id = require_user(&auth_session)?;
    validate_request(&request)?;

    let check = state
        .credit_use_case
        .validate(&user_id, request.required_credits, request.operation)
        .await?;

    if check.is_sufficient() {
        return Ok(Json(ApiResponse::success_with_data(CreditCheckResponse::from(check))).into_response());
    }

    Ok((
        StatusCode::FORBIDDEN,
        Json(ApiResponse::failure_with_data(
            "INSUFFICIENT_CREDITS",
            "Insufficient credits",
            CreditCheckResponse::from(check),
        )),
    )
        .into_response())
}
