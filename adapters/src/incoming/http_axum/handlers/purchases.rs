use axum::{Json, extract::State};
use axum_login::AuthSession;

#[cfg(feature = "docs")]
use crate::incoming::http_axum::dto::common_responses::{
    InternalServerErrorResponse, NotFoundResponse, RateLimitExceededResponse,
    UnauthorizedResponse, ValidationErrorResponse,
};
use crate::incoming::http_axum::{
    auth::backend::AuthBackend,
    core::extractors::{require_user, validate_request},
    dto::{
        requests::{CompletePurchaseRequest, PurchaseRequest},
        responses::{
            ApiResponse, PackageResponse, PackagesResponse, PurchaseCompleteResponse,
            PurchaseResponse,
        },
    },
    error_mapper::HttpError,
};
use crate::shared::app_state::AppState;

#[cfg_attr(feature = "docs", utoipa::path(
    get,
    path = "/credits/packages",
    responses(
        (status = 200, description = "Active credit packages ordered for display", body = ApiResponse<PackagesResponse>),
        (status = 500, response = InternalServerErrorResponse)
    ),
    tag = "payments",
    summary = "List credit packages",
    description = "Public endpoint; no session required."
))]
pub async fn list_packages(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PackagesResponse>>, HttpError> {
    let packages = state.purchase_use_case.list_packages().await?;

    Ok(Json(ApiResponse::success_with_data(PackagesResponse {
        packages: packages.into_iter().map(PackageResponse::from).collect(),
    })))
}

#[cfg_attr(feature = "docs", utoipa::path(
    post,
    path = "/credits/purchase",
    request_body = PurchaseRequest,
    responses(
        (status = 200, description = "Pending payment created", body = ApiResponse<PurchaseResponse>),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 429, response = RateLimitExceededResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    tag = "payments",
    summary = "Start a credit purchase",
    description = "Creates a pending payment for the package and returns the URL of the payment page."
))]
pub async fn initiate_purchase(
    State(state): State<AppState>,
    auth_session: AuthSession<AuthBackend>,
    Json(request): Json<PurchaseRequest>,
) -> Result<Json<ApiResponse<PurchaseResponse>>, HttpError> {
    let user_id = require_user(&auth_session)?;

    let session = state
        .purchase_use_case
        .initiate_purchase(&user_id, request.package_id)
        .await?;

    Ok(Json(ApiResponse::success_with_data(session.into())))
}

#[cfg_attr(feature = "docs", utoipa::path(
    post,
    path = "/credits/purchase/complete",
    request_body = CompletePurchaseRequest,
    responses(
        (status = 200, description = "Payment settled", body = ApiResponse<PurchaseCompleteResponse>),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 422, response = ValidationErrorResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    tag = "payments",
    summary = "Complete a pending payment",
    description = "A completed payment credits the purchased amount in the same database transaction that settles the payment. A payment can be settled once."
))]
pub async fn complete_purchase(
    State(state): State<AppState>,
    auth_session: AuthSession<AuthBackend>,
    Json(request): Json<CompletePurchaseRequest>,
) -> Result<Json<ApiResponse<PurchaseCompleteResponse>>, HttpError> {
    let user_id = require_user(&auth_session)?;
    validate_request(&request)?;
    let outcome = request.outcome();

    let completion = state
        .purchase_use_case
        .complete_purchase(
            &user_id,
            request.payment_session_id,
            request.provider_payment_id,
            outcome,
        )
        .await?;

    Ok(Json(ApiResponse::success_with_data(completion.into())))
}
