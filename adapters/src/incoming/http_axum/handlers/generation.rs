use axum::{
    Json,
    extract::{Query, State},
};
use axum_login::AuthSession;

#[cfg(feature = "docs")]
use crate::incoming::http_axum::dto::common_responses::{
    BadRequestResponse, GenerationFailedResponse, InsufficientCreditsResponse,
    InternalServerErrorResponse, RateLimitExceededResponse, UnauthorizedResponse,
    ValidationErrorResponse,
};
use crate::incoming::http_axum::{
    auth::backend::AuthBackend,
    core::extractors::{require_user, validate_request},
    dto::{
        requests::{GenerateAdRequest, PageQuery},
        responses::{
            ApiResponse, GenerateResponse, GenerationHistoryResponse, GenerationRecordResponse,
            ModelInfoResponse, PaginationResponse, PromptTemplateResponse,
        },
    },
    error_mapper::HttpError,
};
use crate::shared::app_state::AppState;

#[cfg_attr(feature = "docs", utoipa::path(
    post,
    path = "/generate",
    request_body = GenerateAdRequest,
    responses(
        (status = 200, description = "Ad generated and credits charged", body = ApiResponse<GenerateResponse>),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = InsufficientCreditsResponse),
        (status = 422, response = ValidationErrorResponse),
        (status = 429, response = RateLimitExceededResponse),
        (status = 502, response = GenerationFailedResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    tag = "generation",
    summary = "Generate an ad",
    description = "Reserves the model's credit cost, calls the generation backend under a timeout, then commits the charge on success or refunds it on failure. Missing images are rejected before anything is charged."
))]
pub async fn generate_ad(
    State(state): State<AppState>,
    auth_session: AuthSession<AuthBackend>,
    Json(request): Json<GenerateAdRequest>,
) -> Result<Json<ApiResponse<GenerateResponse>>, HttpError> {
    let user_id = require_user(&auth_session)?;
    validate_request(&request)?;

    let outcome = state
        .generation_use_case
        .generate(&user_id, request.into())
        .await?;

    Ok(Json(ApiResponse::success_with_data(outcome.into())))
}

#[cfg_attr(feature = "docs", utoipa::path(
    get,
    path = "/generate/model",
    responses(
        (status = 200, description = "Active model descriptor", body = ApiResponse<ModelInfoResponse>)
    ),
    tag = "generation",
    summary = "Describe the active generation model"
))]
pub async fn model_info(State(state): State<AppState>) -> Json<ApiResponse<ModelInfoResponse>> {
    Json(ApiResponse::success_with_data(
        state.generation_use_case.model_info().into(),
    ))
}

#[cfg_attr(feature = "docs", utoipa::path(
    get,
    path = "/generations/history",
    params(PageQuery),
    responses(
        (status = 200, description = "Past generations, newest first", body = ApiResponse<GenerationHistoryResponse>),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    tag = "generation",
    summary = "Generation history"
))]
pub async fn generation_history(
    State(state): State<AppState>,
    auth_session: AuthSession<AuthBackend>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<GenerationHistoryResponse>>, HttpError> {
    let user_id = require_user(&auth_session)?;

    let page = state
        .generation_use_case
        .history(&user_id, query.page, query.limit)
        .await?;

    Ok(Json(ApiResponse::success_with_data(
        GenerationHistoryResponse {
            generations: page
                .items
                .into_iter()
                .map(GenerationRecordResponse::from)
                .collect(),
            pagination: PaginationResponse::from(page.info),
        },
    )))
}

#[cfg_attr(feature = "docs", utoipa::path(
    get,
    path = "/prompts",
    responses(
        (status = 200, description = "Prompt templates with placeholders and defaults", body = ApiResponse<Vec<PromptTemplateResponse>>)
    ),
    tag = "generation",
    summary = "List prompt templates"
))]
pub async fn list_prompts(
    State(state): State<AppState>,
) -> Json<ApiResponse<Vec<PromptTemplateResponse>>> {
    let prompts = state
        .generation_use_case
        .prompt_templates()
        .iter()
        .map(PromptTemplateResponse::from)
        .collect();

    Json(ApiResponse::success_with_data(prompts))
}
