use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use axum_login::AuthSession;
use uuid::Uuid;

#[cfg(feature = "docs")]
use crate::incoming::http_axum::dto::common_responses::{
    InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse, ValidationErrorResponse,
};
use crate::incoming::http_axum::{
    auth::backend::AuthBackend,
    core::extractors::{require_user, validate_request},
    dto::{
        requests::{CategoriesQuery, FavoriteRequest, FeedbackRequest, TemplatesQuery},
        responses::{
            ApiResponse, CategoryResponse, FavoriteResponse, ListMeta, ListResponse,
            TemplateResponse,
        },
    },
    error_mapper::HttpError,
};
use crate::shared::app_state::AppState;

#[cfg_attr(feature = "docs", utoipa::path(
    get,
    path = "/gallery/templates",
    params(TemplatesQuery),
    responses(
        (status = 200, description = "Matching templates with the applied window and seed", body = ListResponse<TemplateResponse>),
        (status = 500, response = InternalServerErrorResponse)
    ),
    tag = "gallery",
    summary = "Browse ad templates",
    description = "Featured and most used templates come first. With random=true the page is shuffled deterministically by seed; the seed used is echoed in meta so the client can repeat the order."
))]
pub async fn list_templates(
    State(state): State<AppState>,
    Query(query): Query<TemplatesQuery>,
) -> Result<Json<ListResponse<TemplateResponse>>, HttpError> {
    let listing = state.gallery_use_case.list_templates(query.into()).await?;

    let data: Vec<TemplateResponse> = listing
        .templates
        .into_iter()
        .map(TemplateResponse::from)
        .collect();

    Ok(Json(ListResponse {
        success: true,
        meta: ListMeta {
            count: data.len(),
            limit: listing.limit,
            offset: listing.offset,
            seed: listing.seed,
        },
        data,
    }))
}

#[cfg_attr(feature = "docs", utoipa::path(
    get,
    path = "/gallery/templates/{template}",
    params(("template" = String, Path, description = "Template slug")),
    responses(
        (status = 200, description = "Template with its categories", body = ApiResponse<TemplateResponse>),
        (status = 404, response = NotFoundResponse)
    ),
    tag = "gallery",
    summary = "Get a template by slug"
))]
pub async fn get_template(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<TemplateResponse>>, HttpError> {
    let template = state.gallery_use_case.template_by_slug(&slug).await?;

    Ok(Json(ApiResponse::success_with_data(template.into())))
}

#[cfg_attr(feature = "docs", utoipa::path(
    get,
    path = "/gallery/categories",
    params(CategoriesQuery),
    responses(
        (status = 200, description = "All active categories, or the one matching slug", body = ApiResponse<Vec<CategoryResponse>>),
        (status = 404, response = NotFoundResponse)
    ),
    tag = "gallery",
    summary = "List template categories"
))]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<CategoriesQuery>,
) -> Result<Response, HttpError> {
    if let Some(slug) = query.slug.filter(|slug| !slug.trim().is_empty()) {
        let category = state.gallery_use_case.category_by_slug(&slug).await?;
        return Ok(
            Json(ApiResponse::success_with_data(CategoryResponse::from(category))).into_response(),
        );
    }

    let categories: Vec<CategoryResponse> = state
        .gallery_use_case
        .list_categories()
        .await?
        .into_iter()
        .map(CategoryResponse::from)
        .collect();

    Ok(Json(ApiResponse::success_with_data(categories)).into_response())
}

#[cfg_attr(feature = "docs", utoipa::path(
    get,
    path = "/gallery/favorites",
    responses(
        (status = 200, description = "The user's favorite templates", body = ApiResponse<Vec<TemplateResponse>>),
        (status = 401, response = UnauthorizedResponse)
    ),
    tag = "gallery",
    summary = "List favorite templates"
))]
pub async fn list_favorites(
    State(state): State<AppState>,
    auth_session: AuthSession<AuthBackend>,
) -> Result<Json<ApiResponse<Vec<TemplateResponse>>>, HttpError> {
    let user_id = require_user(&auth_session)?;

    let favorites = state
        .gallery_use_case
        .favorites(&user_id)
        .await?
        .into_iter()
        .map(TemplateResponse::from)
        .collect();

    Ok(Json(ApiResponse::success_with_data(favorites)))
}

#[cfg_attr(feature = "docs", utoipa::path(
    post,
    path = "/gallery/favorites",
    request_body = FavoriteRequest,
    responses(
        (status = 200, description = "Favorite state after the action", body = ApiResponse<FavoriteResponse>),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse)
    ),
    tag = "gallery",
    summary = "Add, remove or check a favorite",
    description = "Add and remove are idempotent."
))]
pub async fn update_favorite(
    State(state): State<AppState>,
    auth_session: AuthSession<AuthBackend>,
    Json(request): Json<FavoriteRequest>,
) -> Result<Json<ApiResponse<FavoriteResponse>>, HttpError> {
    let user_id = require_user(&auth_session)?;

    let is_favorite = state
        .gallery_use_case
        .update_favorite(&user_id, request.template_id, request.action.into())
        .await?;

    Ok(Json(ApiResponse::success_with_data(FavoriteResponse {
        template_id: request.template_id,
        is_favorite,
    })))
}

#[cfg_attr(feature = "docs", utoipa::path(
    post,
    path = "/gallery/templates/{template}/feedback",
    params(("template" = Uuid, Path, description = "Template id")),
    request_body = FeedbackRequest,
    responses(
        (status = 200, description = "Feedback stored; a second submission replaces the first"),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 422, response = ValidationErrorResponse)
    ),
    tag = "gallery",
    summary = "Rate a template"
))]
pub async fn submit_feedback(
    State(state): State<AppState>,
    auth_session: AuthSession<AuthBackend>,
    Path(template_id): Path<Uuid>,
    Json(request): Json<FeedbackRequest>,
) -> Result<Json<ApiResponse<()>>, HttpError> {
    let user_id = require_user(&auth_session)?;
    validate_request(&request)?;

    state
        .gallery_use_case
        .submit_feedback(&user_id, template_id, request.rating, request.comments)
        .await?;

    Ok(Json(ApiResponse::success()))
}
