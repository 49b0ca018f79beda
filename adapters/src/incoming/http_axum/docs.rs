use crate::incoming::http_axum::{auth, dto, handlers};
use auth::oauth_google::AuthRequest;
use dto::common_responses::{
    BadRequestResponse, GenerationFailedResponse, InsufficientCreditsResponse,
    InternalServerErrorResponse, NotFoundResponse, RateLimitExceededResponse,
    UnauthorizedResponse, ValidationErrorResponse,
};
use dto::requests::{
    CompletePurchaseRequest, DeductCreditsRequest, FavoriteActionRequest, FavoriteRequest,
    FeedbackRequest, GenerateAdRequest, PaymentResultStatus, PurchaseRequest,
    ValidateCreditsRequest,
};
use dto::responses::{
    ApiErrorBody, BalanceResponse, CategoryResponse, CategorySummaryResponse,
    CreditCheckResponse, DeductResponse, DimensionsResponse, FavoriteResponse, GenerateResponse,
    GenerationHistoryResponse, GenerationMetadataResponse, GenerationRecordResponse, HealthResponse,
    ListMeta, ModelInfoResponse, PackageResponse, PackagesResponse, PaginationResponse,
    PromptTemplateResponse, PurchaseCompleteResponse, PurchaseResponse, TemplateResponse,
    TransactionHistoryResponse, TransactionResponse, UserResponse,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::credits::get_balance,
        handlers::credits::deduct_credits,
        handlers::credits::get_history,
        handlers::credits::validate_credits,
        handlers::purchases::list_packages,
        handlers::purchases::initiate_purchase,
        handlers::purchases::complete_purchase,
        handlers::generation::generate_ad,
        handlers::generation::model_info,
        handlers::generation::generation_history,
        handlers::generation::list_prompts,
        handlers::gallery::list_templates,
        handlers::gallery::get_template,
        handlers::gallery::list_categories,
        handlers::gallery::list_favorites,
        handlers::gallery::update_favorite,
        handlers::gallery::submit_feedback,
        handlers::auth::logout_handler,
        handlers::auth::me_handler,
        handlers::health::health_check,
        auth::oauth_google::google_auth_start,
        auth::oauth_google::google_auth_callback,
    ),
    components(
        schemas(
            ApiErrorBody,
            ListMeta,
            PaginationResponse,
            DeductCreditsRequest,
            ValidateCreditsRequest,
            PurchaseRequest,
            PaymentResultStatus,
            CompletePurchaseRequest,
            GenerateAdRequest,
            FavoriteActionRequest,
            FavoriteRequest,
            FeedbackRequest,
            AuthRequest,
            BalanceResponse,
            DeductResponse,
            TransactionResponse,
            TransactionHistoryResponse,
            CreditCheckResponse,
            PackageResponse,
            PackagesResponse,
            PurchaseResponse,
            PurchaseCompleteResponse,
            DimensionsResponse,
            GenerationMetadataResponse,
            GenerateResponse,
            ModelInfoResponse,
            GenerationRecordResponse,
            GenerationHistoryResponse,
            CategorySummaryResponse,
            TemplateResponse,
            CategoryResponse,
            FavoriteResponse,
            PromptTemplateResponse,
            UserResponse,
            HealthResponse
        ),
        responses(
            BadRequestResponse,
            RateLimitExceededResponse,
            InternalServerErrorResponse,
            UnauthorizedResponse,
            InsufficientCreditsResponse,
            NotFoundResponse,
            ValidationErrorResponse,
            GenerationFailedResponse
        )
    ),
    tags(
        (name = "credits", description = "Credit balance, deductions, transaction history and affordability checks"),
        (name = "payments", description = "Credit packages and the purchase flow, from initiation to completion"),
        (name = "generation", description = "Ad generation with reserve, commit and refund of credits, plus model info and prompt templates"),
        (name = "gallery", description = "Template gallery browsing, categories, favorites and feedback"),
        (name = "auth", description = "Google sign-in, session logout and the current user profile"),
        (name = "system", description = "System health and status monitoring")
    ),
    info(
        title = "CraftAds Backend API",
        description = "Credit-metered ad image generation. Every response uses the envelope {success, data, error: {code, message}}. Rate limited routes return RateLimit-Limit, RateLimit-Remaining, RateLimit-Reset and Retry-After headers.",
        contact(
            name = "CraftAds",
        ),
    ),
    servers(
        (url = "http://localhost:3001", description = "Development server"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/credits/balance",
            "/credits/purchase/complete",
            "/generate",
            "/gallery/templates/{template}/feedback",
            "/auth/google/callback",
            "/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
