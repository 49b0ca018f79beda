use std::collections::HashMap;

use serde::{Deserialize, Serialize};
#[cfg(feature = "docs")]
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use craftads_application::ports::incoming::{
    credits::DeductCredits,
    gallery::{FavoriteAction, TemplateQuery},
    generation::GenerateRequest,
};
use domain::payment::PaymentOutcome;

fn default_required_credits() -> i64 {
    1
}

fn default_operation() -> String {
    "unknown".to_string()
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[cfg_attr(feature = "docs", schema(
    description = "Deduct credits from the signed-in user's balance",
    example = json!({
        "credits": 1,
        "description": "Ad generation",
        "referenceId": "550e8400-e29b-41d4-a716-446655440000",
        "referenceType": "generation"
    })
))]
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeductCreditsRequest {
    #[validate(range(min = 1, message = "credits must be a positive integer"))]
    pub credits: i64,
    #[validate(length(max = 500, message = "description must be at most 500 characters"))]
    pub description: Option<String>,
    #[validate(length(max = 255))]
    pub reference_id: Option<String>,
    #[validate(length(max = 64))]
    pub reference_type: Option<String>,
}

impl From<DeductCreditsRequest> for DeductCredits {
    fn from(request: DeductCreditsRequest) -> Self {
        Self {
            amount: request.credits,
            description: request.description,
            reference_id: request.reference_id,
            reference_type: request.reference_type,
        }
    }
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[cfg_attr(feature = "docs", schema(example = json!({
    "requiredCredits": 1,
    "operation": "generate"
})))]
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCreditsRequest {
    #[serde(default = "default_required_credits")]
    #[validate(range(min = 1, message = "requiredCredits must be a positive integer"))]
    pub required_credits: i64,
    #[serde(default = "default_operation")]
    #[validate(length(max = 64))]
    pub operation: String,
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub package_id: Uuid,
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentResultStatus {
    Completed,
    Failed,
}

impl From<PaymentResultStatus> for PaymentOutcome {
    fn from(status: PaymentResultStatus) -> Self {
        match status {
            PaymentResultStatus::Completed => Self::Completed,
            PaymentResultStatus::Failed => Self::Failed,
        }
    }
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[cfg_attr(feature = "docs", schema(example = json!({
    "paymentSessionId": "550e8400-e29b-41d4-a716-446655440000",
    "providerPaymentId": "mock_1735732800000",
    "status": "completed"
})))]
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompletePurchaseRequest {
    pub payment_session_id: Uuid,
    #[validate(length(min = 1, max = 255))]
    pub provider_payment_id: Option<String>,
    pub status: Option<PaymentResultStatus>,
}

impl CompletePurchaseRequest {
    #[must_use]
    pub fn outcome(&self) -> PaymentOutcome {
        self.status
            .unwrap_or(PaymentResultStatus::Completed)
            .into()
    }
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[cfg_attr(feature = "docs", schema(
    description = "Generate an ad from a reference ad and a product image. Images are URLs or data URIs.",
    example = json!({
        "referenceImage": "https://cdn.example.com/reference.jpg",
        "productImage": "https://cdn.example.com/product.png",
        "promptTemplate": "brand-adaptation",
        "promptValues": { "tagline": "Taste the sunrise" },
        "width": 1024,
        "height": 1024
    })
))]
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateAdRequest {
    #[serde(default)]
    pub reference_image: String,
    #[serde(default)]
    pub product_image: String,
    #[serde(default)]
    #[validate(length(max = 4000, message = "promptTemplate is too long"))]
    pub prompt_template: String,
    #[serde(default)]
    pub prompt_values: HashMap<String, String>,
    #[validate(range(min = 64, max = 4096, message = "width must be between 64 and 4096"))]
    pub width: Option<u32>,
    #[validate(range(min = 64, max = 4096, message = "height must be between 64 and 4096"))]
    pub height: Option<u32>,
    pub template_id: Option<Uuid>,
}

impl From<GenerateAdRequest> for GenerateRequest {
    fn from(request: GenerateAdRequest) -> Self {
        Self {
            reference_image: request.reference_image,
            product_image: request.product_image,
            prompt_template: request.prompt_template,
            prompt_values: request.prompt_values,
            width: request.width,
            height: request.height,
            template_id: request.template_id,
        }
    }
}

#[cfg_attr(feature = "docs", derive(IntoParams))]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[cfg_attr(feature = "docs", derive(IntoParams))]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplatesQuery {
    /// Free-text search over title and description.
    pub q: Option<String>,
    /// Comma-separated category slugs.
    pub category: Option<String>,
    pub premium: Option<bool>,
    pub featured: Option<bool>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    #[serde(default)]
    pub random: bool,
    pub seed: Option<String>,
}

impl From<TemplatesQuery> for TemplateQuery {
    fn from(query: TemplatesQuery) -> Self {
        Self {
            query: query.q,
            category: query.category,
            is_premium: query.premium,
            is_featured: query.featured,
            limit: query.limit,
            offset: query.offset,
            random: query.random,
            seed: query.seed,
        }
    }
}

#[cfg_attr(feature = "docs", derive(IntoParams))]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoriesQuery {
    pub slug: Option<String>,
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FavoriteActionRequest {
    Add,
    Remove,
    Check,
}

impl From<FavoriteActionRequest> for FavoriteAction {
    fn from(action: FavoriteActionRequest) -> Self {
        match action {
            FavoriteActionRequest::Add => Self::Add,
            FavoriteActionRequest::Remove => Self::Remove,
            FavoriteActionRequest::Check => Self::Check,
        }
    }
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[cfg_attr(feature = "docs", schema(example = json!({
    "templateId": "550e8400-e29b-41d4-a716-446655440000",
    "action": "add"
})))]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRequest {
    pub template_id: Uuid,
    pub action: FavoriteActionRequest,
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[cfg_attr(feature = "docs", schema(example = json!({
    "rating": 5,
    "comments": "Great layout for seasonal promos"
})))]
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FeedbackRequest {
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: i16,
    #[validate(length(max = 2000, message = "comments must be at most 2000 characters"))]
    pub comments: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn validate_request_falls_back_to_defaults() {
        let request: ValidateCreditsRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(request.required_credits, 1);
        assert_eq!(request.operation, "unknown");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn non_positive_deduct_is_rejected() {
        let request: DeductCreditsRequest =
            serde_json::from_value(json!({ "credits": 0 })).unwrap();
        assert!(request.validate().is_err());

        let request: DeductCreditsRequest = serde_json::from_value(json!({
            "credits": 2,
            "referenceType": "generation"
        }))
        .unwrap();
        assert!(request.validate().is_ok());
        assert_eq!(DeductCredits::from(request).amount, 2);
    }

    #[test]
    fn completion_defaults_to_completed() {
        let request: CompletePurchaseRequest = serde_json::from_value(json!({
            "paymentSessionId": "550e8400-e29b-41d4-a716-446655440000"
        }))
        .unwrap();
        assert_eq!(request.outcome(), PaymentOutcome::Completed);

        let request: CompletePurchaseRequest = serde_json::from_value(json!({
            "paymentSessionId": "550e8400-e29b-41d4-a716-446655440000",
            "status": "failed"
        }))
        .unwrap();
        assert_eq!(request.outcome(), PaymentOutcome::Failed);
    }

    #[test]
    fn feedback_rating_must_be_in_range() {
        let too_high = FeedbackRequest {
            rating: 6,
            comments: None,
        };
        assert!(too_high.validate().is_err());

        let fine = FeedbackRequest {
            rating: 4,
            comments: Some("Nice".to_string()),
        };
        assert!(fine.validate().is_ok());
    }

    #[test]
    fn generate_request_accepts_missing_images_for_service_check() {
        let request: GenerateAdRequest =
            serde_json::from_value(json!({ "promptTemplate": "style-transfer" })).unwrap();
        assert!(request.validate().is_ok());

        let generate = GenerateRequest::from(request);
        assert!(generate.reference_image.is_empty());
        assert!(generate.prompt_values.is_empty());
    }

    #[test]
    fn unknown_favorite_action_fails_to_parse() {
        let parsed: Result<FavoriteRequest, _> = serde_json::from_value(json!({
            "templateId": "550e8400-e29b-41d4-a716-446655440000",
            "action": "toggle"
        }));
        assert!(parsed.is_err());
    }
}
