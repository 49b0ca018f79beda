use std::collections::HashMap;

use serde::Serialize;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
#[cfg(feature = "docs")]
use utoipa::ToSchema;
use uuid::Uuid;

use craftads_application::ports::incoming::{
    generation::{GenerationOutcome, ModelInfo},
    purchases::PurchaseCompletion,
};
use domain::auth::UserPublic;
use domain::credits::{CreditAccount, CreditCheck, CreditPackage, CreditTransaction, LedgerEntry};
use domain::gallery::{Category, CategorySummary, Template};
use domain::generation::{GenerationMetadata, GenerationRecord};
use domain::pagination::PageInfo;
use domain::payment::PurchaseSession;
use domain::prompt::PromptTemplate;

pub(crate) fn format_timestamp(dt: OffsetDateTime) -> String {
    dt.format(&Rfc3339).unwrap_or_else(|_| dt.to_string())
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorBody {
    #[cfg_attr(feature = "docs", schema(example = "INSUFFICIENT_CREDITS"))]
    pub code: String,
    pub message: String,
}

/// Envelope shared by every JSON endpoint.
#[cfg_attr(feature = "docs", derive(ToSchema))]
#[cfg_attr(feature = "docs", schema(
    description = "Standard API response wrapper with success flag, optional data payload and optional error",
    example = json!({
        "success": true,
        "data": {
            "credits": 10,
            "userId": "550e8400-e29b-41d4-a716-446655440000",
            "lastUpdated": "2025-01-01T12:00:00Z"
        }
    })
))]
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiErrorBody>,
}

impl<T: Serialize> ApiResponse<T> {
    #[must_use]
    pub fn success() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }

    #[must_use]
    pub fn success_with_data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    #[must_use]
    pub fn failure(code: &str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiErrorBody {
                code: code.to_string(),
                message: message.into(),
            }),
        }
    }

    /// A failed response that still carries a payload, e.g. a credit shortfall.
    #[must_use]
    pub fn failure_with_data(code: &str, message: impl Into<String>, data: T) -> Self {
        Self {
            data: Some(data),
            ..Self::failure(code, message)
        }
    }
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[derive(Debug, Clone, Serialize)]
pub struct ListMeta {
    pub count: usize,
    pub limit: u32,
    pub offset: u32,
    pub seed: String,
}

/// Envelope for listings that report their window next to the data.
#[cfg_attr(feature = "docs", derive(ToSchema))]
#[derive(Debug, Clone, Serialize)]
pub struct ListResponse<T: Serialize> {
    pub success: bool,
    pub data: Vec<T>,
    pub meta: ListMeta,
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResponse {
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub pages: i64,
}

impl From<PageInfo> for PaginationResponse {
    fn from(info: PageInfo) -> Self {
        Self {
            total: info.total,
            page: info.page,
            limit: info.limit,
            pages: info.pages,
        }
    }
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[cfg_attr(feature = "docs", schema(example = json!({
    "credits": 10,
    "userId": "550e8400-e29b-41d4-a716-446655440000",
    "lastUpdated": "2025-01-01T12:00:00Z"
})))]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub credits: i64,
    pub user_id: Uuid,
    pub last_updated: String,
}

impl From<CreditAccount> for BalanceResponse {
    fn from(account: CreditAccount) -> Self {
        Self {
            credits: account.balance,
            user_id: *account.user_id.as_uuid(),
            last_updated: format_timestamp(account.updated_at),
        }
    }
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeductResponse {
    pub credits_deducted: i64,
    pub new_balance: i64,
    pub transaction_id: Uuid,
}

impl From<LedgerEntry> for DeductResponse {
    fn from(entry: LedgerEntry) -> Self {
        Self {
            credits_deducted: -entry.transaction.amount,
            new_balance: entry.new_balance,
            transaction_id: entry.transaction.id,
        }
    }
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub id: Uuid,
    pub amount: i64,
    #[serde(rename = "type")]
    pub transaction_type: String,
    pub status: String,
    pub description: String,
    pub reference_id: Option<String>,
    pub reference_type: Option<String>,
    pub balance_after: i64,
    pub created_at: String,
}

impl From<CreditTransaction> for TransactionResponse {
    fn from(transaction: CreditTransaction) -> Self {
        Self {
            id: transaction.id,
            amount: transaction.amount,
            transaction_type: transaction.transaction_type.as_str().to_string(),
            status: transaction.status.as_str().to_string(),
            description: transaction.description,
            reference_id: transaction.reference_id,
            reference_type: transaction.reference_type,
            balance_after: transaction.balance_after,
            created_at: format_timestamp(transaction.created_at),
        }
    }
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[derive(Debug, Clone, Serialize)]
pub struct TransactionHistoryResponse {
    pub transactions: Vec<TransactionResponse>,
    pub pagination: PaginationResponse,
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditCheckResponse {
    pub required_credits: i64,
    pub available_credits: i64,
    pub operation: String,
}

impl From<CreditCheck> for CreditCheckResponse {
    fn from(check: CreditCheck) -> Self {
        Self {
            required_credits: check.required,
            available_credits: check.available,
            operation: check.operation,
        }
    }
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub credit_amount: i64,
    pub price_cents: i64,
    pub currency: String,
    pub is_featured: bool,
    pub sort_order: i32,
}

impl From<CreditPackage> for PackageResponse {
    fn from(package: CreditPackage) -> Self {
        Self {
            id: package.id,
            name: package.name,
            description: package.description,
            credit_amount: package.credit_amount,
            price_cents: package.price_cents,
            currency: package.currency,
            is_featured: package.is_featured,
            sort_order: package.sort_order,
        }
    }
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[derive(Debug, Clone, Serialize)]
pub struct PackagesResponse {
    pub packages: Vec<PackageResponse>,
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    pub transaction_id: Uuid,
    pub status: String,
    pub redirect_url: String,
    pub payment_session_id: Uuid,
}

impl From<PurchaseSession> for PurchaseResponse {
    fn from(session: PurchaseSession) -> Self {
        Self {
            transaction_id: session.payment_id,
            status: session.status.as_str().to_string(),
            redirect_url: session.redirect_url,
            payment_session_id: session.payment_id,
        }
    }
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseCompleteResponse {
    pub transaction_id: Option<Uuid>,
    pub payment_id: Uuid,
    pub status: String,
    pub credits_purchased: i64,
    pub new_balance: Option<i64>,
}

impl From<PurchaseCompletion> for PurchaseCompleteResponse {
    fn from(completion: PurchaseCompletion) -> Self {
        Self {
            transaction_id: completion.transaction_id,
            payment_id: completion.payment.id,
            status: completion.payment.status.as_str().to_string(),
            credits_purchased: completion.payment.credits_purchased,
            new_balance: completion.new_balance,
        }
    }
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[derive(Debug, Clone, Serialize)]
pub struct DimensionsResponse {
    pub width: u32,
    pub height: u32,
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetadataResponse {
    pub model: String,
    pub prompt_tokens: u32,
    pub processing_time_ms: u64,
    pub dimensions: DimensionsResponse,
}

impl From<GenerationMetadata> for GenerationMetadataResponse {
    fn from(metadata: GenerationMetadata) -> Self {
        Self {
            model: metadata.model,
            prompt_tokens: metadata.prompt_tokens,
            processing_time_ms: metadata.processing_time_ms,
            dimensions: DimensionsResponse {
                width: metadata.dimensions.width,
                height: metadata.dimensions.height,
            },
        }
    }
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub image_url: String,
    pub generation_id: Uuid,
    pub metadata: Option<GenerationMetadataResponse>,
    pub credits_used: i64,
    pub new_balance: i64,
}

impl From<GenerationOutcome> for GenerateResponse {
    fn from(outcome: GenerationOutcome) -> Self {
        Self {
            image_url: outcome.image_url,
            generation_id: outcome.generation_id,
            metadata: outcome.metadata.map(Into::into),
            credits_used: outcome.credits_used,
            new_balance: outcome.new_balance,
        }
    }
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfoResponse {
    pub name: String,
    pub version: String,
    pub capabilities: Vec<String>,
    pub credit_cost: i64,
    pub available: bool,
}

impl From<ModelInfo> for ModelInfoResponse {
    fn from(info: ModelInfo) -> Self {
        Self {
            name: info.descriptor.name,
            version: info.descriptor.version,
            capabilities: info.descriptor.capabilities,
            credit_cost: info.descriptor.credit_cost,
            available: info.available,
        }
    }
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRecordResponse {
    pub id: Uuid,
    pub template_id: Option<Uuid>,
    pub status: String,
    pub result_image_url: Option<String>,
    pub ai_model: String,
    pub prompt: String,
    pub processing_time_ms: i64,
    pub credits_used: i64,
    pub created_at: String,
}

impl From<GenerationRecord> for GenerationRecordResponse {
    fn from(record: GenerationRecord) -> Self {
        Self {
            id: record.id,
            template_id: record.template_id,
            status: record.status.as_str().to_string(),
            result_image_url: record.result_image_url,
            ai_model: record.ai_model,
            prompt: record.prompt,
            processing_time_ms: record.processing_time_ms,
            credits_used: record.credits_used,
            created_at: format_timestamp(record.created_at),
        }
    }
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[derive(Debug, Clone, Serialize)]
pub struct GenerationHistoryResponse {
    pub generations: Vec<GenerationRecordResponse>,
    pub pagination: PaginationResponse,
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[derive(Debug, Clone, Serialize)]
pub struct CategorySummaryResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

impl From<CategorySummary> for CategorySummaryResponse {
    fn from(summary: CategorySummary) -> Self {
        Self {
            id: summary.id,
            name: summary.name,
            slug: summary.slug,
        }
    }
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub preview_image_url: String,
    pub width: i32,
    pub height: i32,
    pub is_premium: bool,
    pub is_featured: bool,
    pub view_count: i64,
    pub usage_count: i64,
    pub tags: Vec<String>,
    pub categories: Vec<CategorySummaryResponse>,
    pub created_at: String,
}

impl From<Template> for TemplateResponse {
    fn from(template: Template) -> Self {
        Self {
            id: template.id,
            title: template.title,
            slug: template.slug,
            description: template.description,
            preview_image_url: template.preview_image_url,
            width: template.width,
            height: template.height,
            is_premium: template.is_premium,
            is_featured: template.is_featured,
            view_count: template.view_count,
            usage_count: template.usage_count,
            tags: template.tags,
            categories: template.categories.into_iter().map(Into::into).collect(),
            created_at: format_timestamp(template.created_at),
        }
    }
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon_name: Option<String>,
    pub color: Option<String>,
    pub parent_id: Option<Uuid>,
    pub sort_order: i32,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            slug: category.slug,
            description: category.description,
            icon_name: category.icon_name,
            color: category.color,
            parent_id: category.parent_id,
            sort_order: category.sort_order,
        }
    }
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteResponse {
    pub template_id: Uuid,
    pub is_favorite: bool,
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptTemplateResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub template: String,
    pub placeholders: Vec<String>,
    pub default_values: HashMap<String, String>,
}

impl From<&PromptTemplate> for PromptTemplateResponse {
    fn from(prompt: &PromptTemplate) -> Self {
        Self {
            id: prompt.id.to_string(),
            name: prompt.name.to_string(),
            description: prompt.description.to_string(),
            template: prompt.template.to_string(),
            placeholders: prompt.placeholders.iter().map(ToString::to_string).collect(),
            default_values: prompt
                .default_values
                .iter()
                .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
                .collect(),
        }
    }
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[cfg_attr(feature = "docs", schema(example = json!({
    "id": "550e8400-e29b-41d4-a716-446655440000",
    "email": "user@example.com",
    "displayName": "Jane Doe",
    "avatarUrl": null,
    "authProvider": "google",
    "credits": 10,
    "createdAt": "2025-01-01T12:00:00Z",
    "lastLogin": "2025-01-02T08:30:00Z"
})))]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub auth_provider: String,
    pub credits: i64,
    pub created_at: String,
    pub last_login: Option<String>,
}

impl From<UserPublic> for UserResponse {
    fn from(user: UserPublic) -> Self {
        Self {
            id: *user.id.as_uuid(),
            email: user.email,
            display_name: user.display_name,
            avatar_url: user.avatar_url,
            auth_provider: user.auth_provider,
            credits: user.credits_balance,
            created_at: format_timestamp(user.created_at),
            last_login: user.last_login.map(format_timestamp),
        }
    }
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    #[cfg_attr(feature = "docs", schema(example = "ok"))]
    pub status: String,
    #[cfg_attr(feature = "docs", schema(example = "ok"))]
    pub database: String,
    #[cfg_attr(feature = "docs", schema(example = "available"))]
    pub generation: String,
}
