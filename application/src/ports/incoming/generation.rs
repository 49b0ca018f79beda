use std::collections::HashMap;

use uuid::Uuid;

use crate::error::AppResult;
use domain::auth::UserId;
use domain::generation::{GenerationMetadata, GenerationRecord, ModelDescriptor};
use domain::pagination::Page;
use domain::prompt::PromptTemplate;

#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    pub reference_image: String,
    pub product_image: String,
    pub prompt_template: String,
    pub prompt_values: HashMap<String, String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub template_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub generation_id: Uuid,
    pub image_url: String,
    pub metadata: Option<GenerationMetadata>,
    pub credits_used: i64,
    pub new_balance: i64,
}

#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub descriptor: ModelDescriptor,
    pub available: bool,
}

#[async_trait::async_trait]
pub trait GenerationUseCase: Send + Sync {
    async fn generate(
        &self,
        user_id: &UserId,
        request: GenerateRequest,
    ) -> AppResult<GenerationOutcome>;
    fn model_info(&self) -> ModelInfo;
    fn prompt_templates(&self) -> &'static [PromptTemplate];
    async fn history(
        &self,
        user_id: &UserId,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> AppResult<Page<GenerationRecord>>;
}
