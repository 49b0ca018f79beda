use uuid::Uuid;

use crate::error::AppResult;
use domain::auth::UserId;
use domain::gallery::{Category, Template};

#[derive(Debug, Clone, Default)]
pub struct TemplateQuery {
    pub query: Option<String>,
    /// Comma-separated category slugs.
    pub category: Option<String>,
    pub is_premium: Option<bool>,
    pub is_featured: Option<bool>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub random: bool,
    pub seed: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TemplateListing {
    pub templates: Vec<Template>,
    pub limit: u32,
    pub offset: u32,
    pub seed: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteAction {
    Add,
    Remove,
    Check,
}

#[async_trait::async_trait]
pub trait GalleryUseCase: Send + Sync {
    async fn list_templates(&self, query: TemplateQuery) -> AppResult<TemplateListing>;
    async fn template_by_slug(&self, slug: &str) -> AppResult<Template>;
    async fn list_categories(&self) -> AppResult<Vec<Category>>;
    async fn category_by_slug(&self, slug: &str) -> AppResult<Category>;
    async fn favorites(&self, user_id: &UserId) -> AppResult<Vec<Template>>;
    /// Returns whether the template is a favorite after the action.
    async fn update_favorite(
        &self,
        user_id: &UserId,
        template_id: Uuid,
        action: FavoriteAction,
    ) -> AppResult<bool>;
    async fn submit_feedback(
        &self,
        user_id: &UserId,
        template_id: Uuid,
        rating: i16,
        comments: Option<String>,
    ) -> AppResult<()>;
}
