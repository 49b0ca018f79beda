use std::sync::Arc;

use uuid::Uuid;

use crate::error::AppResult;
use domain::auth::UserId;
use domain::gallery::{Category, Template, TemplateFeedback, TemplateFilter};

#[async_trait::async_trait]
pub trait GalleryStorePort: Send + Sync {
    /// Active templates matching `filter`, featured and most used first.
    async fn search_templates(&self, filter: &TemplateFilter) -> AppResult<Vec<Template>>;
    async fn find_template_by_slug(&self, slug: &str) -> AppResult<Option<Template>>;
    async fn template_exists(&self, template_id: Uuid) -> AppResult<bool>;
    async fn list_categories(&self) -> AppResult<Vec<Category>>;
    async fn find_category_by_slug(&self, slug: &str) -> AppResult<Option<Category>>;
    async fn list_favorites(&self, user_id: &UserId) -> AppResult<Vec<Template>>;
    /// Adding an existing favorite is a no-op.
    async fn add_favorite(&self, user_id: &UserId, template_id: Uuid) -> AppResult<()>;
    async fn remove_favorite(&self, user_id: &UserId, template_id: Uuid) -> AppResult<()>;
    async fn is_favorite(&self, user_id: &UserId, template_id: Uuid) -> AppResult<bool>;
    async fn upsert_feedback(&self, feedback: &TemplateFeedback) -> AppResult<()>;
}

pub type DynGalleryStorePort = Arc<dyn GalleryStorePort>;
