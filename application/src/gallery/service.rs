use std::sync::Arc;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::config::GallerySettings;
use crate::error::{AppError, AppResult};
use crate::ports::incoming::gallery::{
    FavoriteAction, GalleryUseCase, TemplateListing, TemplateQuery,
};
use crate::ports::outgoing::gallery_store::GalleryStorePort;
use domain::auth::UserId;
use domain::gallery::{Category, Template, TemplateFeedback, TemplateFilter};
use domain::shuffle::seeded_shuffle;

pub struct GalleryService {
    gallery_store: Arc<dyn GalleryStorePort>,
    settings: GallerySettings,
}

impl GalleryService {
    pub fn new(gallery_store: Arc<dyn GalleryStorePort>, settings: GallerySettings) -> Self {
        Self {
            gallery_store,
            settings,
        }
    }

    async fn ensure_template(&self, template_id: Uuid) -> AppResult<()> {
        if self.gallery_store.template_exists(template_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound {
                message: "Template not found".to_string(),
            })
        }
    }
}

/// Current Unix time in milliseconds, the seed used when a client sends none.
fn time_seed() -> String {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000).to_string()
}

#[async_trait::async_trait]
impl GalleryUseCase for GalleryService {
    async fn list_templates(&self, query: TemplateQuery) -> AppResult<TemplateListing> {
        let limit = query
            .limit
            .unwrap_or(self.settings.default_limit)
            .clamp(1, self.settings.max_limit);
        let offset = query.offset.unwrap_or(0);
        let seed = query
            .seed
            .filter(|seed| !seed.trim().is_empty())
            .unwrap_or_else(time_seed);

        let filter = TemplateFilter {
            query: query.query,
            category_slugs: TemplateFilter::parse_category_slugs(query.category.as_deref()),
            is_premium: query.is_premium,
            is_featured: query.is_featured,
            limit,
            offset,
        };

        let mut templates = self.gallery_store.search_templates(&filter).await?;
        if query.random {
            seeded_shuffle(&mut templates, &seed);
        }

        tracing::debug!(
            count = templates.len(),
            limit,
            offset,
            random = query.random,
            seed = %seed,
            "Listed gallery templates"
        );

        Ok(TemplateListing {
            templates,
            limit,
            offset,
            seed,
        })
    }

    async fn template_by_slug(&self, slug: &str) -> AppResult<Template> {
        self.gallery_store
            .find_template_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound {
                message: "Template not found".to_string(),
            })
    }

    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        self.gallery_store.list_categories().await
    }

    async fn category_by_slug(&self, slug: &str) -> AppResult<Category> {
        self.gallery_store
            .find_category_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound {
                message: "Category not found".to_string(),
            })
    }

    async fn favorites(&self, user_id: &UserId) -> AppResult<Vec<Template>> {
        self.gallery_store.list_favorites(user_id).await
    }

    async fn update_favorite(
        &self,
        user_id: &UserId,
        template_id: Uuid,
        action: FavoriteAction,
    ) -> AppResult<bool> {
        match action {
            FavoriteAction::Add => {
                self.ensure_template(template_id).await?;
                self.gallery_store.add_favorite(user_id, template_id).await?;
                Ok(true)
            }
            FavoriteAction::Remove => {
                self.gallery_store
                    .remove_favorite(user_id, template_id)
                    .await?;
                Ok(false)
            }
            FavoriteAction::Check => self.gallery_store.is_favorite(user_id, template_id).await,
        }
    }

    async fn submit_feedback(
        &self,
        user_id: &UserId,
        template_id: Uuid,
        rating: i16,
        comments: Option<String>,
    ) -> AppResult<()> {
        let feedback = TemplateFeedback::new(*user_id, template_id, rating, comments).map_err(
            |err| AppError::ValidationError {
                message: err.to_string(),
            },
        )?;

        self.ensure_template(template_id).await?;
        self.gallery_store.upsert_feedback(&feedback).await?;

        tracing::info!(
            user_id = %user_id,
            template_id = %template_id,
            rating,
            "Template feedback saved"
        );
        Ok(())
    }
}
