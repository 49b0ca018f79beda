use std::collections::HashMap;

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::{debug, instrument};
use uuid::Uuid;

use craftads_application::{
    error::{AppError, AppResult},
    ports::outgoing::gallery_store::GalleryStorePort,
};
use domain::auth::UserId;
use domain::gallery::{Category, CategorySummary, Template, TemplateFeedback, TemplateFilter};

use super::utils::{PostgresExecutor, column};

const TEMPLATE_COLUMNS: &str = "t.id, t.title, t.slug, t.description, t.preview_image_url, \
     t.width, t.height, t.is_premium, t.is_featured, t.view_count, t.usage_count, t.tags, \
     t.created_at";

const LISTING_ORDER: &str =
    " ORDER BY t.is_featured DESC, t.usage_count DESC, t.view_count DESC, t.created_at DESC, t.id";

const CATEGORY_COLUMNS: &str =
    "id, name, slug, description, icon_name, color, parent_id, sort_order";

/// Escapes `LIKE` wildcards so user input only ever matches literally.
fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn template_from_row(row: &PgRow) -> AppResult<Template> {
    Ok(Template {
        id: column(row, "id")?,
        title: column(row, "title")?,
        slug: column(row, "slug")?,
        description: column(row, "description")?,
        preview_image_url: column(row, "preview_image_url")?,
        width: column(row, "width")?,
        height: column(row, "height")?,
        is_premium: column(row, "is_premium")?,
        is_featured: column(row, "is_featured")?,
        view_count: column(row, "view_count")?,
        usage_count: column(row, "usage_count")?,
        tags: column(row, "tags")?,
        categories: Vec::new(),
        created_at: column(row, "created_at")?,
    })
}

fn category_from_row(row: &PgRow) -> AppResult<Category> {
    Ok(Category {
        id: column(row, "id")?,
        name: column(row, "name")?,
        slug: column(row, "slug")?,
        description: column(row, "description")?,
        icon_name: column(row, "icon_name")?,
        color: column(row, "color")?,
        parent_id: column(row, "parent_id")?,
        sort_order: column(row, "sort_order")?,
    })
}

pub struct PostgresGalleryStoreAdapter {
    pool: PgPool,
    executor: PostgresExecutor,
}

impl PostgresGalleryStoreAdapter {
    pub fn new(pool: PgPool, query_timeout_secs: u64) -> Self {
        Self {
            pool,
            executor: PostgresExecutor::new(query_timeout_secs),
        }
    }

    /// Loads the category summaries of `rows` in one round trip and attaches them.
    async fn with_categories(&self, rows: Vec<PgRow>) -> AppResult<Vec<Template>> {
        let mut templates = rows
            .iter()
            .map(template_from_row)
            .collect::<AppResult<Vec<_>>>()?;
        if templates.is_empty() {
            return Ok(templates);
        }

        let ids: Vec<Uuid> = templates.iter().map(|template| template.id).collect();
        let links = self
            .executor
            .execute_with_timeout(
                || {
                    sqlx::query(
                        r"
                    SELECT r.template_id, c.id, c.name, c.slug
                    FROM template_category_relationships r
                    JOIN template_categories c ON c.id = r.category_id
                    WHERE r.template_id = ANY($1) AND c.is_active
                    ORDER BY c.sort_order, c.name
                    ",
                    )
                    .bind(&ids)
                    .fetch_all(&self.pool)
                },
                "Failed to load template categories",
            )
            .await?;

        let mut by_template: HashMap<Uuid, Vec<CategorySummary>> = HashMap::new();
        for link in &links {
            by_template
                .entry(column(link, "template_id")?)
                .or_default()
                .push(CategorySummary {
                    id: column(link, "id")?,
                    name: column(link, "name")?,
                    slug: column(link, "slug")?,
                });
        }

        for template in &mut templates {
            template.categories = by_template.remove(&template.id).unwrap_or_default();
        }

        Ok(templates)
    }
}

#[async_trait::async_trait]
impl GalleryStorePort for PostgresGalleryStoreAdapter {
    #[instrument(skip(self))]
    async fn search_templates(&self, filter: &TemplateFilter) -> AppResult<Vec<Template>> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {TEMPLATE_COLUMNS} FROM ad_templates t WHERE t.is_active"
        ));

        if let Some(query) = filter.normalized_query() {
            let pattern = like_pattern(query);
            builder
                .push(" AND (t.title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR t.description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }

        if !filter.category_slugs.is_empty() {
            builder
                .push(
                    " AND EXISTS (SELECT 1 FROM template_category_relationships r \
                     JOIN template_categories c ON c.id = r.category_id \
                     WHERE r.template_id = t.id AND c.slug = ANY(",
                )
                .push_bind(filter.category_slugs.clone())
                .push("))");
        }

        if let Some(is_premium) = filter.is_premium {
            builder.push(" AND t.is_premium = ").push_bind(is_premium);
        }

        if let Some(is_featured) = filter.is_featured {
            builder.push(" AND t.is_featured = ").push_bind(is_featured);
        }

        builder
            .push(LISTING_ORDER)
            .push(" LIMIT ")
            .push_bind(i64::from(filter.limit))
            .push(" OFFSET ")
            .push_bind(i64::from(filter.offset));

        let query = builder.build();
        let rows = self
            .executor
            .execute_with_timeout(
                || query.fetch_all(&self.pool),
                "Failed to search templates",
            )
            .await?;

        debug!("Template search matched {} rows", rows.len());

        self.with_categories(rows).await
    }

    #[instrument(skip(self))]
    async fn find_template_by_slug(&self, slug: &str) -> AppResult<Option<Template>> {
        let sql =
            format!("SELECT {TEMPLATE_COLUMNS} FROM ad_templates t WHERE t.slug = $1 AND t.is_active");
        let row = self
            .executor
            .execute_with_timeout(
                || sqlx::query(&sql).bind(slug).fetch_optional(&self.pool),
                &format!("Failed to find template {}", slug),
            )
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(self.with_categories(vec![row]).await?.into_iter().next())
    }

    #[instrument(skip(self))]
    async fn template_exists(&self, template_id: Uuid) -> AppResult<bool> {
        let row = self
            .executor
            .execute_with_timeout(
                || {
                    sqlx::query(
                        "SELECT EXISTS (SELECT 1 FROM ad_templates WHERE id = $1 AND is_active) AS found",
                    )
                    .bind(template_id)
                    .fetch_one(&self.pool)
                },
                &format!("Failed to check template {}", template_id),
            )
            .await?;

        row.try_get("found").map_err(|e| AppError::DatabaseError {
            message: format!("Failed to get found: {}", e),
        })
    }

    #[instrument(skip(self))]
    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let sql = format!(
            "SELECT {CATEGORY_COLUMNS} FROM template_categories WHERE is_active ORDER BY sort_order, name"
        );
        let rows = self
            .executor
            .execute_with_timeout(
                || sqlx::query(&sql).fetch_all(&self.pool),
                "Failed to list categories",
            )
            .await?;

        rows.iter().map(category_from_row).collect()
    }

    #[instrument(skip(self))]
    async fn find_category_by_slug(&self, slug: &str) -> AppResult<Option<Category>> {
        let sql = format!(
            "SELECT {CATEGORY_COLUMNS} FROM template_categories WHERE slug = $1 AND is_active"
        );
        let row = self
            .executor
            .execute_with_timeout(
                || sqlx::query(&sql).bind(slug).fetch_optional(&self.pool),
                &format!("Failed to find category {}", slug),
            )
            .await?;

        row.as_ref().map(category_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn list_favorites(&self, user_id: &UserId) -> AppResult<Vec<Template>> {
        let sql = format!(
            "SELECT {TEMPLATE_COLUMNS} FROM user_favorite_templates f \
             JOIN ad_templates t ON t.id = f.template_id \
             WHERE f.user_id = $1 AND t.is_active ORDER BY f.created_at DESC, t.id"
        );
        let rows = self
            .executor
            .execute_with_timeout(
                || sqlx::query(&sql).bind(user_id.as_uuid()).fetch_all(&self.pool),
                &format!("Failed to list favorites for user {}", user_id),
            )
            .await?;

        self.with_categories(rows).await
    }

    #[instrument(skip(self))]
    async fn add_favorite(&self, user_id: &UserId, template_id: Uuid) -> AppResult<()> {
        self.executor
            .execute_with_timeout(
                || {
                    sqlx::query(
                        r"
                    INSERT INTO user_favorite_templates (user_id, template_id)
                    VALUES ($1, $2)
                    ON CONFLICT (user_id, template_id) DO NOTHING
                    ",
                    )
                    .bind(user_id.as_uuid())
                    .bind(template_id)
                    .execute(&self.pool)
                },
                &format!("Failed to add favorite {} for user {}", template_id, user_id),
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_favorite(&self, user_id: &UserId, template_id: Uuid) -> AppResult<()> {
        self.executor
            .execute_with_timeout(
                || {
                    sqlx::query(
                        "DELETE FROM user_favorite_templates WHERE user_id = $1 AND template_id = $2",
                    )
                    .bind(user_id.as_uuid())
                    .bind(template_id)
                    .execute(&self.pool)
                },
                &format!("Failed to remove favorite {} for user {}", template_id, user_id),
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn is_favorite(&self, user_id: &UserId, template_id: Uuid) -> AppResult<bool> {
        let row = self
            .executor
            .execute_with_timeout(
                || {
                    sqlx::query(
                        r"
                    SELECT EXISTS (
                        SELECT 1 FROM user_favorite_templates
                        WHERE user_id = $1 AND template_id = $2
                    ) AS found
                    ",
                    )
                    .bind(user_id.as_uuid())
                    .bind(template_id)
                    .fetch_one(&self.pool)
                },
                &format!("Failed to check favorite {} for user {}", template_id, user_id),
            )
            .await?;

        row.try_get("found").map_err(|e| AppError::DatabaseError {
            message: format!("Failed to get found: {}", e),
        })
    }

    #[instrument(skip(self, feedback), fields(template_id = %feedback.template_id))]
    async fn upsert_feedback(&self, feedback: &TemplateFeedback) -> AppResult<()> {
        self.executor
            .execute_with_timeout(
                || {
                    sqlx::query(
                        r"
                    INSERT INTO template_feedback (user_id, template_id, rating, comments)
                    VALUES ($1, $2, $3, $4)
                    ON CONFLICT (user_id, template_id)
                    DO UPDATE SET rating = EXCLUDED.rating, comments = EXCLUDED.comments, updated_at = NOW()
                    ",
                    )
                    .bind(feedback.user_id.as_uuid())
                    .bind(feedback.template_id)
                    .bind(feedback.rating)
                    .bind(feedback.comments.as_deref())
                    .execute(&self.pool)
                },
                &format!("Failed to store feedback for template {}", feedback.template_id),
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("coffee"), "%coffee%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
