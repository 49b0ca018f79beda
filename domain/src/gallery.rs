use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::UserId;
use crate::error::DomainError;

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySummary {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon_name: Option<String>,
    pub color: Option<String>,
    pub parent_id: Option<Uuid>,
    pub sort_order: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
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
    pub categories: Vec<CategorySummary>,
    pub created_at: OffsetDateTime,
}

/// Store-level listing filter. Limits here are already validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateFilter {
    pub query: Option<String>,
    pub category_slugs: Vec<String>,
    pub is_premium: Option<bool>,
    pub is_featured: Option<bool>,
    pub limit: u32,
    pub offset: u32,
}

impl TemplateFilter {
    /// Splits a comma-separated `category` parameter into trimmed, non-empty slugs.
    pub fn parse_category_slugs(raw: Option<&str>) -> Vec<String> {
        raw.map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|slug| !slug.is_empty())
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default()
    }

    pub fn normalized_query(&self) -> Option<&str> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|query| !query.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFeedback {
    pub user_id: UserId,
    pub template_id: Uuid,
    pub rating: i16,
    pub comments: Option<String>,
}

impl TemplateFeedback {
    pub fn new(
        user_id: UserId,
        template_id: Uuid,
        rating: i16,
        comments: Option<String>,
    ) -> Result<Self, DomainError> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(DomainError::RatingOutOfRange(rating));
        }

        let comments = comments
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());

        Ok(Self {
            user_id,
            template_id,
            rating,
            comments,
        })
    }
}
