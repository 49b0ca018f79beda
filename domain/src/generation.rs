use std::fmt::{Display, Formatter, Result as FmtResult};

use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::UserId;

pub const DEFAULT_DIMENSION: u32 = 1024;
pub const MISSING_INPUT_MESSAGE: &str =
    "Missing required input: referenceImage, productImage, and prompt are required";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationInput {
    pub reference_image: String,
    pub product_image: String,
    pub prompt: String,
    pub user_id: UserId,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl GenerationInput {
    pub fn has_required_inputs(&self) -> bool {
        !self.reference_image.trim().is_empty()
            && !self.product_image.trim().is_empty()
            && !self.prompt.trim().is_empty()
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width.unwrap_or(DEFAULT_DIMENSION),
            height: self.height.unwrap_or(DEFAULT_DIMENSION),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Display for Dimensions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationMetadata {
    pub model: String,
    pub prompt_tokens: u32,
    pub processing_time_ms: u64,
    pub dimensions: Dimensions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationFailure {
    MissingInput,
    Upstream,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub success: bool,
    pub image_url: Option<String>,
    pub error: Option<String>,
    pub failure: Option<GenerationFailure>,
    pub credit_used: i64,
    pub generation_id: Option<String>,
    pub metadata: Option<GenerationMetadata>,
}

impl GenerationResult {
    pub fn succeeded(
        image_url: String,
        generation_id: String,
        credit_used: i64,
        metadata: GenerationMetadata,
    ) -> Self {
        Self {
            success: true,
            image_url: Some(image_url),
            error: None,
            failure: None,
            credit_used,
            generation_id: Some(generation_id),
            metadata: Some(metadata),
        }
    }

    pub fn failed(failure: GenerationFailure, error: impl Into<String>) -> Self {
        Self {
            success: false,
            image_url: None,
            error: Some(error.into()),
            failure: Some(failure),
            credit_used: 0,
            generation_id: None,
            metadata: None,
        }
    }

    pub fn missing_input() -> Self {
        Self::failed(GenerationFailure::MissingInput, MISSING_INPUT_MESSAGE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescriptor {
    pub name: String,
    pub version: String,
    pub capabilities: Vec<String>,
    pub credit_cost: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStatus {
    Completed,
    Failed,
}

impl GenerationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// Persisted history row for a finished generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRecord {
    pub id: Uuid,
    pub user_id: UserId,
    pub template_id: Option<Uuid>,
    pub status: GenerationStatus,
    pub result_image_url: Option<String>,
    pub ai_model: String,
    pub prompt: String,
    pub processing_time_ms: i64,
    pub credits_used: i64,
    pub created_at: OffsetDateTime,
}

/// Rough token estimate used in generation metadata.
pub fn estimate_prompt_tokens(prompt: &str) -> u32 {
    u32::try_from(prompt.len() / 4).unwrap_or(u32::MAX)
}
