use std::sync::Arc;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::config::GenerationSettings;
use crate::credits::service::{DEFAULT_USAGE_DESCRIPTION, DEFAULT_USAGE_REFERENCE_TYPE};
use crate::error::{AppError, AppResult};
use crate::ports::incoming::credits::{CreditUseCase, ReserveCredits};
use crate::ports::incoming::generation::{
    GenerateRequest, GenerationOutcome, GenerationUseCase, ModelInfo,
};
use crate::ports::outgoing::generation_backend::GenerationBackendPort;
use crate::ports::outgoing::generation_store::GenerationStorePort;
use crate::ports::outgoing::timeout::GenerationTimeoutPort;
use domain::auth::UserId;
use domain::credits::LedgerEntry;
use domain::generation::{
    GenerationFailure, GenerationInput, GenerationRecord, GenerationResult, GenerationStatus,
};
use domain::pagination::{Page, PageInfo, PageRequest};
use domain::prompt::{PROMPT_TEMPLATES, PromptTemplate, format_prompt};

const MISSING_FIELDS_MESSAGE: &str =
    "Missing required fields: referenceImage, productImage, and promptTemplate are required";

pub struct GenerationService {
    credits: Arc<dyn CreditUseCase>,
    backend: Arc<dyn GenerationBackendPort>,
    timeout: Arc<dyn GenerationTimeoutPort>,
    generation_store: Arc<dyn GenerationStorePort>,
    settings: GenerationSettings,
}

impl GenerationService {
    pub fn new(
        credits: Arc<dyn CreditUseCase>,
        backend: Arc<dyn GenerationBackendPort>,
        timeout: Arc<dyn GenerationTimeoutPort>,
        generation_store: Arc<dyn GenerationStorePort>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            credits,
            backend,
            timeout,
            generation_store,
            settings,
        }
    }

    async fn record(&self, record: GenerationRecord) {
        if let Err(err) = self.generation_store.record_generation(&record).await {
            tracing::warn!(
                generation_id = %record.id,
                user_id = %record.user_id,
                error = %err,
                "Failed to record generation"
            );
        }
    }

    /// Commits the reservation and records the successful generation.
    async fn settle(
        &self,
        reservation: &LedgerEntry,
        mut record: GenerationRecord,
        image_url: &str,
        credits_used: i64,
    ) {
        if let Err(err) = self
            .credits
            .commit_reservation(reservation.transaction.id)
            .await
        {
            // The debit was applied at reservation time; only the status flip is missing.
            tracing::error!(
                generation_id = %record.id,
                reservation_id = %reservation.transaction.id,
                error = %err,
                "Could not commit reservation"
            );
        }

        record.status = GenerationStatus::Completed;
        record.result_image_url = Some(image_url.to_string());
        record.credits_used = credits_used;
        self.record(record).await;
    }

    /// Gives the reserved credits back and records the failed attempt.
    /// Returns `cause`, or the release error when the refund could not be written.
    async fn abort(
        &self,
        reservation: &LedgerEntry,
        record: GenerationRecord,
        cause: AppError,
    ) -> AppError {
        let generation_id = record.id;
        self.record(record).await;

        match self
            .credits
            .release_reservation(reservation.transaction.id)
            .await
        {
            Ok(_) => cause,
            Err(err) => {
                tracing::error!(
                    generation_id = %generation_id,
                    reservation_id = %reservation.transaction.id,
                    error = %err,
                    "Could not release reservation; left for the stale reservation sweep"
                );
                err
            }
        }
    }
}

fn prepare_input(user_id: &UserId, request: &GenerateRequest) -> AppResult<GenerationInput> {
    if request.reference_image.trim().is_empty()
        || request.product_image.trim().is_empty()
        || request.prompt_template.trim().is_empty()
    {
        return Err(AppError::ValidationError {
            message: MISSING_FIELDS_MESSAGE.to_string(),
        });
    }

    let prompt = format_prompt(&request.prompt_template, &request.prompt_values).map_err(
        |err| AppError::ValidationError {
            message: err.to_string(),
        },
    )?;

    let input = GenerationInput {
        reference_image: request.reference_image.clone(),
        product_image: request.product_image.clone(),
        prompt,
        user_id: *user_id,
        width: request.width,
        height: request.height,
    };

    if !input.has_required_inputs() {
        return Err(failure_error(&GenerationResult::missing_input()));
    }

    Ok(input)
}

fn failure_error(result: &GenerationResult) -> AppError {
    let message = result
        .error
        .clone()
        .unwrap_or_else(|| "Generation failed".to_string());
    match result.failure {
        Some(GenerationFailure::MissingInput) => AppError::MissingInput { message },
        Some(GenerationFailure::Unavailable) => AppError::ServiceUnavailable,
        Some(GenerationFailure::Upstream) | None => AppError::UpstreamGenerationFailure { message },
    }
}

#[async_trait::async_trait]
impl GenerationUseCase for GenerationService {
    async fn generate(
        &self,
        user_id: &UserId,
        request: GenerateRequest,
    ) -> AppResult<GenerationOutcome> {
        let input = prepare_input(user_id, &request)?;

        if !self.backend.is_available() {
            return Err(AppError::ServiceUnavailable);
        }

        let model = self.backend.describe_model();
        let generation_id = Uuid::new_v4();

        let reservation = self
            .credits
            .reserve(
                user_id,
                ReserveCredits {
                    amount: model.credit_cost,
                    description: DEFAULT_USAGE_DESCRIPTION.to_string(),
                    reference_id: Some(generation_id.to_string()),
                    reference_type: Some(DEFAULT_USAGE_REFERENCE_TYPE.to_string()),
                },
            )
            .await?;

        tracing::info!(
            user_id = %user_id,
            generation_id = %generation_id,
            model = %model.name,
            "Starting generation"
        );

        let mut record = GenerationRecord {
            id: generation_id,
            user_id: *user_id,
            template_id: request.template_id,
            status: GenerationStatus::Failed,
            result_image_url: None,
            ai_model: model.name.clone(),
            prompt: input.prompt.clone(),
            processing_time_ms: 0,
            credits_used: 0,
            created_at: OffsetDateTime::now_utc(),
        };

        let outcome = self
            .timeout
            .generate_with_timeout(input, self.settings.timeout)
            .await;
        record.processing_time_ms =
            i64::try_from((OffsetDateTime::now_utc() - record.created_at).whole_milliseconds())
                .unwrap_or(i64::MAX);

        let Ok(result) = outcome else {
            tracing::warn!(
                generation_id = %generation_id,
                timeout_secs = self.settings.timeout.as_secs(),
                "Generation timed out"
            );
            return Err(self
                .abort(&reservation, record, AppError::GenerationTimeout)
                .await);
        };

        let Some(image_url) = result.image_url.clone().filter(|_| result.success) else {
            tracing::warn!(
                generation_id = %generation_id,
                error = result.error.as_deref().unwrap_or("unknown"),
                "Generation failed"
            );
            return Err(self
                .abort(&reservation, record, failure_error(&result))
                .await);
        };

        self.settle(&reservation, record, &image_url, model.credit_cost)
            .await;

        tracing::info!(
            user_id = %user_id,
            generation_id = %generation_id,
            new_balance = reservation.new_balance,
            "Generation completed"
        );

        Ok(GenerationOutcome {
            generation_id,
            image_url,
            metadata: result.metadata,
            credits_used: model.credit_cost,
            new_balance: reservation.new_balance,
        })
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            descriptor: self.backend.describe_model(),
            available: self.backend.is_available(),
        }
    }

    fn prompt_templates(&self) -> &'static [PromptTemplate] {
        PROMPT_TEMPLATES
    }

    async fn history(
        &self,
        user_id: &UserId,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> AppResult<Page<GenerationRecord>> {
        if page == Some(0) {
            return Err(AppError::ValidationError {
                message: "page must be at least 1".to_string(),
            });
        }

        let request = PageRequest::clamped(
            page,
            limit,
            self.settings.history_default_limit,
            self.settings.history_max_limit,
        );

        let items = self
            .generation_store
            .list_generations(user_id, request.offset(), i64::from(request.limit))
            .await?;
        let total = self.generation_store.count_generations(user_id).await?;

        Ok(Page {
            items,
            info: PageInfo::new(request, total),
        })
    }
}
