use std::time::Duration;

use rand::Rng;
use tokio::time::{Instant, sleep};
use tracing::{debug, instrument};
use uuid::Uuid;

use craftads_application::ports::outgoing::generation_backend::GenerationBackendPort;
use domain::generation::{
    GenerationFailure, GenerationInput, GenerationMetadata, GenerationResult, ModelDescriptor,
    estimate_prompt_tokens,
};

pub const MOCK_MODEL_ID: &str = "mock-gpt4o";
pub const MOCK_CREDIT_COST: i64 = 1;
pub const MOCK_FAILURE_MESSAGE: &str =
    "Random generation failure (this is a mock error for testing)";

const MOCK_IMAGES: &[&str] = &[
    "/images/mock_generations/generation_1.jpg",
    "/images/mock_generations/generation_2.jpg",
    "/images/mock_generations/generation_3.jpg",
    "/images/mock_generations/generation_4.jpg",
    "/images/mock_generations/generation_5.jpg",
];

/// Stand-in model that sleeps, fails at a configured rate and otherwise
/// returns one of a handful of canned images.
pub struct MockGenerationBackend {
    delay: Duration,
    failure_rate: f64,
}

impl MockGenerationBackend {
    pub fn new(delay: Duration, failure_rate: f64) -> Self {
        Self {
            delay,
            failure_rate: failure_rate.clamp(0.0, 1.0),
        }
    }

    fn roll_failure(&self) -> bool {
        self.failure_rate > 0.0 && rand::rng().random::<f64>() < self.failure_rate
    }

    fn pick_image() -> &'static str {
        let index = rand::rng().random_range(0..MOCK_IMAGES.len());
        MOCK_IMAGES.get(index).copied().unwrap_or("")
    }
}

#[async_trait::async_trait]
impl GenerationBackendPort for MockGenerationBackend {
    #[instrument(skip(self, input), fields(user_id = %input.user_id))]
    async fn generate(&self, input: GenerationInput) -> GenerationResult {
        if !input.has_required_inputs() {
            return GenerationResult::missing_input();
        }

        let started = Instant::now();
        sleep(self.delay).await;

        if self.roll_failure() {
            debug!("Mock backend rolled a failure");
            return GenerationResult::failed(GenerationFailure::Upstream, MOCK_FAILURE_MESSAGE);
        }

        let metadata = GenerationMetadata {
            model: MOCK_MODEL_ID.to_string(),
            prompt_tokens: estimate_prompt_tokens(&input.prompt),
            processing_time_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            dimensions: input.dimensions(),
        };

        GenerationResult::succeeded(
            Self::pick_image().to_string(),
            Uuid::new_v4().to_string(),
            MOCK_CREDIT_COST,
            metadata,
        )
    }

    fn is_available(&self) -> bool {
        true
    }

    fn describe_model(&self) -> ModelDescriptor {
        ModelDescriptor {
            name: "Mock GPT-4o".to_string(),
            version: "1.0".to_string(),
            capabilities: vec![
                "image-to-image".to_string(),
                "text-guided-generation".to_string(),
                "product-integration".to_string(),
            ],
            credit_cost: MOCK_CREDIT_COST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::auth::UserId;

    fn input(prompt: &str) -> GenerationInput {
        GenerationInput {
            reference_image: "data:image/png;base64,AAAA".to_string(),
            product_image: "data:image/png;base64,BBBB".to_string(),
            prompt: prompt.to_string(),
            user_id: UserId::new(),
            width: Some(800),
            height: None,
        }
    }

    #[tokio::test]
    async fn missing_input_is_rejected_for_free() {
        let backend = MockGenerationBackend::new(Duration::ZERO, 0.0);

        let result = backend.generate(input("")).await;

        assert!(!result.success);
        assert_eq!(result.failure, Some(GenerationFailure::MissingInput));
        assert_eq!(result.credit_used, 0);
        assert!(result.image_url.is_none());
    }

    #[tokio::test]
    async fn success_returns_a_canned_image() {
        let backend = MockGenerationBackend::new(Duration::ZERO, 0.0);

        let result = backend.generate(input("Put it on a beach")).await;

        assert!(result.success);
        assert_eq!(result.credit_used, MOCK_CREDIT_COST);
        let url = result.image_url.unwrap();
        assert!(MOCK_IMAGES.contains(&url.as_str()));
        let metadata = result.metadata.unwrap();
        assert_eq!(metadata.model, MOCK_MODEL_ID);
        assert_eq!(metadata.prompt_tokens, 4);
        assert_eq!(metadata.dimensions.to_string(), "800x1024");
        assert!(Uuid::parse_str(&result.generation_id.unwrap()).is_ok());
    }

    #[tokio::test]
    async fn certain_failure_rate_always_fails_without_charge() {
        let backend = MockGenerationBackend::new(Duration::ZERO, 1.0);

        for _ in 0..5 {
            let result = backend.generate(input("Put it on a beach")).await;
            assert!(!result.success);
            assert_eq!(result.failure, Some(GenerationFailure::Upstream));
            assert_eq!(result.error.as_deref(), Some(MOCK_FAILURE_MESSAGE));
            assert_eq!(result.credit_used, 0);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn processing_time_reflects_the_delay() {
        let backend = MockGenerationBackend::new(Duration::from_secs(3), 0.0);

        let result = backend.generate(input("Put it on a beach")).await;

        assert!(result.success);
        assert!(result.metadata.unwrap().processing_time_ms >= 3000);
        assert!(backend.is_available());
        assert_eq!(backend.describe_model().credit_cost, 1);
    }
}
