use craftads_application::ports::outgoing::generation_backend::GenerationBackendPort;
use domain::generation::{GenerationFailure, GenerationInput, GenerationResult, ModelDescriptor};

pub const DISABLED_MESSAGE: &str = "Image generation is not available. Please use the mock backend for testing.";

/// Placeholder for a real image model that has not been wired up yet.
pub struct DisabledGenerationBackend;

#[async_trait::async_trait]
impl GenerationBackendPort for DisabledGenerationBackend {
    async fn generate(&self, _input: GenerationInput) -> GenerationResult {
        GenerationResult::failed(GenerationFailure::Unavailable, DISABLED_MESSAGE)
    }

    fn is_available(&self) -> bool {
        false
    }

    fn describe_model(&self) -> ModelDescriptor {
        ModelDescriptor {
            name: "GPT-4o".to_string(),
            version: "unavailable".to_string(),
            capabilities: vec![
                "image-to-image".to_string(),
                "text-guided-generation".to_string(),
            ],
            credit_cost: 1,
        }
    }
}
