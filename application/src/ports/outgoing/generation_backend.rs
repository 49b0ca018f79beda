use std::sync::Arc;

use domain::generation::{GenerationInput, GenerationResult, ModelDescriptor};

/// An image model that turns a reference ad and a product shot into a new ad.
///
/// Failures are reported in-band through [`GenerationResult::success`]; a
/// failed result never carries a credit cost.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait GenerationBackendPort: Send + Sync {
    async fn generate(&self, input: GenerationInput) -> GenerationResult;
    fn is_available(&self) -> bool;
    fn describe_model(&self) -> ModelDescriptor;
}

pub type DynGenerationBackendPort = Arc<dyn GenerationBackendPort>;
