use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use domain::generation::{GenerationInput, GenerationResult};

#[derive(Debug)]
pub struct TimeoutError;

pub trait GenerationTimeoutPort: Send + Sync {
    fn generate_with_timeout(
        &self,
        input: GenerationInput,
        duration: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<GenerationResult, TimeoutError>> + Send + 'static>>;
}

pub type DynGenerationTimeoutPort = Arc<dyn GenerationTimeoutPort>;
