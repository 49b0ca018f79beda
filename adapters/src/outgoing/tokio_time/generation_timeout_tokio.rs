use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use craftads_application::ports::outgoing::{
    generation_backend::DynGenerationBackendPort,
    timeout::{GenerationTimeoutPort, TimeoutError},
};
use domain::generation::{GenerationInput, GenerationResult};

pub struct TokioGenerationTimeoutAdapter {
    backend: DynGenerationBackendPort,
}

impl TokioGenerationTimeoutAdapter {
    pub fn new(backend: DynGenerationBackendPort) -> Self {
        Self { backend }
    }
}

impl GenerationTimeoutPort for TokioGenerationTimeoutAdapter {
    fn generate_with_timeout(
        &self,
        input: GenerationInput,
        duration: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<GenerationResult, TimeoutError>> + Send + 'static>> {
        let backend = Arc::clone(&self.backend);

        Box::pin(async move {
            timeout(duration, backend.generate(input))
                .await
                .map_err(|_| TimeoutError)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outgoing::generation::mock_backend::MockGenerationBackend;
    use domain::auth::UserId;

    fn input() -> GenerationInput {
        GenerationInput {
            reference_image: "data:image/png;base64,AAAA".to_string(),
            product_image: "data:image/png;base64,BBBB".to_string(),
            prompt: "Place the product on the beach".to_string(),
            user_id: UserId::new(),
            width: None,
            height: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_backend_hits_the_deadline() {
        let backend: DynGenerationBackendPort =
            Arc::new(MockGenerationBackend::new(Duration::from_secs(60), 0.0));
        let adapter = TokioGenerationTimeoutAdapter::new(backend);

        let result = adapter
            .generate_with_timeout(input(), Duration::from_secs(30))
            .await;

        assert!(result.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn fast_backend_finishes_in_time() {
        let backend: DynGenerationBackendPort =
            Arc::new(MockGenerationBackend::new(Duration::from_secs(3), 0.0));
        let adapter = TokioGenerationTimeoutAdapter::new(backend);

        let result = adapter
            .generate_with_timeout(input(), Duration::from_secs(30))
            .await
            .unwrap();

        assert!(result.success);
    }
}
