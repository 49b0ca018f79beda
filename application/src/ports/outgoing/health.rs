use std::sync::Arc;

use crate::error::AppResult;

#[async_trait::async_trait]
pub trait HealthProbePort: Send + Sync {
    async fn ping(&self) -> AppResult<()>;
}

pub type DynHealthProbePort = Arc<dyn HealthProbePort>;
