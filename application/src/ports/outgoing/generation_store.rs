use std::sync::Arc;

use crate::error::AppResult;
use domain::auth::UserId;
use domain::generation::GenerationRecord;

#[async_trait::async_trait]
pub trait GenerationStorePort: Send + Sync {
    async fn record_generation(&self, record: &GenerationRecord) -> AppResult<()>;
    async fn list_generations(
        &self,
        user_id: &UserId,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<GenerationRecord>>;
    async fn count_generations(&self, user_id: &UserId) -> AppResult<i64>;
}

pub type DynGenerationStorePort = Arc<dyn GenerationStorePort>;
