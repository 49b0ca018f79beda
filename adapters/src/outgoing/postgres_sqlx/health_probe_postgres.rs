use sqlx::PgPool;
use tracing::instrument;

use craftads_application::{error::AppResult, ports::outgoing::health::HealthProbePort};

use super::utils::PostgresExecutor;

pub struct PostgresHealthProbeAdapter {
    pool: PgPool,
    executor: PostgresExecutor,
}

impl PostgresHealthProbeAdapter {
    pub fn new(pool: PgPool, query_timeout_secs: u64) -> Self {
        Self {
            pool,
            executor: PostgresExecutor::new(query_timeout_secs),
        }
    }
}

#[async_trait::async_trait]
impl HealthProbePort for PostgresHealthProbeAdapter {
    #[instrument(skip(self))]
    async fn ping(&self) -> AppResult<()> {
        self.executor
            .execute_with_timeout(
                || sqlx::query("SELECT 1").execute(&self.pool),
                "Database ping failed",
            )
            .await?;
        Ok(())
    }
}
