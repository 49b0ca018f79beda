use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{debug, instrument};

use craftads_application::{
    error::{AppError, AppResult},
    ports::outgoing::generation_store::GenerationStorePort,
};
use domain::auth::UserId;
use domain::generation::{GenerationRecord, GenerationStatus};

use super::utils::{
    PostgresExecutor, begin_transaction, column, commit_transaction, db_error,
};

const GENERATION_COLUMNS: &str = "id, user_id, template_id, status, result_image_url, \
     ai_model, prompt, processing_time_ms, credits_used, created_at";

fn generation_from_row(row: &PgRow) -> AppResult<GenerationRecord> {
    let status: String = column(row, "status")?;
    let status = match status.as_str() {
        "completed" => GenerationStatus::Completed,
        "failed" => GenerationStatus::Failed,
        other => {
            return Err(AppError::DatabaseError {
                message: format!("Invalid status value '{}'", other),
            });
        }
    };

    Ok(GenerationRecord {
        id: column(row, "id")?,
        user_id: UserId::from_uuid(column(row, "user_id")?),
        template_id: column(row, "template_id")?,
        status,
        result_image_url: column(row, "result_image_url")?,
        ai_model: column(row, "ai_model")?,
        prompt: column(row, "prompt")?,
        processing_time_ms: column(row, "processing_time_ms")?,
        credits_used: column(row, "credits_used")?,
        created_at: column(row, "created_at")?,
    })
}

pub struct PostgresGenerationStoreAdapter {
    pool: PgPool,
    executor: PostgresExecutor,
}

impl PostgresGenerationStoreAdapter {
    pub fn new(pool: PgPool, query_timeout_secs: u64) -> Self {
        Self {
            pool,
            executor: PostgresExecutor::new(query_timeout_secs),
        }
    }

    async fn record_in_transaction(&self, record: &GenerationRecord) -> AppResult<()> {
        let mut tx = begin_transaction(&self.pool).await?;

        sqlx::query(
            r"
            INSERT INTO generations
                (id, user_id, template_id, status, result_image_url, ai_model, prompt,
                 processing_time_ms, credits_used, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(record.id)
        .bind(record.user_id.as_uuid())
        .bind(record.template_id)
        .bind(record.status.as_str())
        .bind(record.result_image_url.as_deref())
        .bind(record.ai_model.as_str())
        .bind(record.prompt.as_str())
        .bind(record.processing_time_ms)
        .bind(record.credits_used)
        .bind(record.created_at)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to insert generation"))?;

        if let (GenerationStatus::Completed, Some(template_id)) = (record.status, record.template_id)
        {
            sqlx::query("UPDATE ad_templates SET usage_count = usage_count + 1 WHERE id = $1")
                .bind(template_id)
                .execute(&mut *tx)
                .await
                .map_err(db_error("Failed to bump template usage"))?;
        }

        commit_transaction(tx).await
    }
}

#[async_trait::async_trait]
impl GenerationStorePort for PostgresGenerationStoreAdapter {
    #[instrument(skip(self, record), fields(generation_id = %record.id, user_id = %record.user_id))]
    async fn record_generation(&self, record: &GenerationRecord) -> AppResult<()> {
        self.executor
            .bound(
                self.record_in_transaction(record),
                "Failed to record generation",
            )
            .await?;

        debug!(
            "Recorded {} generation {}",
            record.status.as_str(),
            record.id
        );

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_generations(
        &self,
        user_id: &UserId,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<GenerationRecord>> {
        let sql = format!(
            "SELECT {GENERATION_COLUMNS} FROM generations WHERE user_id = $1 \
             ORDER BY created_at DESC, id LIMIT $2 OFFSET $3"
        );
        let rows = self
            .executor
            .execute_with_timeout(
                || {
                    sqlx::query(&sql)
                        .bind(user_id.as_uuid())
                        .bind(limit)
                        .bind(offset)
                        .fetch_all(&self.pool)
                },
                &format!("Failed to list generations for user {}", user_id),
            )
            .await?;

        rows.iter().map(generation_from_row).collect()
    }

    #[instrument(skip(self))]
    async fn count_generations(&self, user_id: &UserId) -> AppResult<i64> {
        let row = self
            .executor
            .execute_with_timeout(
                || {
                    sqlx::query("SELECT COUNT(*) AS total FROM generations WHERE user_id = $1")
                        .bind(user_id.as_uuid())
                        .fetch_one(&self.pool)
                },
                &format!("Failed to count generations for user {}", user_id),
            )
            .await?;

        row.try_get("total").map_err(|e| AppError::DatabaseError {
            message: format!("Failed to get total: {}", e),
        })
    }
}
