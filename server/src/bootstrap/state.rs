use sqlx::{PgPool, postgres::PgPoolOptions};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use craftads_adapters::shared::app_state::AppState as AdaptersAppState;
use craftads_adapters::outgoing::{
    generation::{disabled_backend::DisabledGenerationBackend, mock_backend::MockGenerationBackend},
    postgres_sqlx::{
        credit_store_postgres::PostgresCreditStoreAdapter,
        gallery_store_postgres::PostgresGalleryStoreAdapter,
        generation_store_postgres::PostgresGenerationStoreAdapter,
        health_probe_postgres::PostgresHealthProbeAdapter,
        payment_store_postgres::PostgresPaymentStoreAdapter,
        user_store_postgres::PostgresUserStoreAdapter,
    },
    tokio_time::{
        TokioDelayAdapter, generation_timeout_tokio::TokioGenerationTimeoutAdapter,
        reservation_sweeper::spawn_reservation_sweeper,
    },
};
use craftads_application::error::AppError;
use craftads_application::infrastructure_config::{Config, GenerationBackendKind};
use craftads_application::ports::incoming::{
    auth::AuthUseCase, credits::CreditUseCase, gallery::GalleryUseCase,
    generation::GenerationUseCase, purchases::PurchaseUseCase,
};
use craftads_application::ports::outgoing::{
    delay::DynDelayPort, generation_backend::DynGenerationBackendPort,
    health::DynHealthProbePort, user_store::DynUserStorePort,
};
use craftads_application::{
    auth::service::AuthService,
    config::{
        CreditSettings, GallerySettings, GenerationSettings, PaymentSettings, ReservationSweep,
    },
    credits::service::CreditService,
    gallery::service::GalleryService,
    generation::service::GenerationService,
    purchases::service::PurchaseService,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    db_pool: PgPool,
    user_store: DynUserStorePort,
    pub auth_service: Arc<dyn AuthUseCase>,
    pub credit_service: Arc<dyn CreditUseCase>,
    pub purchase_service: Arc<dyn PurchaseUseCase>,
    pub generation_service: Arc<dyn GenerationUseCase>,
    pub gallery_service: Arc<dyn GalleryUseCase>,
    pub health_probe: DynHealthProbePort,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self, AppError> {
        let config = Arc::new(config);

        let db_pool = Self::create_database_pool(&config).await?;
        if config.db.run_migrations {
            Self::run_migrations(&db_pool).await?;
        }

        let timeout_secs = config.db.query_timeout_secs;
        let delay: DynDelayPort = Arc::new(TokioDelayAdapter::new());
        let user_store: DynUserStorePort =
            Arc::new(PostgresUserStoreAdapter::new(db_pool.clone(), timeout_secs));

        let credit_settings = CreditSettings::from(config.as_ref());
        let retry = credit_settings.retry;
        let auth_service: Arc<dyn AuthUseCase> = Arc::new(AuthService::new(
            Arc::clone(&user_store),
            credit_settings.signup_bonus,
        ));

        let credit_service: Arc<dyn CreditUseCase> = Arc::new(CreditService::new(
            Arc::new(PostgresCreditStoreAdapter::new(db_pool.clone(), timeout_secs)),
            Arc::clone(&delay),
            credit_settings,
        ));
        match ReservationSweep::from_config(&config) {
            Some(sweep) => spawn_reservation_sweeper(&credit_service, sweep),
            None => warn!("Stale reservation sweep is disabled"),
        }

        let purchase_service: Arc<dyn PurchaseUseCase> = Arc::new(PurchaseService::new(
            Arc::new(PostgresPaymentStoreAdapter::new(db_pool.clone(), timeout_secs)),
            delay,
            retry,
            PaymentSettings::from(config.as_ref()),
        ));

        let backend = Self::create_generation_backend(&config);
        let generation_service: Arc<dyn GenerationUseCase> = Arc::new(GenerationService::new(
            Arc::clone(&credit_service),
            Arc::clone(&backend),
            Arc::new(TokioGenerationTimeoutAdapter::new(backend)),
            Arc::new(PostgresGenerationStoreAdapter::new(
                db_pool.clone(),
                timeout_secs,
            )),
            GenerationSettings::from(config.as_ref()),
        ));

        let gallery_service: Arc<dyn GalleryUseCase> = Arc::new(GalleryService::new(
            Arc::new(PostgresGalleryStoreAdapter::new(db_pool.clone(), timeout_secs)),
            GallerySettings::from(config.as_ref()),
        ));

        let health_probe: DynHealthProbePort =
            Arc::new(PostgresHealthProbeAdapter::new(db_pool.clone(), timeout_secs));

        Ok(Self {
            config,
            db_pool,
            user_store,
            auth_service,
            credit_service,
            purchase_service,
            generation_service,
            gallery_service,
            health_probe,
        })
    }

    async fn create_database_pool(config: &Config) -> Result<PgPool, AppError> {
        PgPoolOptions::new()
            .max_connections(config.db.pool_size)
            .acquire_timeout(Duration::from_secs(config.db.query_timeout_secs))
            .connect(config.db.database_url())
            .await
            .map_err(|e| AppError::DatabaseError {
                message: format!("Failed to connect to database: {}", e),
            })
    }

    async fn run_migrations(db_pool: &PgPool) -> Result<(), AppError> {
        sqlx::migrate!("../migrations")
            .run(db_pool)
            .await
            .map_err(|e| AppError::DatabaseError {
                message: format!("Failed to run migrations: {}", e),
            })?;
        info!("Database migrations applied");
        Ok(())
    }

    fn create_generation_backend(config: &Config) -> DynGenerationBackendPort {
        match config.generation.backend {
            GenerationBackendKind::Mock => Arc::new(MockGenerationBackend::new(
                Duration::from_millis(config.generation.mock_delay_ms),
                config.generation.mock_failure_rate,
            )),
            GenerationBackendKind::Disabled => {
                warn!("Generation backend is disabled; /generate will refund and fail");
                Arc::new(DisabledGenerationBackend)
            }
        }
    }

    pub fn db_pool(&self) -> &PgPool {
        &self.db_pool
    }

    pub fn to_adapters_state(self) -> (AdaptersAppState, DynUserStorePort) {
        let adapters_state = AdaptersAppState {
            config: self.config,
            auth_use_case: self.auth_service,
            credit_use_case: self.credit_service,
            purchase_use_case: self.purchase_service,
            generation_use_case: self.generation_service,
            gallery_use_case: self.gallery_service,
            health_probe: self.health_probe,
        };

        (adapters_state, self.user_store)
    }
}
