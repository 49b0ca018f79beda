use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub db: DbConfig,
    pub redis: RedisConfig,
    pub rate_limit: RateLimitConfig,
    pub credits: CreditConfig,
    pub generation: GenerationConfig,
    pub gallery: GalleryConfig,
    pub payments: PaymentConfig,
    pub logging: LoggingConfig,
    pub environment: EnvironmentConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub cookie_name: String,
    pub cookie_secure: bool,
    pub public_base_url: String,
    pub frontend_success_url: String,
    pub frontend_error_url: String,
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    pub google_redirect_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_url: SecretString,
    pub pool_size: u32,
    pub query_timeout_secs: u64,
    pub run_migrations: bool,
}

impl Serialize for DbConfig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("DbConfig", 4)?;
        state.serialize_field("database_url", "[REDACTED]")?;
        state.serialize_field("pool_size", &self.pool_size)?;
        state.serialize_field("query_timeout_secs", &self.query_timeout_secs)?;
        state.serialize_field("run_migrations", &self.run_migrations)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for DbConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct DbConfigHelper {
            database_url: String,
            pool_size: u32,
            query_timeout_secs: u64,
            run_migrations: bool,
        }

        let helper = DbConfigHelper::deserialize(deserializer)?;
        Ok(DbConfig {
            database_url: SecretString::from(helper.database_url),
            pool_size: helper.pool_size,
            query_timeout_secs: helper.query_timeout_secs,
            run_migrations: helper.run_migrations,
        })
    }
}

impl DbConfig {
    #[must_use]
    pub fn redacted_url(&self) -> String {
        let url_str = self.database_url.expose_secret();
        match url::Url::parse(url_str) {
            Ok(mut url) => {
                if url.password().is_some() {
                    url.set_password(Some("***")).ok();
                }
                url.to_string()
            }
            Err(_) => "[INVALID_URL]".to_string(),
        }
    }

    #[must_use]
    pub fn database_url(&self) -> &str {
        self.database_url.expose_secret()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    pub redis_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub global_requests_per_minute: u32,
    pub auth_requests_per_minute: u32,
    pub generation_requests_per_minute: u32,
    pub burst_size_multiplier: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditConfig {
    pub signup_bonus: i64,
    pub history_default_limit: u32,
    pub history_max_limit: u32,
    /// Extra attempts after the first when the store reports a transient failure.
    pub ledger_write_retries: u32,
    pub retry_backoff_ms: u64,
    /// Seconds between stale reservation sweeps; 0 turns the sweep off.
    pub reservation_sweep_secs: u64,
    /// How long past the generation timeout a reservation may stay pending.
    pub reservation_grace_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationBackendKind {
    #[serde(rename = "mock")]
    Mock,
    #[serde(rename = "disabled")]
    Disabled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub backend: GenerationBackendKind,
    pub mock_delay_ms: u64,
    pub mock_failure_rate: f64,
    pub timeout_secs: u64,
    pub history_default_limit: u32,
    pub history_max_limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryConfig {
    pub default_limit: u32,
    pub max_limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfig {
    pub provider: String,
    pub mock_payment_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub include_location: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LogFormat {
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "pretty")]
    Pretty,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            cookie_name: "sid".to_string(),
            cookie_secure: false,
            public_base_url: "http://localhost:3001".to_string(),
            frontend_success_url: "http://localhost:3000/".to_string(),
            frontend_error_url: "http://localhost:3000/login?error=auth_failed".to_string(),
            google_client_id: None,
            google_client_secret: None,
            google_redirect_url: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3001,
                cors_origin: None,
            },
            db: DbConfig {
                database_url: SecretString::from("postgresql://localhost/craftads"),
                pool_size: 10,
                query_timeout_secs: 5,
                run_migrations: true,
            },
            redis: RedisConfig {
                redis_url: "redis://localhost:6379".to_string(),
            },
            rate_limit: RateLimitConfig {
                enabled: true,
                global_requests_per_minute: 1000,
                auth_requests_per_minute: 30,
                generation_requests_per_minute: 10,
                burst_size_multiplier: 2,
            },
            credits: CreditConfig {
                signup_bonus: 10,
                history_default_limit: 20,
                history_max_limit: 100,
                ledger_write_retries: 2,
                retry_backoff_ms: 50,
                reservation_sweep_secs: 60,
                reservation_grace_secs: 60,
            },
            generation: GenerationConfig {
                backend: GenerationBackendKind::Mock,
                mock_delay_ms: 3000,
                mock_failure_rate: 0.1,
                timeout_secs: 30,
                history_default_limit: 8,
                history_max_limit: 100,
            },
            gallery: GalleryConfig {
                default_limit: 50,
                max_limit: 100,
            },
            payments: PaymentConfig {
                provider: "mock".to_string(),
                mock_payment_url: "/mock-payment".to_string(),
            },
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: LogFormat::Pretty,
                include_location: false,
            },
            environment: EnvironmentConfig {
                env: "development".to_string(),
            },
            auth: AuthConfig::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> AppResult<()> {
        if self.db.database_url.expose_secret().is_empty() {
            return Err(AppError::ConfigError {
                message: "database_url cannot be empty".to_string(),
            });
        }

        if self.db.pool_size == 0 {
            return Err(AppError::ConfigError {
                message: "db pool_size must be greater than 0".to_string(),
            });
        }

        if self.db.query_timeout_secs == 0 {
            return Err(AppError::ConfigError {
                message: "db query_timeout_secs must be greater than 0".to_string(),
            });
        }

        if self.redis.redis_url.is_empty() {
            return Err(AppError::ConfigError {
                message: "redis_url cannot be empty".to_string(),
            });
        }

        if self.rate_limit.enabled {
            if self.rate_limit.global_requests_per_minute == 0
                || self.rate_limit.auth_requests_per_minute == 0
                || self.rate_limit.generation_requests_per_minute == 0
            {
                return Err(AppError::ConfigError {
                    message: "Rate limit values must be greater than 0 when enabled".to_string(),
                });
            }

            if self.rate_limit.burst_size_multiplier == 0 {
                return Err(AppError::ConfigError {
                    message: "burst_size_multiplier must be greater than 0".to_string(),
                });
            }
        }

        if self.credits.signup_bonus < 0 {
            return Err(AppError::ConfigError {
                message: "signup_bonus must be greater than or equal to 0".to_string(),
            });
        }

        if self.credits.history_default_limit == 0
            || self.credits.history_default_limit > self.credits.history_max_limit
        {
            return Err(AppError::ConfigError {
                message: "credits history_default_limit must be between 1 and history_max_limit"
                    .to_string(),
            });
        }

        if !(0.0..=1.0).contains(&self.generation.mock_failure_rate) {
            return Err(AppError::ConfigError {
                message: "mock_failure_rate must be between 0 and 1".to_string(),
            });
        }

        if self.generation.timeout_secs == 0 {
            return Err(AppError::ConfigError {
                message: "generation timeout_secs must be greater than 0".to_string(),
            });
        }

        if self.generation.history_default_limit == 0
            || self.generation.history_default_limit > self.generation.history_max_limit
        {
            return Err(AppError::ConfigError {
                message:
                    "generation history_default_limit must be between 1 and history_max_limit"
                        .to_string(),
            });
        }

        if self.gallery.default_limit == 0 || self.gallery.default_limit > self.gallery.max_limit {
            return Err(AppError::ConfigError {
                message: "gallery default_limit must be between 1 and max_limit".to_string(),
            });
        }

        if self.payments.provider.trim().is_empty() {
            return Err(AppError::ConfigError {
                message: "payments provider cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    #[must_use]
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
