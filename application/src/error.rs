use thiserror::Error;

use domain::credits::InsufficientCreditsError;
use domain::error::DomainError;
use domain::payment::PaymentTransitionError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Missing required input: {message}")]
    MissingInput { message: String },

    #[error("Insufficient credits: required {required}, available {available}")]
    InsufficientCredits { required: i64, available: i64 },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Ledger write failed: {message}")]
    LedgerWriteFailed { message: String },

    #[error("Generation failed: {message}")]
    UpstreamGenerationFailure { message: String },

    #[error("Generation timed out")]
    GenerationTimeout,

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Database error: {message}")]
    DatabaseError { message: String },

    /// The database could not be reached or aborted the statement for a
    /// reason unrelated to the data, such as a deadlock or a lost connection.
    #[error("Storage unavailable: {message}")]
    StorageUnavailable { message: String },

    #[error("Cache error: {message}")]
    CacheError { message: String },

    #[error("Internal server error")]
    InternalServerError,

    #[error("External service error: {message}")]
    ExternalServiceError { message: String },

    #[error("Service unavailable")]
    ServiceUnavailable,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,
}

impl AppError {
    /// Failures worth retrying. Constraint violations and other data errors
    /// stay `DatabaseError` and are never retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::StorageUnavailable { .. })
    }
}

impl From<InsufficientCreditsError> for AppError {
    fn from(err: InsufficientCreditsError) -> Self {
        Self::InsufficientCredits {
            required: err.required,
            available: err.available,
        }
    }
}

impl From<PaymentTransitionError> for AppError {
    fn from(err: PaymentTransitionError) -> Self {
        Self::ValidationError {
            message: err.to_string(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_unavailable_storage_is_transient() {
        assert!(
            AppError::StorageUnavailable {
                message: "connection reset".to_string()
            }
            .is_transient()
        );
        assert!(
            !AppError::DatabaseError {
                message: "violates check constraint \"credits_balance_non_negative\"".to_string()
            }
            .is_transient()
        );
        assert!(
            !AppError::InsufficientCredits {
                required: 1,
                available: 0
            }
            .is_transient()
        );
        assert!(
            !AppError::NotFound {
                message: "User not found".to_string()
            }
            .is_transient()
        );
    }

    #[test]
    fn shortfall_keeps_both_amounts() {
        let err: AppError = InsufficientCreditsError {
            required: 5,
            available: 2,
        }
        .into();
        assert!(matches!(
            err,
            AppError::InsufficientCredits {
                required: 5,
                available: 2
            }
        ));
    }
}
