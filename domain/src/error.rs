use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(i64),

    #[error("Transaction type '{0}' cannot be used for a credit")]
    DebitTypeForCredit(String),

    #[error("Unknown transaction type: {0}")]
    UnknownTransactionType(String),

    #[error("Unknown transaction status: {0}")]
    UnknownTransactionStatus(String),

    #[error("Unknown payment status: {0}")]
    UnknownPaymentStatus(String),

    #[error("Prompt template '{0}' not found")]
    UnknownPromptTemplate(String),

    #[error("Rating must be between 1 and 5, got {0}")]
    RatingOutOfRange(i16),
}
