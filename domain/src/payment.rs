use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::UserId;
use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Completed | Self::Failed)
        )
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(DomainError::UnknownPaymentStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Payment cannot move from {from} to {to}")]
pub struct PaymentTransitionError {
    pub from: PaymentStatus,
    pub to: PaymentStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    pub id: Uuid,
    pub user_id: UserId,
    pub package_id: Uuid,
    pub provider: String,
    pub provider_payment_id: Option<String>,
    pub amount_cents: i64,
    pub currency: String,
    pub status: PaymentStatus,
    pub credits_purchased: i64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Payment {
    pub fn transition(&mut self, next: PaymentStatus) -> Result<(), PaymentTransitionError> {
        if !self.status.can_transition_to(next) {
            return Err(PaymentTransitionError {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = OffsetDateTime::now_utc();
        Ok(())
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        self.user_id == *user_id
    }
}

/// Final outcome reported by the payment provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    Completed,
    Failed,
}

impl PaymentOutcome {
    pub fn target_status(self) -> PaymentStatus {
        match self {
            Self::Completed => PaymentStatus::Completed,
            Self::Failed => PaymentStatus::Failed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseSession {
    pub payment_id: Uuid,
    pub status: PaymentStatus,
    pub redirect_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending_payment() -> Payment {
        let now = OffsetDateTime::now_utc();
        Payment {
            id: Uuid::new_v4(),
            user_id: UserId::new(),
            package_id: Uuid::new_v4(),
            provider: "mock".to_string(),
            provider_payment_id: None,
            amount_cents: 999,
            currency: "USD".to_string(),
            status: PaymentStatus::Pending,
            credits_purchased: 100,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn pending_moves_to_terminal_states() {
        let mut completed = pending_payment();
        assert!(completed.transition(PaymentStatus::Completed).is_ok());

        let mut failed = pending_payment();
        assert!(failed.transition(PaymentStatus::Failed).is_ok());
    }

    #[test]
    fn terminal_states_are_final() {
        let mut payment = pending_payment();
        payment.transition(PaymentStatus::Completed).unwrap();

        let err = payment.transition(PaymentStatus::Completed).unwrap_err();
        assert_eq!(err.from, PaymentStatus::Completed);
        assert!(payment.transition(PaymentStatus::Pending).is_err());
        assert!(payment.transition(PaymentStatus::Failed).is_err());
    }

    #[test]
    fn ownership_is_checked_by_user_id() {
        let payment = pending_payment();
        assert!(payment.is_owned_by(&payment.user_id));
        assert!(!payment.is_owned_by(&UserId::new()));
    }
}
