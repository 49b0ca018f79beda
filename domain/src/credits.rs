use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::UserId;
use crate::error::DomainError;

pub const SIGNUP_BONUS_DESCRIPTION: &str = "Welcome bonus credits";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionType {
    Purchase,
    Usage,
    Refund,
    SignupBonus,
}

impl TransactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Purchase => "purchase",
            Self::Usage => "usage",
            Self::Refund => "refund",
            Self::SignupBonus => "signup_bonus",
        }
    }

    /// Whether entries of this type increase the balance.
    pub fn is_credit(self) -> bool {
        !matches!(self, Self::Usage)
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "purchase" => Ok(Self::Purchase),
            "usage" => Ok(Self::Usage),
            "refund" => Ok(Self::Refund),
            "signup_bonus" => Ok(Self::SignupBonus),
            other => Err(DomainError::UnknownTransactionType(other.to_string())),
        }
    }
}

/// Settlement state of a ledger row. Plain debits and credits are written
/// `Committed`; generation charges start `Pending` and end either
/// `Committed` or `Released`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionStatus {
    Pending,
    Committed,
    Released,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Committed => "committed",
            Self::Released => "released",
        }
    }
}

impl Display for TransactionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "committed" => Ok(Self::Committed),
            "released" => Ok(Self::Released),
            other => Err(DomainError::UnknownTransactionStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreditTransaction {
    pub id: Uuid,
    pub user_id: UserId,
    pub amount: i64,
    pub transaction_type: TransactionType,
    pub status: TransactionStatus,
    pub reference_id: Option<String>,
    pub reference_type: Option<String>,
    pub description: String,
    pub balance_after: i64,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Insufficient credits: required {required}, available {available}")]
pub struct InsufficientCreditsError {
    pub required: i64,
    pub available: i64,
}

/// A single balance change waiting to be applied to the ledger.
///
/// `id` becomes the ledger row's id. It is fixed when the mutation is built,
/// so applying the same mutation twice writes at most one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerMutation {
    pub id: Uuid,
    pub user_id: UserId,
    pub amount: i64,
    pub transaction_type: TransactionType,
    pub status: TransactionStatus,
    pub description: String,
    pub reference_id: Option<String>,
    pub reference_type: Option<String>,
}

impl LedgerMutation {
    pub fn debit(
        user_id: UserId,
        amount: i64,
        description: impl Into<String>,
    ) -> Result<Self, DomainError> {
        if amount <= 0 {
            return Err(DomainError::NonPositiveAmount(amount));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            amount: -amount,
            transaction_type: TransactionType::Usage,
            status: TransactionStatus::Committed,
            description: description.into(),
            reference_id: None,
            reference_type: None,
        })
    }

    pub fn credit(
        user_id: UserId,
        amount: i64,
        transaction_type: TransactionType,
        description: impl Into<String>,
    ) -> Result<Self, DomainError> {
        if amount <= 0 {
            return Err(DomainError::NonPositiveAmount(amount));
        }

        if !transaction_type.is_credit() {
            return Err(DomainError::DebitTypeForCredit(transaction_type.to_string()));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            amount,
            transaction_type,
            status: TransactionStatus::Committed,
            description: description.into(),
            reference_id: None,
            reference_type: None,
        })
    }

    #[must_use]
    pub fn with_reference(
        mut self,
        reference_id: Option<String>,
        reference_type: Option<String>,
    ) -> Self {
        self.reference_id = reference_id;
        self.reference_type = reference_type;
        self
    }

    #[must_use]
    pub fn pending(mut self) -> Self {
        self.status = TransactionStatus::Pending;
        self
    }

    /// Balance after this mutation, or the shortfall when it would go negative.
    pub fn apply_to(&self, balance: i64) -> Result<i64, InsufficientCreditsError> {
        let next = balance.saturating_add(self.amount);
        if next < 0 {
            return Err(InsufficientCreditsError {
                required: -self.amount,
                available: balance,
            });
        }
        Ok(next)
    }

    pub fn into_transaction(self, balance_after: i64, now: OffsetDateTime) -> CreditTransaction {
        CreditTransaction {
            id: self.id,
            user_id: self.user_id,
            amount: self.amount,
            transaction_type: self.transaction_type,
            status: self.status,
            reference_id: self.reference_id,
            reference_type: self.reference_type,
            description: self.description,
            balance_after,
            created_at: now,
        }
    }
}

/// Result of an applied mutation: the user's new balance and the row recording it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub new_balance: i64,
    pub transaction: CreditTransaction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreditAccount {
    pub user_id: UserId,
    pub balance: i64,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreditCheck {
    pub required: i64,
    pub available: i64,
    pub operation: String,
}

impl CreditCheck {
    pub fn is_sufficient(&self) -> bool {
        self.available >= self.required
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerChainError {
    #[error("Entry {index} records balance {recorded}, expected {expected}")]
    BrokenLink {
        index: usize,
        expected: i64,
        recorded: i64,
    },
    #[error("Entry {index} leaves a negative balance {balance}")]
    NegativeBalance { index: usize, balance: i64 },
}

/// Walks transactions in application order and checks every `balance_after`
/// against the running sum. Returns the closing balance.
pub fn verify_chain(
    opening_balance: i64,
    transactions: &[CreditTransaction],
) -> Result<i64, LedgerChainError> {
    transactions
        .iter()
        .enumerate()
        .try_fold(opening_balance, |running, (index, tx)| {
            let expected = running + tx.amount;
            if expected < 0 {
                return Err(LedgerChainError::NegativeBalance {
                    index,
                    balance: expected,
                });
            }
            if tx.balance_after != expected {
                return Err(LedgerChainError::BrokenLink {
                    index,
                    expected,
                    recorded: tx.balance_after,
                });
            }
            Ok(expected)
        })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreditPackage {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub credit_amount: i64,
    pub price_cents: i64,
    pub currency: String,
    pub is_active: bool,
    pub is_featured: bool,
    pub sort_order: i32,
}
