//! The module contains the `Transaction` struct and its implementation.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

/// The direction of a money movement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Applies the kind's sign to a positive amount: income counts toward an
    /// account balance, expense against it.
    pub fn signed(self, amount_minor: i64) -> i64 {
        match self {
            Self::Income => amount_minor,
            Self::Expense => -amount_minor,
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::UnknownKind(format!(
                "transaction kind {other}"
            ))),
        }
    }
}

/// A single recorded money movement.
///
/// Transactions are immutable once created; deletion is the only removal
/// path, and it reverses the transaction's effect on the owning account.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Stable identifier assigned by the backend.
    pub id: Uuid,
    pub account_id: Uuid,
    pub category_id: Uuid,
    /// Always positive; `kind` carries the sign.
    pub amount_minor: i64,
    pub description: String,
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// The amount with the kind's sign applied.
    pub fn signed_amount_minor(&self) -> i64 {
        self.kind.signed(self.amount_minor)
    }
}

/// Payload for recording a transaction; the backend assigns the id and the
/// creation timestamp.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub account_id: Uuid,
    pub category_id: Uuid,
    pub amount_minor: i64,
    pub description: String,
    pub date: NaiveDate,
    pub kind: TransactionKind,
}
