//! The module contains the `Account` struct and its implementation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

/// What kind of holding an account represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Cash,
    Bank,
    Credit,
    Investment,
}

impl AccountKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Bank => "bank",
            Self::Credit => "credit",
            Self::Investment => "investment",
        }
    }
}

impl TryFrom<&str> for AccountKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "cash" => Ok(Self::Cash),
            "bank" => Ok(Self::Bank),
            "credit" => Ok(Self::Credit),
            "investment" => Ok(Self::Investment),
            other => Err(EngineError::UnknownKind(format!("account kind {other}"))),
        }
    }
}

/// A holding of money.
///
/// The balance is signed minor units: credit accounts routinely go negative.
/// Once loaded, the balance is kept equal to its initial value plus the
/// signed sum of the surviving transactions that reference the account.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Stable identifier assigned by the backend.
    pub id: Uuid,
    pub name: String,
    pub kind: AccountKind,
    pub balance_minor: i64,
    /// ISO currency code, e.g. `IDR`.
    pub currency: String,
}

/// Payload for creating an account; the backend assigns the id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewAccount {
    pub name: String,
    pub kind: AccountKind,
    pub balance_minor: i64,
    pub currency: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips() {
        for kind in [
            AccountKind::Cash,
            AccountKind::Bank,
            AccountKind::Credit,
            AccountKind::Investment,
        ] {
            assert_eq!(AccountKind::try_from(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = AccountKind::try_from("wallet").unwrap_err();
        assert_eq!(err, EngineError::UnknownKind("account kind wallet".into()));
    }
}
