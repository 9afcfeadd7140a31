//! The module contains the `Category` struct and its implementation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

/// Whether a category classifies income or expenses.
///
/// A transaction's own kind is expected to match its category's kind, but the
/// store does not enforce it; the rule is left to the UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Income,
    Expense,
}

impl CategoryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl TryFrom<&str> for CategoryKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::UnknownKind(format!("category kind {other}"))),
        }
    }
}

/// A classification for transactions. Categories are global, not per user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub kind: CategoryKind,
    /// Emoji shown next to the name.
    pub icon: String,
    /// Color tag used by the UI, e.g. `bg-red-500`.
    pub color: String,
}

/// Payload for creating a category; the backend assigns the id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub kind: CategoryKind,
    pub icon: String,
    pub color: String,
}
