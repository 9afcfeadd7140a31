//! The module contains the `Budget` struct and its implementation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

/// The cadence a budget amount applies over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Weekly,
    Monthly,
    Yearly,
}

impl BudgetPeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl TryFrom<&str> for BudgetPeriod {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(EngineError::UnknownKind(format!("budget period {other}"))),
        }
    }
}

/// A spending cap for one category over a date range.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: Uuid,
    pub category_id: Uuid,
    pub amount_minor: i64,
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Budget {
    /// Whether the date falls inside the budget's range, bounds included.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Payload for creating a budget; the backend assigns the id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewBudget {
    pub category_id: Uuid,
    pub amount_minor: i64,
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn contains_is_inclusive() {
        let budget = Budget {
            id: Uuid::new_v4(),
            category_id: Uuid::new_v4(),
            amount_minor: 100_000,
            period: BudgetPeriod::Monthly,
            start_date: date(2025, 6, 1),
            end_date: date(2025, 6, 30),
        };
        assert!(budget.contains(date(2025, 6, 1)));
        assert!(budget.contains(date(2025, 6, 30)));
        assert!(!budget.contains(date(2025, 7, 1)));
    }
}
