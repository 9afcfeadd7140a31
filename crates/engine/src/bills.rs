//! The module contains the `Bill` struct and its implementation.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A recurring monthly obligation.
///
/// The due day is a day-of-month between 1 and 31; months shorter than the
/// due day clamp the occurrence to their last day.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub id: Uuid,
    pub name: String,
    pub amount_minor: i64,
    pub due_day: u32,
    /// Account the payment is drawn from.
    pub account_id: Uuid,
    pub category_id: Uuid,
    pub active: bool,
    pub last_paid: Option<NaiveDate>,
}

impl Bill {
    /// The next date the bill falls due, on or after `today`.
    pub fn next_occurrence(&self, today: NaiveDate) -> NaiveDate {
        let this_month = due_date_in(today.year(), today.month(), self.due_day);
        if this_month >= today {
            return this_month;
        }
        let (year, month) = if today.month() == 12 {
            (today.year() + 1, 1)
        } else {
            (today.year(), today.month() + 1)
        };
        due_date_in(year, month, self.due_day)
    }
}

/// Payload for creating a bill; the backend assigns the id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewBill {
    pub name: String,
    pub amount_minor: i64,
    pub due_day: u32,
    pub account_id: Uuid,
    pub category_id: Uuid,
    pub active: bool,
}

fn due_date_in(year: i32, month: u32, due_day: u32) -> NaiveDate {
    let day = due_day.min(days_in_month(year, month));
    // `day` is within the month by construction.
    NaiveDate::from_ymd_opt(year, month, day.max(1)).unwrap_or(NaiveDate::MIN)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match next.and_then(|d| d.pred_opt()) {
        Some(last) => last.day(),
        None => 28,
    }
}
