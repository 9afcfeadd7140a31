//! Derived figures computed over a snapshot.
//!
//! Everything here is a pure read: the caller supplies `today` so the same
//! snapshot always yields the same numbers.

use chrono::{Days, Months, NaiveDate};
use uuid::Uuid;

use crate::bills::Bill;
use crate::budgets::Budget;
use crate::categories::CategoryKind;
use crate::store::Snapshot;
use crate::transactions::TransactionKind;

/// A rolling window ending at `today`, bounds included.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpendingPeriod {
    Week,
    Month,
    Year,
}

impl SpendingPeriod {
    /// The first day of the window.
    pub fn start_from(self, today: NaiveDate) -> NaiveDate {
        let start = match self {
            Self::Week => today.checked_sub_days(Days::new(7)),
            Self::Month => today.checked_sub_months(Months::new(1)),
            Self::Year => today.checked_sub_months(Months::new(12)),
        };
        start.unwrap_or(NaiveDate::MIN)
    }
}

/// How much of a budget has been consumed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BudgetUsage {
    pub spent_minor: i64,
    /// Negative once the budget is exceeded.
    pub remaining_minor: i64,
    /// Spent over budgeted, as a percentage. Can exceed 100.
    pub percent: f64,
}

/// Income and expense totals over a window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlowTotals {
    pub income_minor: i64,
    pub expense_minor: i64,
}

impl FlowTotals {
    pub fn net_minor(&self) -> i64 {
        self.income_minor - self.expense_minor
    }
}

/// Sum of all account balances.
pub fn total_balance(snapshot: &Snapshot) -> i64 {
    snapshot.accounts.iter().map(|a| a.balance_minor).sum()
}

/// Balance of one account, zero when the account does not exist.
pub fn account_balance(snapshot: &Snapshot, account_id: Uuid) -> i64 {
    snapshot
        .account(account_id)
        .map(|a| a.balance_minor)
        .unwrap_or(0)
}

/// Total expenses in a category, optionally limited to a rolling window.
pub fn category_spending(
    snapshot: &Snapshot,
    category_id: Uuid,
    period: Option<SpendingPeriod>,
    today: NaiveDate,
) -> i64 {
    let start = period.map(|p| p.start_from(today));
    snapshot
        .transactions
        .iter()
        .filter(|t| t.category_id == category_id && t.kind == TransactionKind::Expense)
        .filter(|t| match start {
            Some(start) => start <= t.date && t.date <= today,
            None => true,
        })
        .map(|t| t.amount_minor)
        .sum()
}

/// How much of a budget has been spent inside its own date range.
pub fn budget_usage(snapshot: &Snapshot, budget: &Budget) -> BudgetUsage {
    let spent_minor: i64 = snapshot
        .transactions
        .iter()
        .filter(|t| {
            t.category_id == budget.category_id
                && t.kind == TransactionKind::Expense
                && budget.contains(t.date)
        })
        .map(|t| t.amount_minor)
        .sum();
    let percent = if budget.amount_minor == 0 {
        0.0
    } else {
        spent_minor as f64 / budget.amount_minor as f64 * 100.0
    };
    BudgetUsage {
        spent_minor,
        remaining_minor: budget.amount_minor - spent_minor,
        percent,
    }
}

/// Active bills whose next occurrence falls within `window_days` of `today`,
/// soonest first.
pub fn upcoming_bills(snapshot: &Snapshot, window_days: u64, today: NaiveDate) -> Vec<&Bill> {
    let horizon = today
        .checked_add_days(Days::new(window_days))
        .unwrap_or(NaiveDate::MAX);
    let mut due: Vec<(&Bill, NaiveDate)> = snapshot
        .bills
        .iter()
        .filter(|b| b.active)
        .map(|b| (b, b.next_occurrence(today)))
        .filter(|(_, next)| *next <= horizon)
        .collect();
    due.sort_by_key(|(_, next)| *next);
    due.into_iter().map(|(bill, _)| bill).collect()
}

/// Income and expense totals over a rolling window.
pub fn flow_totals(snapshot: &Snapshot, period: SpendingPeriod, today: NaiveDate) -> FlowTotals {
    let start = period.start_from(today);
    let mut totals = FlowTotals::default();
    for t in &snapshot.transactions {
        if t.date < start || t.date > today {
            continue;
        }
        match t.kind {
            TransactionKind::Income => totals.income_minor += t.amount_minor,
            TransactionKind::Expense => totals.expense_minor += t.amount_minor,
        }
    }
    totals
}

/// Per-category totals for one flow direction over a rolling window, largest
/// first. Categories with no matching transactions are omitted.
pub fn totals_by_category(
    snapshot: &Snapshot,
    kind: CategoryKind,
    period: SpendingPeriod,
    today: NaiveDate,
) -> Vec<(Uuid, i64)> {
    let wanted = match kind {
        CategoryKind::Income => TransactionKind::Income,
        CategoryKind::Expense => TransactionKind::Expense,
    };
    let start = period.start_from(today);
    let mut totals: Vec<(Uuid, i64)> = Vec::new();
    for t in &snapshot.transactions {
        if t.kind != wanted || t.date < start || t.date > today {
            continue;
        }
        match totals.iter_mut().find(|(id, _)| *id == t.category_id) {
            Some((_, total)) => *total += t.amount_minor,
            None => totals.push((t.category_id, t.amount_minor)),
        }
    }
    totals.sort_by(|a, b| b.1.cmp(&a.1));
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::{Account, AccountKind};
    use crate::budgets::BudgetPeriod;
    use crate::transactions::Transaction;
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn account(balance_minor: i64) -> Account {
        Account {
            id: Uuid::new_v4(),
            name: "Checking".into(),
            kind: AccountKind::Bank,
            balance_minor,
            currency: "IDR".into(),
        }
    }

    fn tx(
        account_id: Uuid,
        category_id: Uuid,
        amount_minor: i64,
        on: NaiveDate,
        kind: TransactionKind,
    ) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            account_id,
            category_id,
            amount_minor,
            description: String::new(),
            date: on,
            kind,
            created_at: Utc::now(),
        }
    }

    fn bill(name: &str, due_day: u32, active: bool) -> Bill {
        Bill {
            id: Uuid::new_v4(),
            name: name.into(),
            amount_minor: 10_000,
            due_day,
            account_id: Uuid::new_v4(),
            category_id: Uuid::new_v4(),
            active,
            last_paid: None,
        }
    }

    #[test]
    fn total_and_account_balances() {
        let mut snapshot = Snapshot::default();
        let a = account(300_000);
        let a_id = a.id;
        snapshot.add_account(a);
        snapshot.add_account(account(-50_000));

        assert_eq!(total_balance(&snapshot), 250_000);
        assert_eq!(account_balance(&snapshot, a_id), 300_000);
        assert_eq!(account_balance(&snapshot, Uuid::new_v4()), 0);
    }

    #[test]
    fn category_spending_honors_the_window() {
        let mut snapshot = Snapshot::default();
        let account = account(1_000_000);
        let account_id = account.id;
        snapshot.add_account(account);
        let groceries = Uuid::new_v4();
        let today = date(2025, 6, 15);

        for (amount, on) in [
            (10_000, date(2025, 6, 14)),
            (20_000, date(2025, 6, 1)),
            (40_000, date(2024, 12, 1)),
        ] {
            snapshot
                .add_transaction(tx(account_id, groceries, amount, on, TransactionKind::Expense))
                .unwrap();
        }
        // Income in the same category never counts as spending.
        snapshot
            .add_transaction(tx(account_id, groceries, 99_000, today, TransactionKind::Income))
            .unwrap();

        assert_eq!(
            category_spending(&snapshot, groceries, Some(SpendingPeriod::Week), today),
            10_000
        );
        assert_eq!(
            category_spending(&snapshot, groceries, Some(SpendingPeriod::Month), today),
            30_000
        );
        assert_eq!(
            category_spending(&snapshot, groceries, Some(SpendingPeriod::Year), today),
            70_000
        );
        assert_eq!(category_spending(&snapshot, groceries, None, today), 70_000);
    }

    #[test]
    fn budget_usage_can_exceed_the_cap() {
        let mut snapshot = Snapshot::default();
        let account = account(1_000_000);
        let account_id = account.id;
        snapshot.add_account(account);
        let category_id = Uuid::new_v4();
        snapshot
            .add_transaction(tx(
                account_id,
                category_id,
                150_000,
                date(2025, 6, 10),
                TransactionKind::Expense,
            ))
            .unwrap();

        let budget = Budget {
            id: Uuid::new_v4(),
            category_id,
            amount_minor: 100_000,
            period: BudgetPeriod::Monthly,
            start_date: date(2025, 6, 1),
            end_date: date(2025, 6, 30),
        };
        let usage = budget_usage(&snapshot, &budget);
        assert_eq!(usage.spent_minor, 150_000);
        assert_eq!(usage.remaining_minor, -50_000);
        assert!((usage.percent - 150.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_amount_budget_reports_zero_percent() {
        let snapshot = Snapshot::default();
        let budget = Budget {
            id: Uuid::new_v4(),
            category_id: Uuid::new_v4(),
            amount_minor: 0,
            period: BudgetPeriod::Monthly,
            start_date: date(2025, 6, 1),
            end_date: date(2025, 6, 30),
        };
        let usage = budget_usage(&snapshot, &budget);
        assert_eq!(usage.percent, 0.0);
        assert_eq!(usage.remaining_minor, 0);
    }

    #[test]
    fn upcoming_bills_sorted_and_filtered() {
        let mut snapshot = Snapshot::default();
        let today = date(2025, 6, 10);
        let soon = bill("Internet", 12, true);
        let later = bill("Rent", 25, true);
        let inactive = bill("Gym", 11, false);
        let far = bill("Insurance", 9, true); // rolls to July 9

        let soon_id = soon.id;
        let later_id = later.id;
        snapshot.add_bill(later.clone());
        snapshot.add_bill(soon);
        snapshot.add_bill(inactive);
        snapshot.add_bill(far);

        let due: Vec<Uuid> = upcoming_bills(&snapshot, 15, today)
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(due, vec![soon_id, later_id]);
    }

    #[test]
    fn bill_due_on_the_horizon_is_included() {
        let mut snapshot = Snapshot::default();
        let today = date(2025, 6, 10);
        snapshot.add_bill(bill("Internet", 17, true));
        assert_eq!(upcoming_bills(&snapshot, 7, today).len(), 1);
        assert_eq!(upcoming_bills(&snapshot, 6, today).len(), 0);
    }

    #[test]
    fn flow_totals_and_net() {
        let mut snapshot = Snapshot::default();
        let account = account(0);
        let account_id = account.id;
        snapshot.add_account(account);
        let today = date(2025, 6, 15);

        snapshot
            .add_transaction(tx(
                account_id,
                Uuid::new_v4(),
                500_000,
                date(2025, 6, 1),
                TransactionKind::Income,
            ))
            .unwrap();
        snapshot
            .add_transaction(tx(
                account_id,
                Uuid::new_v4(),
                120_000,
                date(2025, 6, 5),
                TransactionKind::Expense,
            ))
            .unwrap();
        // Outside the month window.
        snapshot
            .add_transaction(tx(
                account_id,
                Uuid::new_v4(),
                999_000,
                date(2025, 4, 1),
                TransactionKind::Expense,
            ))
            .unwrap();

        let totals = flow_totals(&snapshot, SpendingPeriod::Month, today);
        assert_eq!(totals.income_minor, 500_000);
        assert_eq!(totals.expense_minor, 120_000);
        assert_eq!(totals.net_minor(), 380_000);
    }

    #[test]
    fn totals_by_category_sorted_desc() {
        let mut snapshot = Snapshot::default();
        let account = account(0);
        let account_id = account.id;
        snapshot.add_account(account);
        let today = date(2025, 6, 15);
        let food = Uuid::new_v4();
        let transport = Uuid::new_v4();

        for (category, amount) in [(food, 30_000), (transport, 80_000), (food, 20_000)] {
            snapshot
                .add_transaction(tx(
                    account_id,
                    category,
                    amount,
                    date(2025, 6, 10),
                    TransactionKind::Expense,
                ))
                .unwrap();
        }

        let totals = totals_by_category(&snapshot, CategoryKind::Expense, SpendingPeriod::Month, today);
        assert_eq!(totals, vec![(transport, 80_000), (food, 50_000)]);

        let income = totals_by_category(&snapshot, CategoryKind::Income, SpendingPeriod::Month, today);
        assert!(income.is_empty());
    }
}
