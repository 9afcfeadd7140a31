//! Row-to-domain conversions. Unknown enum strings surface as validation
//! errors instead of panics so a skewed schema cannot crash the client.

use api_types::rows::{AccountRow, BillRow, BudgetRow, CategoryRow, TransactionRow, UserRow};
use engine::{
    Account, AccountKind, BackendError, Bill, Budget, BudgetPeriod, Category, CategoryKind,
    Transaction, TransactionKind, User,
};

fn invalid(what: &str, err: engine::EngineError) -> BackendError {
    BackendError::Validation(format!("bad {what} row: {err}"))
}

pub fn account(row: AccountRow) -> Result<Account, BackendError> {
    Ok(Account {
        id: row.id,
        name: row.name,
        kind: AccountKind::try_from(row.kind.as_str()).map_err(|e| invalid("account", e))?,
        balance_minor: row.balance,
        currency: row.currency,
    })
}

pub fn category(row: CategoryRow) -> Result<Category, BackendError> {
    Ok(Category {
        id: row.id,
        name: row.name,
        kind: CategoryKind::try_from(row.kind.as_str()).map_err(|e| invalid("category", e))?,
        icon: row.icon,
        color: row.color,
    })
}

pub fn transaction(row: TransactionRow) -> Result<Transaction, BackendError> {
    Ok(Transaction {
        id: row.id,
        account_id: row.account_id,
        category_id: row.category_id,
        amount_minor: row.amount,
        description: row.description,
        date: row.date,
        kind: TransactionKind::try_from(row.kind.as_str())
            .map_err(|e| invalid("transaction", e))?,
        created_at: row.created_at,
    })
}

pub fn budget(row: BudgetRow) -> Result<Budget, BackendError> {
    Ok(Budget {
        id: row.id,
        category_id: row.category_id,
        amount_minor: row.amount,
        period: BudgetPeriod::try_from(row.period.as_str()).map_err(|e| invalid("budget", e))?,
        start_date: row.start_date,
        end_date: row.end_date,
    })
}

pub fn bill(row: BillRow) -> Result<Bill, BackendError> {
    Ok(Bill {
        id: row.id,
        name: row.name,
        amount_minor: row.amount,
        due_day: row.due_date,
        account_id: row.account_id,
        category_id: row.category_id,
        active: row.is_active,
        last_paid: row.last_paid_date,
    })
}

pub fn user(row: UserRow) -> User {
    User {
        id: row.id,
        name: row.name,
        email: row.email,
        created_at: row.created_at,
    }
}

pub fn collect<R, T>(
    rows: Vec<R>,
    f: impl Fn(R) -> Result<T, BackendError>,
) -> Result<Vec<T>, BackendError> {
    rows.into_iter().map(f).collect()
}
