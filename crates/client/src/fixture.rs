//! Seeded in-memory backend for development and tests.
//!
//! Accepts any credentials, serves one demo user and keeps all writes in
//! process memory. Useful when the hosted backend is not configured.

use std::sync::{Mutex, PoisonError};

use chrono::{NaiveDate, Utc};
use engine::{
    Account, AccountKind, Backend, BackendError, Bill, Budget, BudgetPeriod, Category,
    CategoryKind, NewAccount, NewBill, NewBudget, NewCategory, NewTransaction, Transaction,
    TransactionKind, User,
};
use tracing::info;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    user: Option<User>,
    known_emails: Vec<String>,
    accounts: Vec<Account>,
    categories: Vec<Category>,
    transactions: Vec<Transaction>,
    budgets: Vec<Budget>,
    bills: Vec<Bill>,
}

/// In-memory stand-in for the hosted backend.
#[derive(Default)]
pub struct FixtureBackend {
    tables: Mutex<Tables>,
}

impl FixtureBackend {
    /// An empty fixture.
    pub fn new() -> Self {
        Self::default()
    }

    /// A fixture pre-populated with a plausible month of demo data.
    pub fn seeded() -> Self {
        let fixture = Self::new();
        {
            let mut tables = fixture.lock();

            let checking = Account {
                id: Uuid::new_v4(),
                name: "Bank Account".into(),
                kind: AccountKind::Bank,
                balance_minor: 5_000_000,
                currency: "IDR".into(),
            };
            let cash = Account {
                id: Uuid::new_v4(),
                name: "Cash".into(),
                kind: AccountKind::Cash,
                balance_minor: 450_000,
                currency: "IDR".into(),
            };
            let savings = Account {
                id: Uuid::new_v4(),
                name: "Savings".into(),
                kind: AccountKind::Investment,
                balance_minor: 12_000_000,
                currency: "IDR".into(),
            };

            let salary = seed_category("Salary", CategoryKind::Income, "💰", "bg-emerald-500");
            let freelance = seed_category("Freelance", CategoryKind::Income, "💻", "bg-teal-500");
            let food = seed_category("Food & Drinks", CategoryKind::Expense, "🍜", "bg-orange-500");
            let transport = seed_category("Transportation", CategoryKind::Expense, "🚌", "bg-blue-500");
            let utilities = seed_category("Bills & Utilities", CategoryKind::Expense, "💡", "bg-yellow-500");
            let shopping = seed_category("Shopping", CategoryKind::Expense, "🛍️", "bg-pink-500");
            let health = seed_category("Healthcare", CategoryKind::Expense, "🏥", "bg-red-500");
            let fun = seed_category("Entertainment", CategoryKind::Expense, "🎬", "bg-purple-500");

            let june = |d| NaiveDate::from_ymd_opt(2025, 6, d);
            if let (Some(d1), Some(d3), Some(d5)) = (june(1), june(3), june(5)) {
                tables.transactions = vec![
                    seed_transaction(&cash, &food, 45_000, "Lunch", d5, TransactionKind::Expense),
                    seed_transaction(&checking, &transport, 120_000, "Fuel", d3, TransactionKind::Expense),
                    seed_transaction(&checking, &salary, 4_500_000, "Monthly salary", d1, TransactionKind::Income),
                ];
            }

            if let (Some(start), Some(end)) = (june(1), june(30)) {
                tables.budgets = vec![
                    Budget {
                        id: Uuid::new_v4(),
                        category_id: food.id,
                        amount_minor: 1_000_000,
                        period: BudgetPeriod::Monthly,
                        start_date: start,
                        end_date: end,
                    },
                    Budget {
                        id: Uuid::new_v4(),
                        category_id: fun.id,
                        amount_minor: 500_000,
                        period: BudgetPeriod::Monthly,
                        start_date: start,
                        end_date: end,
                    },
                ];
            }

            tables.bills = vec![
                Bill {
                    id: Uuid::new_v4(),
                    name: "Internet".into(),
                    amount_minor: 350_000,
                    due_day: 15,
                    account_id: checking.id,
                    category_id: utilities.id,
                    active: true,
                    last_paid: None,
                },
                Bill {
                    id: Uuid::new_v4(),
                    name: "Electricity".into(),
                    amount_minor: 200_000,
                    due_day: 20,
                    account_id: checking.id,
                    category_id: utilities.id,
                    active: true,
                    last_paid: None,
                },
                Bill {
                    id: Uuid::new_v4(),
                    name: "Water".into(),
                    amount_minor: 80_000,
                    due_day: 25,
                    account_id: checking.id,
                    category_id: utilities.id,
                    active: true,
                    last_paid: None,
                },
            ];

            tables.accounts = vec![checking, cash, savings];
            tables.categories = vec![
                salary, freelance, food, transport, utilities, shopping, health, fun,
            ];
        }
        fixture
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn demo_user(&self, email: &str, name: &str) -> User {
        let mut tables = self.lock();
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            created_at: Utc::now(),
        };
        tables.user = Some(user.clone());
        user
    }
}

fn seed_category(name: &str, kind: CategoryKind, icon: &str, color: &str) -> Category {
    Category {
        id: Uuid::new_v4(),
        name: name.into(),
        kind,
        icon: icon.into(),
        color: color.into(),
    }
}

fn seed_transaction(
    account: &Account,
    category: &Category,
    amount_minor: i64,
    description: &str,
    date: NaiveDate,
    kind: TransactionKind,
) -> Transaction {
    Transaction {
        id: Uuid::new_v4(),
        account_id: account.id,
        category_id: category.id,
        amount_minor,
        description: description.into(),
        date,
        kind,
        created_at: Utc::now(),
    }
}

impl Backend for FixtureBackend {
    async fn sign_up(
        &self,
        email: &str,
        _password: &str,
        name: &str,
    ) -> Result<User, BackendError> {
        {
            let mut tables = self.lock();
            if tables.known_emails.iter().any(|e| e == email) {
                return Err(BackendError::Conflict(format!(
                    "email {email} already registered"
                )));
            }
            tables.known_emails.push(email.to_string());
        }
        info!(email, "fixture sign-up");
        Ok(self.demo_user(email, name))
    }

    async fn sign_in(&self, email: &str, _password: &str) -> Result<User, BackendError> {
        info!(email, "fixture sign-in");
        Ok(self.demo_user(email, "Demo User"))
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        self.lock().user = None;
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<User>, BackendError> {
        Ok(self.lock().user.clone())
    }

    async fn accounts(&self, _owner: Uuid) -> Result<Vec<Account>, BackendError> {
        Ok(self.lock().accounts.clone())
    }

    async fn create_account(
        &self,
        _owner: Uuid,
        draft: &NewAccount,
    ) -> Result<Account, BackendError> {
        let account = Account {
            id: Uuid::new_v4(),
            name: draft.name.clone(),
            kind: draft.kind,
            balance_minor: draft.balance_minor,
            currency: draft.currency.clone(),
        };
        self.lock().accounts.push(account.clone());
        Ok(account)
    }

    async fn update_account(&self, account: &Account) -> Result<(), BackendError> {
        let mut tables = self.lock();
        match tables.accounts.iter_mut().find(|a| a.id == account.id) {
            Some(existing) => {
                *existing = account.clone();
                Ok(())
            }
            None => Err(BackendError::NotFound),
        }
    }

    async fn delete_account(&self, account_id: Uuid) -> Result<(), BackendError> {
        self.lock().accounts.retain(|a| a.id != account_id);
        Ok(())
    }

    async fn categories(&self) -> Result<Vec<Category>, BackendError> {
        Ok(self.lock().categories.clone())
    }

    async fn create_category(&self, draft: &NewCategory) -> Result<Category, BackendError> {
        let category = Category {
            id: Uuid::new_v4(),
            name: draft.name.clone(),
            kind: draft.kind,
            icon: draft.icon.clone(),
            color: draft.color.clone(),
        };
        self.lock().categories.push(category.clone());
        Ok(category)
    }

    async fn transactions(&self, _owner: Uuid) -> Result<Vec<Transaction>, BackendError> {
        let mut transactions = self.lock().transactions.clone();
        transactions.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        Ok(transactions)
    }

    async fn create_transaction(
        &self,
        _owner: Uuid,
        draft: &NewTransaction,
    ) -> Result<Transaction, BackendError> {
        let transaction = Transaction {
            id: Uuid::new_v4(),
            account_id: draft.account_id,
            category_id: draft.category_id,
            amount_minor: draft.amount_minor,
            description: draft.description.clone(),
            date: draft.date,
            kind: draft.kind,
            created_at: Utc::now(),
        };
        self.lock().transactions.push(transaction.clone());
        Ok(transaction)
    }

    async fn delete_transaction(&self, transaction_id: Uuid) -> Result<(), BackendError> {
        self.lock().transactions.retain(|t| t.id != transaction_id);
        Ok(())
    }

    async fn budgets(&self, _owner: Uuid) -> Result<Vec<Budget>, BackendError> {
        Ok(self.lock().budgets.clone())
    }

    async fn create_budget(
        &self,
        _owner: Uuid,
        draft: &NewBudget,
    ) -> Result<Budget, BackendError> {
        let budget = Budget {
            id: Uuid::new_v4(),
            category_id: draft.category_id,
            amount_minor: draft.amount_minor,
            period: draft.period,
            start_date: draft.start_date,
            end_date: draft.end_date,
        };
        self.lock().budgets.push(budget.clone());
        Ok(budget)
    }

    async fn bills(&self, _owner: Uuid) -> Result<Vec<Bill>, BackendError> {
        Ok(self.lock().bills.clone())
    }

    async fn create_bill(&self, _owner: Uuid, draft: &NewBill) -> Result<Bill, BackendError> {
        let bill = Bill {
            id: Uuid::new_v4(),
            name: draft.name.clone(),
            amount_minor: draft.amount_minor,
            due_day: draft.due_day,
            account_id: draft.account_id,
            category_id: draft.category_id,
            active: draft.active,
            last_paid: None,
        };
        self.lock().bills.push(bill.clone());
        Ok(bill)
    }

    async fn update_bill(&self, bill: &Bill) -> Result<(), BackendError> {
        let mut tables = self.lock();
        match tables.bills.iter_mut().find(|b| b.id == bill.id) {
            Some(existing) => {
                *existing = bill.clone();
                Ok(())
            }
            None => Err(BackendError::NotFound),
        }
    }

    async fn delete_bill(&self, bill_id: Uuid) -> Result<(), BackendError> {
        self.lock().bills.retain(|b| b.id != bill_id);
        Ok(())
    }
}
