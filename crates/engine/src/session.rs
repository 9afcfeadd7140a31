//! The module contains the session gate, the single entry point for
//! authenticated reads and write-through mutations.

use chrono::NaiveDate;
use tracing::{info, warn};
use uuid::Uuid;

use crate::ResultEngine;
use crate::accounts::{Account, NewAccount};
use crate::backend::Backend;
use crate::bills::{Bill, NewBill};
use crate::budgets::{Budget, NewBudget};
use crate::categories::{Category, NewCategory};
use crate::error::EngineError;
use crate::store::{Snapshot, SnapshotPatch};
use crate::transactions::{NewTransaction, Transaction, TransactionKind};
use crate::users::User;

/// A signed-in user together with their loaded data.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub user: User,
    pub snapshot: Snapshot,
}

/// Front door of the engine. Holds at most one session and routes every
/// mutation through the backend before touching the snapshot.
///
/// Each write runs in three phases: validate against the snapshot, persist
/// through the backend, then apply to memory. A failure in the first two
/// phases leaves the snapshot exactly as it was.
pub struct Gate<B: Backend> {
    backend: B,
    session: Option<Session>,
}

impl<B: Backend> Gate<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            session: None,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn snapshot(&self) -> ResultEngine<&Snapshot> {
        Ok(&self.active()?.snapshot)
    }

    fn active(&self) -> ResultEngine<&Session> {
        self.session.as_ref().ok_or(EngineError::NoSession)
    }

    fn active_mut(&mut self) -> ResultEngine<&mut Session> {
        self.session.as_mut().ok_or(EngineError::NoSession)
    }

    /// Registers a new user, opens a session for them and loads their data.
    pub async fn sign_up(&mut self, email: &str, password: &str, name: &str) -> ResultEngine<User> {
        require(email, "email")?;
        require(password, "password")?;
        require(name, "name")?;
        let user = self.backend.sign_up(email, password, name).await?;
        info!(user = %user.id, "signed up");
        self.open(user).await
    }

    /// Authenticates an existing user, opens a session and loads their data.
    pub async fn sign_in(&mut self, email: &str, password: &str) -> ResultEngine<User> {
        require(email, "email")?;
        require(password, "password")?;
        let user = self.backend.sign_in(email, password).await?;
        info!(user = %user.id, "signed in");
        self.open(user).await
    }

    async fn open(&mut self, user: User) -> ResultEngine<User> {
        self.session = Some(Session {
            user: user.clone(),
            snapshot: Snapshot::default(),
        });
        self.refresh().await?;
        Ok(user)
    }

    /// Ends the session. The local session is dropped even when the remote
    /// sign-out fails, so a dead token can never pin stale data in memory.
    pub async fn sign_out(&mut self) -> ResultEngine<()> {
        self.active()?;
        let result = self.backend.sign_out().await;
        self.session = None;
        if let Err(ref err) = result {
            warn!(%err, "remote sign-out failed, session dropped anyway");
        }
        result.map_err(EngineError::from)
    }

    /// Reloads every collection from the backend into the snapshot.
    pub async fn refresh(&mut self) -> ResultEngine<()> {
        let owner = self.active()?.user.id;
        let accounts = self.backend.accounts(owner).await?;
        let categories = self.backend.categories().await?;
        let transactions = self.backend.transactions(owner).await?;
        let budgets = self.backend.budgets(owner).await?;
        let bills = self.backend.bills(owner).await?;
        self.active_mut()?.snapshot.apply(SnapshotPatch {
            accounts: Some(accounts),
            categories: Some(categories),
            transactions: Some(transactions),
            budgets: Some(budgets),
            bills: Some(bills),
        });
        Ok(())
    }

    pub async fn add_account(&mut self, draft: NewAccount) -> ResultEngine<Account> {
        let owner = self.active()?.user.id;
        require(&draft.name, "name")?;
        require(&draft.currency, "currency")?;
        let account = self.backend.create_account(owner, &draft).await?;
        self.active_mut()?.snapshot.add_account(account.clone());
        Ok(account)
    }

    pub async fn update_account(&mut self, account: Account) -> ResultEngine<()> {
        let session = self.active()?;
        if session.snapshot.account(account.id).is_none() {
            return Err(EngineError::KeyNotFound(account.id.to_string()));
        }
        require(&account.name, "name")?;
        self.backend.update_account(&account).await?;
        self.active_mut()?.snapshot.update_account(account)
    }

    pub async fn delete_account(&mut self, account_id: Uuid) -> ResultEngine<()> {
        self.active()?;
        self.backend.delete_account(account_id).await?;
        self.active_mut()?.snapshot.delete_account(account_id);
        Ok(())
    }

    pub async fn add_category(&mut self, draft: NewCategory) -> ResultEngine<Category> {
        self.active()?;
        require(&draft.name, "name")?;
        let category = self.backend.create_category(&draft).await?;
        self.active_mut()?.snapshot.add_category(category.clone());
        Ok(category)
    }

    pub async fn add_transaction(&mut self, draft: NewTransaction) -> ResultEngine<Transaction> {
        let session = self.active()?;
        if draft.amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(format!(
                "amount must be positive, got {}",
                draft.amount_minor
            )));
        }
        let account = session
            .snapshot
            .account(draft.account_id)
            .ok_or_else(|| EngineError::KeyNotFound(draft.account_id.to_string()))?
            .clone();
        let owner = session.user.id;
        let transaction = self.backend.create_transaction(owner, &draft).await?;
        self.persist_balance(account, transaction.signed_amount_minor())
            .await?;
        self.active_mut()?.snapshot.add_transaction(transaction.clone())?;
        Ok(transaction)
    }

    pub async fn delete_transaction(&mut self, transaction_id: Uuid) -> ResultEngine<()> {
        let session = self.active()?;
        let reversal = session
            .snapshot
            .transactions
            .iter()
            .find(|t| t.id == transaction_id)
            .and_then(|t| {
                session
                    .snapshot
                    .account(t.account_id)
                    .map(|a| (a.clone(), -t.signed_amount_minor()))
            });
        self.backend.delete_transaction(transaction_id).await?;
        if let Some((account, delta)) = reversal {
            self.persist_balance(account, delta).await?;
        }
        self.active_mut()?.snapshot.delete_transaction(transaction_id);
        Ok(())
    }

    /// Keeps the stored account balance in step with a transaction change.
    async fn persist_balance(&mut self, mut account: Account, delta_minor: i64) -> ResultEngine<()> {
        account.balance_minor += delta_minor;
        self.backend.update_account(&account).await?;
        Ok(())
    }

    pub async fn add_budget(&mut self, draft: NewBudget) -> ResultEngine<Budget> {
        let session = self.active()?;
        if draft.amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(format!(
                "amount must be positive, got {}",
                draft.amount_minor
            )));
        }
        if draft.end_date < draft.start_date {
            return Err(EngineError::InvalidDateRange(format!(
                "{} ends before it starts ({})",
                draft.end_date, draft.start_date
            )));
        }
        let owner = session.user.id;
        let budget = self.backend.create_budget(owner, &draft).await?;
        self.active_mut()?.snapshot.add_budget(budget.clone());
        Ok(budget)
    }

    pub async fn add_bill(&mut self, draft: NewBill) -> ResultEngine<Bill> {
        let session = self.active()?;
        require(&draft.name, "name")?;
        if draft.amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(format!(
                "amount must be positive, got {}",
                draft.amount_minor
            )));
        }
        if !(1..=31).contains(&draft.due_day) {
            return Err(EngineError::InvalidDateRange(format!(
                "due day must be between 1 and 31, got {}",
                draft.due_day
            )));
        }
        if session.snapshot.account(draft.account_id).is_none() {
            return Err(EngineError::KeyNotFound(draft.account_id.to_string()));
        }
        let owner = session.user.id;
        let bill = self.backend.create_bill(owner, &draft).await?;
        self.active_mut()?.snapshot.add_bill(bill.clone());
        Ok(bill)
    }

    pub async fn update_bill(&mut self, bill: Bill) -> ResultEngine<()> {
        let session = self.active()?;
        if session.snapshot.bill(bill.id).is_none() {
            return Err(EngineError::KeyNotFound(bill.id.to_string()));
        }
        self.backend.update_bill(&bill).await?;
        self.active_mut()?.snapshot.update_bill(bill)
    }

    pub async fn delete_bill(&mut self, bill_id: Uuid) -> ResultEngine<()> {
        self.active()?;
        self.backend.delete_bill(bill_id).await?;
        self.active_mut()?.snapshot.delete_bill(bill_id);
        Ok(())
    }

    /// Pays a bill: persists the matching expense transaction and the bill's
    /// new paid date, then applies both to the snapshot.
    pub async fn pay_bill(&mut self, bill_id: Uuid, paid_on: NaiveDate) -> ResultEngine<Transaction> {
        let session = self.active()?;
        let bill = session
            .snapshot
            .bill(bill_id)
            .ok_or_else(|| EngineError::KeyNotFound(bill_id.to_string()))?
            .clone();
        // A remotely-loaded bill can carry a bad amount; catch it before any
        // write leaves the process.
        if bill.amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(format!(
                "amount must be positive, got {}",
                bill.amount_minor
            )));
        }
        let account = session
            .snapshot
            .account(bill.account_id)
            .ok_or_else(|| EngineError::KeyNotFound(bill.account_id.to_string()))?
            .clone();

        let owner = session.user.id;
        let draft = NewTransaction {
            account_id: bill.account_id,
            category_id: bill.category_id,
            amount_minor: bill.amount_minor,
            description: format!("Payment for {}", bill.name),
            date: paid_on,
            kind: TransactionKind::Expense,
        };
        let transaction = self.backend.create_transaction(owner, &draft).await?;
        self.persist_balance(account, transaction.signed_amount_minor())
            .await?;

        let mut paid = bill;
        paid.last_paid = Some(paid_on);
        self.backend.update_bill(&paid).await?;

        let recorded = self.active_mut()?.snapshot.pay_bill(
            bill_id,
            transaction.id,
            paid_on,
            transaction.created_at,
        )?;
        info!(bill = %bill_id, transaction = %recorded.id, "bill paid");
        Ok(recorded)
    }

    /// Manual balance correction, persisted as an account update.
    pub async fn adjust_balance(&mut self, account_id: Uuid, delta_minor: i64) -> ResultEngine<i64> {
        let session = self.active()?;
        let mut account = session
            .snapshot
            .account(account_id)
            .ok_or_else(|| EngineError::KeyNotFound(account_id.to_string()))?
            .clone();
        account.balance_minor += delta_minor;
        self.backend.update_account(&account).await?;
        let new_balance = account.balance_minor;
        self.active_mut()?.snapshot.adjust_balance(account_id, delta_minor)?;
        Ok(new_balance)
    }
}

fn require(value: &str, field: &str) -> ResultEngine<()> {
    if value.trim().is_empty() {
        return Err(EngineError::MissingField(field.to_string()));
    }
    Ok(())
}
