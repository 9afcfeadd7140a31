//! The module contains the in-memory snapshot of a user's data and the
//! mutations that keep it consistent.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ResultEngine;
use crate::accounts::Account;
use crate::bills::Bill;
use crate::budgets::Budget;
use crate::categories::Category;
use crate::error::EngineError;
use crate::transactions::{Transaction, TransactionKind};

/// All domain data for one user, held in memory.
///
/// The snapshot is the single source of truth for reads. Mutations validate
/// first and leave the snapshot untouched on error; on success the account
/// balances and the transaction list stay mutually consistent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub accounts: Vec<Account>,
    pub categories: Vec<Category>,
    /// Newest first.
    pub transactions: Vec<Transaction>,
    pub budgets: Vec<Budget>,
    pub bills: Vec<Bill>,
}

/// A partial replacement for the snapshot. `None` fields are left as they
/// are, so a refresh can update any subset of the collections.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SnapshotPatch {
    pub accounts: Option<Vec<Account>>,
    pub categories: Option<Vec<Category>>,
    pub transactions: Option<Vec<Transaction>>,
    pub budgets: Option<Vec<Budget>>,
    pub bills: Option<Vec<Bill>>,
}

impl Snapshot {
    /// Replaces the collections the patch carries, keeping the rest.
    pub fn apply(&mut self, patch: SnapshotPatch) {
        if let Some(accounts) = patch.accounts {
            self.accounts = accounts;
        }
        if let Some(categories) = patch.categories {
            self.categories = categories;
        }
        if let Some(transactions) = patch.transactions {
            self.transactions = transactions;
        }
        if let Some(budgets) = patch.budgets {
            self.budgets = budgets;
        }
        if let Some(bills) = patch.bills {
            self.bills = bills;
        }
    }

    pub fn account(&self, account_id: Uuid) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == account_id)
    }

    fn account_mut(&mut self, account_id: Uuid) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|a| a.id == account_id)
    }

    pub fn category(&self, category_id: Uuid) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == category_id)
    }

    pub fn bill(&self, bill_id: Uuid) -> Option<&Bill> {
        self.bills.iter().find(|b| b.id == bill_id)
    }

    pub fn add_account(&mut self, account: Account) {
        self.accounts.push(account);
    }

    /// Replaces the account with the same id.
    pub fn update_account(&mut self, account: Account) -> ResultEngine<()> {
        match self.account_mut(account.id) {
            Some(existing) => {
                *existing = account;
                Ok(())
            }
            None => Err(EngineError::KeyNotFound(account.id.to_string())),
        }
    }

    /// Removes the account. Transactions that reference it are kept; they
    /// remain visible in history and in category spending.
    pub fn delete_account(&mut self, account_id: Uuid) {
        self.accounts.retain(|a| a.id != account_id);
    }

    pub fn add_category(&mut self, category: Category) {
        self.categories.push(category);
    }

    /// Records a transaction and adjusts the owning account's balance by the
    /// signed amount. The transaction lands at the front of the list.
    pub fn add_transaction(&mut self, transaction: Transaction) -> ResultEngine<()> {
        if transaction.amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(format!(
                "amount must be positive, got {}",
                transaction.amount_minor
            )));
        }
        let delta = transaction.signed_amount_minor();
        let account = self
            .account_mut(transaction.account_id)
            .ok_or_else(|| EngineError::KeyNotFound(transaction.account_id.to_string()))?;
        account.balance_minor += delta;
        self.transactions.insert(0, transaction);
        Ok(())
    }

    /// Removes a transaction and reverses its effect on the account balance.
    /// Unknown ids are a no-op; a missing account skips the balance reversal.
    pub fn delete_transaction(&mut self, transaction_id: Uuid) {
        let Some(position) = self.transactions.iter().position(|t| t.id == transaction_id)
        else {
            return;
        };
        let transaction = self.transactions.remove(position);
        if let Some(account) = self.account_mut(transaction.account_id) {
            account.balance_minor -= transaction.signed_amount_minor();
        }
    }

    pub fn add_budget(&mut self, budget: Budget) {
        self.budgets.push(budget);
    }

    pub fn add_bill(&mut self, bill: Bill) {
        self.bills.push(bill);
    }

    /// Replaces the bill with the same id.
    pub fn update_bill(&mut self, bill: Bill) -> ResultEngine<()> {
        match self.bills.iter_mut().find(|b| b.id == bill.id) {
            Some(existing) => {
                *existing = bill;
                Ok(())
            }
            None => Err(EngineError::KeyNotFound(bill.id.to_string())),
        }
    }

    /// Removes the bill. Unknown ids are a no-op.
    pub fn delete_bill(&mut self, bill_id: Uuid) {
        self.bills.retain(|b| b.id != bill_id);
    }

    /// Marks a bill paid on `paid_on` and records the matching expense
    /// transaction against the bill's account.
    ///
    /// Validation happens before any change: an unknown bill or an unknown
    /// payment account leaves the snapshot as it was.
    pub fn pay_bill(
        &mut self,
        bill_id: Uuid,
        transaction_id: Uuid,
        paid_on: NaiveDate,
        recorded_at: DateTime<Utc>,
    ) -> ResultEngine<Transaction> {
        let bill = self
            .bill(bill_id)
            .ok_or_else(|| EngineError::KeyNotFound(bill_id.to_string()))?
            .clone();
        if self.account(bill.account_id).is_none() {
            return Err(EngineError::KeyNotFound(bill.account_id.to_string()));
        }

        let transaction = Transaction {
            id: transaction_id,
            account_id: bill.account_id,
            category_id: bill.category_id,
            amount_minor: bill.amount_minor,
            description: format!("Payment for {}", bill.name),
            date: paid_on,
            kind: TransactionKind::Expense,
            created_at: recorded_at,
        };
        self.add_transaction(transaction.clone())?;

        if let Some(existing) = self.bills.iter_mut().find(|b| b.id == bill_id) {
            existing.last_paid = Some(paid_on);
        }
        Ok(transaction)
    }

    /// Shifts an account balance by a signed delta, outside of any
    /// transaction. Manual-correction escape hatch: the balance will no
    /// longer equal the signed sum of the account's transactions.
    pub fn adjust_balance(&mut self, account_id: Uuid, delta_minor: i64) -> ResultEngine<()> {
        let account = self
            .account_mut(account_id)
            .ok_or_else(|| EngineError::KeyNotFound(account_id.to_string()))?;
        account.balance_minor += delta_minor;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::AccountKind;
    use crate::categories::CategoryKind;

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

    fn category(kind: CategoryKind) -> Category {
        Category {
            id: Uuid::new_v4(),
            name: "Groceries".into(),
            kind,
            icon: "🛒".into(),
            color: "bg-green-500".into(),
        }
    }

    fn expense(account_id: Uuid, category_id: Uuid, amount_minor: i64) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            account_id,
            category_id,
            amount_minor,
            description: "Weekly shop".into(),
            date: date(2025, 6, 10),
            kind: TransactionKind::Expense,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn expense_lowers_the_balance_and_prepends() {
        let mut snapshot = Snapshot::default();
        let account = account(1_000_000);
        let account_id = account.id;
        let category = category(CategoryKind::Expense);
        let category_id = category.id;
        snapshot.add_account(account);
        snapshot.add_category(category);

        let first = expense(account_id, category_id, 200_000);
        let second = expense(account_id, category_id, 50_000);
        snapshot.add_transaction(first.clone()).unwrap();
        snapshot.add_transaction(second.clone()).unwrap();

        assert_eq!(snapshot.account(account_id).unwrap().balance_minor, 750_000);
        assert_eq!(snapshot.transactions[0].id, second.id);
        assert_eq!(snapshot.transactions[1].id, first.id);
    }

    #[test]
    fn income_raises_the_balance() {
        let mut snapshot = Snapshot::default();
        let account = account(100_000);
        let account_id = account.id;
        snapshot.add_account(account);

        let mut tx = expense(account_id, Uuid::new_v4(), 400_000);
        tx.kind = TransactionKind::Income;
        snapshot.add_transaction(tx).unwrap();

        assert_eq!(snapshot.account(account_id).unwrap().balance_minor, 500_000);
    }

    #[test]
    fn rejects_non_positive_amounts() {
        let mut snapshot = Snapshot::default();
        let account = account(0);
        let account_id = account.id;
        snapshot.add_account(account);

        for amount in [0, -500] {
            let err = snapshot
                .add_transaction(expense(account_id, Uuid::new_v4(), amount))
                .unwrap_err();
            assert!(matches!(err, EngineError::InvalidAmount(_)));
        }
        assert!(snapshot.transactions.is_empty());
    }

    #[test]
    fn rejects_unknown_account() {
        let mut snapshot = Snapshot::default();
        let missing = Uuid::new_v4();
        let err = snapshot
            .add_transaction(expense(missing, Uuid::new_v4(), 1_000))
            .unwrap_err();
        assert_eq!(err, EngineError::KeyNotFound(missing.to_string()));
    }

    #[test]
    fn delete_transaction_reverses_the_balance() {
        let mut snapshot = Snapshot::default();
        let account = account(1_000_000);
        let account_id = account.id;
        snapshot.add_account(account);

        let tx = expense(account_id, Uuid::new_v4(), 200_000);
        let tx_id = tx.id;
        snapshot.add_transaction(tx).unwrap();
        assert_eq!(snapshot.account(account_id).unwrap().balance_minor, 800_000);

        snapshot.delete_transaction(tx_id);
        assert_eq!(snapshot.account(account_id).unwrap().balance_minor, 1_000_000);
        assert!(snapshot.transactions.is_empty());

        // Deleting again is a no-op.
        snapshot.delete_transaction(tx_id);
        assert_eq!(snapshot.account(account_id).unwrap().balance_minor, 1_000_000);
    }

    #[test]
    fn pay_bill_records_the_expense_and_marks_the_bill() {
        let mut snapshot = Snapshot::default();
        let account = account(500_000);
        let account_id = account.id;
        snapshot.add_account(account);
        let bill = Bill {
            id: Uuid::new_v4(),
            name: "Internet".into(),
            amount_minor: 50_000,
            due_day: 15,
            account_id,
            category_id: Uuid::new_v4(),
            active: true,
            last_paid: None,
        };
        let bill_id = bill.id;
        snapshot.add_bill(bill);

        let tx_id = Uuid::new_v4();
        let paid_on = date(2025, 6, 15);
        let tx = snapshot
            .pay_bill(bill_id, tx_id, paid_on, Utc::now())
            .unwrap();

        assert_eq!(tx.id, tx_id);
        assert_eq!(tx.amount_minor, 50_000);
        assert_eq!(tx.kind, TransactionKind::Expense);
        assert_eq!(tx.description, "Payment for Internet");
        assert_eq!(snapshot.account(account_id).unwrap().balance_minor, 450_000);
        assert_eq!(snapshot.transactions[0].id, tx_id);
        assert_eq!(snapshot.bill(bill_id).unwrap().last_paid, Some(paid_on));
    }

    #[test]
    fn pay_bill_with_missing_account_changes_nothing() {
        let mut snapshot = Snapshot::default();
        let bill = Bill {
            id: Uuid::new_v4(),
            name: "Rent".into(),
            amount_minor: 900_000,
            due_day: 1,
            account_id: Uuid::new_v4(),
            category_id: Uuid::new_v4(),
            active: true,
            last_paid: None,
        };
        let bill_id = bill.id;
        snapshot.add_bill(bill);

        let err = snapshot
            .pay_bill(bill_id, Uuid::new_v4(), date(2025, 6, 1), Utc::now())
            .unwrap_err();
        assert!(matches!(err, EngineError::KeyNotFound(_)));
        assert!(snapshot.transactions.is_empty());
        assert_eq!(snapshot.bill(bill_id).unwrap().last_paid, None);
    }

    #[test]
    fn update_and_delete_bill() {
        let mut snapshot = Snapshot::default();
        let bill = Bill {
            id: Uuid::new_v4(),
            name: "Gym".into(),
            amount_minor: 30_000,
            due_day: 5,
            account_id: Uuid::new_v4(),
            category_id: Uuid::new_v4(),
            active: true,
            last_paid: None,
        };
        let bill_id = bill.id;
        snapshot.add_bill(bill.clone());

        let mut updated = bill;
        updated.active = false;
        snapshot.update_bill(updated).unwrap();
        assert!(!snapshot.bill(bill_id).unwrap().active);

        snapshot.delete_bill(bill_id);
        assert!(snapshot.bill(bill_id).is_none());
        snapshot.delete_bill(bill_id);
    }

    #[test]
    fn update_unknown_bill_fails() {
        let mut snapshot = Snapshot::default();
        let bill = Bill {
            id: Uuid::new_v4(),
            name: "Gym".into(),
            amount_minor: 30_000,
            due_day: 5,
            account_id: Uuid::new_v4(),
            category_id: Uuid::new_v4(),
            active: true,
            last_paid: None,
        };
        let err = snapshot.update_bill(bill).unwrap_err();
        assert!(matches!(err, EngineError::KeyNotFound(_)));
    }

    #[test]
    fn adjust_balance_shifts_without_a_transaction() {
        let mut snapshot = Snapshot::default();
        let account = account(100_000);
        let account_id = account.id;
        snapshot.add_account(account);

        snapshot.adjust_balance(account_id, -25_000).unwrap();
        assert_eq!(snapshot.account(account_id).unwrap().balance_minor, 75_000);
        assert!(snapshot.transactions.is_empty());

        let err = snapshot.adjust_balance(Uuid::new_v4(), 10).unwrap_err();
        assert!(matches!(err, EngineError::KeyNotFound(_)));
    }

    #[test]
    fn patch_replaces_only_the_given_collections() {
        let mut snapshot = Snapshot::default();
        snapshot.add_account(account(1_000));
        snapshot.add_category(category(CategoryKind::Expense));

        let replacement = vec![account(5_000)];
        snapshot.apply(SnapshotPatch {
            accounts: Some(replacement.clone()),
            ..Default::default()
        });

        assert_eq!(snapshot.accounts, replacement);
        assert_eq!(snapshot.categories.len(), 1);
    }

    #[test]
    fn delete_account_keeps_its_transactions() {
        let mut snapshot = Snapshot::default();
        let account = account(1_000_000);
        let account_id = account.id;
        snapshot.add_account(account);
        snapshot
            .add_transaction(expense(account_id, Uuid::new_v4(), 10_000))
            .unwrap();

        snapshot.delete_account(account_id);
        assert!(snapshot.account(account_id).is_none());
        assert_eq!(snapshot.transactions.len(), 1);
    }
}
