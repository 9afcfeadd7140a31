//! The module contains the persistence contract the engine writes through.

use thiserror::Error;
use uuid::Uuid;

use crate::accounts::{Account, NewAccount};
use crate::bills::{Bill, NewBill};
use crate::budgets::{Budget, NewBudget};
use crate::categories::{Category, NewCategory};
use crate::transactions::{NewTransaction, Transaction};
use crate::users::User;

/// Failures reported by a backend, independent of transport.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Backend is not configured")]
    NotConfigured,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden")]
    Forbidden,
    #[error("Not found")]
    NotFound,
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Server error: {0}")]
    Server(String),
    #[error("Transport error: {0}")]
    Transport(String),
}

impl PartialEq for BackendError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NotConfigured, Self::NotConfigured) => true,
            (Self::Unauthorized, Self::Unauthorized) => true,
            (Self::Forbidden, Self::Forbidden) => true,
            (Self::NotFound, Self::NotFound) => true,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::Server(a), Self::Server(b)) => a == b,
            (Self::Transport(a), Self::Transport(b)) => a == b,
            _ => false,
        }
    }
}

/// Remote store of record. The engine validates against its snapshot, writes
/// through this trait, and only then mutates memory, so a backend failure
/// leaves local state untouched.
///
/// `create_*` calls return the stored entity so server-assigned ids and
/// timestamps land in the snapshot.
#[allow(async_fn_in_trait)]
pub trait Backend {
    async fn sign_up(&self, email: &str, password: &str, name: &str)
    -> Result<User, BackendError>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<User, BackendError>;
    async fn sign_out(&self) -> Result<(), BackendError>;
    async fn current_user(&self) -> Result<Option<User>, BackendError>;

    async fn accounts(&self, owner: Uuid) -> Result<Vec<Account>, BackendError>;
    async fn create_account(&self, owner: Uuid, draft: &NewAccount)
    -> Result<Account, BackendError>;
    async fn update_account(&self, account: &Account) -> Result<(), BackendError>;
    async fn delete_account(&self, account_id: Uuid) -> Result<(), BackendError>;

    async fn categories(&self) -> Result<Vec<Category>, BackendError>;
    async fn create_category(&self, draft: &NewCategory) -> Result<Category, BackendError>;

    async fn transactions(&self, owner: Uuid) -> Result<Vec<Transaction>, BackendError>;
    async fn create_transaction(
        &self,
        owner: Uuid,
        draft: &NewTransaction,
    ) -> Result<Transaction, BackendError>;
    async fn delete_transaction(&self, transaction_id: Uuid) -> Result<(), BackendError>;

    async fn budgets(&self, owner: Uuid) -> Result<Vec<Budget>, BackendError>;
    async fn create_budget(&self, owner: Uuid, draft: &NewBudget) -> Result<Budget, BackendError>;

    async fn bills(&self, owner: Uuid) -> Result<Vec<Bill>, BackendError>;
    async fn create_bill(&self, owner: Uuid, draft: &NewBill) -> Result<Bill, BackendError>;
    async fn update_bill(&self, bill: &Bill) -> Result<(), BackendError>;
    async fn delete_bill(&self, bill_id: Uuid) -> Result<(), BackendError>;
}
