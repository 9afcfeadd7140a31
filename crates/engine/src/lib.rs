//! In-memory domain state for a personal budgeting client.
//!
//! The engine keeps a per-user [`Snapshot`] of accounts, categories,
//! transactions, budgets and bills, guarded by a [`Gate`] that writes every
//! mutation through a [`Backend`] before mutating memory. Derived figures
//! live in [`metrics`].

mod accounts;
mod backend;
mod bills;
mod budgets;
mod categories;
mod error;
pub mod metrics;
mod session;
mod store;
mod transactions;
mod users;

pub use accounts::{Account, AccountKind, NewAccount};
pub use backend::{Backend, BackendError};
pub use bills::{Bill, NewBill};
pub use budgets::{Budget, BudgetPeriod, NewBudget};
pub use categories::{Category, CategoryKind, NewCategory};
pub use error::EngineError;
pub use session::{Gate, Session};
pub use store::{Snapshot, SnapshotPatch};
pub use transactions::{NewTransaction, Transaction, TransactionKind};
pub use users::User;

type ResultEngine<T> = Result<T, EngineError>;
