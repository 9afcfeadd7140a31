//! Wire types for the hosted backend.
//!
//! The backend exposes one table per entity plus a password-based auth API.
//! Rows are snake_case JSON; the structs here mirror them field for field so
//! the client can deserialize responses without touching domain types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod rows {
    use super::*;

    /// Row of the `accounts` table.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct AccountRow {
        pub id: Uuid,
        pub user_id: Uuid,
        pub name: String,
        /// One of `cash`, `bank`, `credit`, `investment`.
        pub kind: String,
        pub balance: i64,
        pub currency: String,
    }

    /// Row of the `categories` table. Categories are global, not per user.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct CategoryRow {
        pub id: Uuid,
        pub name: String,
        /// One of `income`, `expense`.
        pub kind: String,
        pub icon: String,
        pub color: String,
    }

    /// Row of the `transactions` table.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct TransactionRow {
        pub id: Uuid,
        pub user_id: Uuid,
        pub account_id: Uuid,
        pub category_id: Uuid,
        pub amount: i64,
        pub description: String,
        pub date: NaiveDate,
        /// One of `income`, `expense`.
        pub kind: String,
        pub created_at: DateTime<Utc>,
    }

    /// Row of the `budgets` table.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct BudgetRow {
        pub id: Uuid,
        pub user_id: Uuid,
        pub category_id: Uuid,
        pub amount: i64,
        /// One of `weekly`, `monthly`, `yearly`.
        pub period: String,
        pub start_date: NaiveDate,
        pub end_date: NaiveDate,
    }

    /// Row of the `bills` table.
    ///
    /// `last_paid_date` is nullable on the wire; both `null` and an absent
    /// field deserialize to `None`, so the tri-state never reaches the
    /// domain model.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct BillRow {
        pub id: Uuid,
        pub user_id: Uuid,
        pub name: String,
        pub amount: i64,
        /// Day of the month the bill is due (1-31).
        pub due_date: u32,
        pub account_id: Uuid,
        pub category_id: Uuid,
        pub is_active: bool,
        #[serde(default)]
        pub last_paid_date: Option<NaiveDate>,
    }

    /// Row of the `users` table (profile data, not credentials).
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct UserRow {
        pub id: Uuid,
        pub name: String,
        pub email: String,
        pub created_at: DateTime<Utc>,
    }
}

pub mod auth {
    use super::*;

    /// Body for `POST auth/v1/signup`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SignUpRequest {
        pub email: String,
        pub password: String,
        pub data: UserMetadata,
    }

    /// Body for `POST auth/v1/token?grant_type=password`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PasswordGrantRequest {
        pub email: String,
        pub password: String,
    }

    /// Free-form profile metadata attached to the auth user.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct UserMetadata {
        #[serde(default)]
        pub name: Option<String>,
    }

    /// The auth provider's view of a user.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct AuthUser {
        pub id: Uuid,
        pub email: String,
        pub created_at: DateTime<Utc>,
        #[serde(default)]
        pub user_metadata: UserMetadata,
    }

    /// Response of signup and of the password grant.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TokenResponse {
        pub access_token: String,
        #[serde(default)]
        pub token_type: Option<String>,
        #[serde(default)]
        pub expires_in: Option<u64>,
        pub user: AuthUser,
    }
}

/// Error body returned by the backend on failed requests.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
