//! HTTP adapter for the hosted backend.
//!
//! Data lives behind a PostgREST-style table API under `rest/v1/`, auth
//! behind a password-grant API under `auth/v1/`. Every request carries the
//! project api key; table requests additionally carry the session's bearer
//! token, which is what scopes rows to the signed-in user.

use std::sync::{Mutex, PoisonError};

use api_types::ErrorResponse;
use api_types::auth::{PasswordGrantRequest, SignUpRequest, TokenResponse, UserMetadata};
use api_types::rows::{AccountRow, BillRow, BudgetRow, CategoryRow, TransactionRow, UserRow};
use engine::{
    Account, Backend, BackendError, Bill, Budget, Category, NewAccount, NewBill, NewBudget,
    NewCategory, NewTransaction, Transaction, User,
};
use reqwest::Url;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::convert;

#[derive(Clone, Debug)]
struct AuthState {
    access_token: String,
    user: User,
}

/// Backend implementation over the hosted REST API.
#[derive(Debug)]
pub struct RestBackend {
    base_url: Url,
    api_key: String,
    http: reqwest::Client,
    auth: Mutex<Option<AuthState>>,
}

impl RestBackend {
    /// Builds a client for the given project URL and api key. Empty values
    /// mean the deployment was never configured.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, BackendError> {
        if base_url.trim().is_empty() || api_key.trim().is_empty() {
            return Err(BackendError::NotConfigured);
        }
        let mut base_url = Url::parse(base_url)
            .map_err(|err| BackendError::Validation(format!("invalid base_url: {err}")))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            base_url,
            api_key: api_key.to_string(),
            http: reqwest::Client::new(),
            auth: Mutex::new(None),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base_url
            .join(path)
            .map_err(|err| BackendError::Server(format!("invalid base_url: {err}")))
    }

    fn auth_state(&self) -> Option<AuthState> {
        self.auth
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_auth(&self, state: Option<AuthState>) {
        *self.auth.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    fn bearer(&self) -> Result<String, BackendError> {
        self.auth_state()
            .map(|s| s.access_token)
            .ok_or(BackendError::Unauthorized)
    }

    async fn get_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &str,
    ) -> Result<Vec<T>, BackendError> {
        let endpoint = self.endpoint(&format!("rest/v1/{table}{query}"))?;
        debug!(%endpoint, "fetching rows");
        let res = self
            .http
            .get(endpoint)
            .header("apikey", &self.api_key)
            .bearer_auth(self.bearer()?)
            .send()
            .await
            .map_err(transport)?;
        if !res.status().is_success() {
            return Err(error_from(res).await);
        }
        res.json::<Vec<T>>().await.map_err(transport)
    }

    async fn insert_row<T: DeserializeOwned, B: Serialize>(
        &self,
        table: &str,
        row: &B,
    ) -> Result<T, BackendError> {
        let endpoint = self.endpoint(&format!("rest/v1/{table}"))?;
        let res = self
            .http
            .post(endpoint)
            .header("apikey", &self.api_key)
            .header("Prefer", "return=representation")
            .bearer_auth(self.bearer()?)
            .json(&[row])
            .send()
            .await
            .map_err(transport)?;
        if !res.status().is_success() {
            return Err(error_from(res).await);
        }
        res.json::<Vec<T>>()
            .await
            .map_err(transport)?
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::Server("insert returned no row".to_string()))
    }

    async fn patch_row<B: Serialize>(
        &self,
        table: &str,
        id: Uuid,
        patch: &B,
    ) -> Result<(), BackendError> {
        let endpoint = self.endpoint(&format!("rest/v1/{table}?id=eq.{id}"))?;
        let res = self
            .http
            .patch(endpoint)
            .header("apikey", &self.api_key)
            .bearer_auth(self.bearer()?)
            .json(patch)
            .send()
            .await
            .map_err(transport)?;
        if !res.status().is_success() {
            return Err(error_from(res).await);
        }
        Ok(())
    }

    async fn delete_row(&self, table: &str, id: Uuid) -> Result<(), BackendError> {
        let endpoint = self.endpoint(&format!("rest/v1/{table}?id=eq.{id}"))?;
        let res = self
            .http
            .delete(endpoint)
            .header("apikey", &self.api_key)
            .bearer_auth(self.bearer()?)
            .send()
            .await
            .map_err(transport)?;
        if !res.status().is_success() {
            return Err(error_from(res).await);
        }
        Ok(())
    }
}

impl Backend for RestBackend {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<User, BackendError> {
        let endpoint = self.endpoint("auth/v1/signup")?;
        let payload = SignUpRequest {
            email: email.to_string(),
            password: password.to_string(),
            data: UserMetadata {
                name: Some(name.to_string()),
            },
        };
        let res = self
            .http
            .post(endpoint)
            .header("apikey", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(transport)?;
        if !res.status().is_success() {
            return Err(error_from(res).await);
        }
        let token: TokenResponse = res.json().await.map_err(transport)?;

        let user = User {
            id: token.user.id,
            name: name.to_string(),
            email: token.user.email.clone(),
            created_at: token.user.created_at,
        };
        self.set_auth(Some(AuthState {
            access_token: token.access_token,
            user: user.clone(),
        }));

        // The auth provider only stores credentials; the profile row lives
        // in our own table.
        let row = UserRow {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
        };
        let _: UserRow = self.insert_row("users", &row).await?;
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<User, BackendError> {
        let endpoint = self.endpoint("auth/v1/token?grant_type=password")?;
        let payload = PasswordGrantRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let res = self
            .http
            .post(endpoint)
            .header("apikey", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(transport)?;
        if !res.status().is_success() {
            return Err(error_from(res).await);
        }
        let token: TokenResponse = res.json().await.map_err(transport)?;

        let fallback = User {
            id: token.user.id,
            name: token
                .user
                .user_metadata
                .name
                .clone()
                .unwrap_or_else(|| token.user.email.clone()),
            email: token.user.email.clone(),
            created_at: token.user.created_at,
        };
        self.set_auth(Some(AuthState {
            access_token: token.access_token,
            user: fallback.clone(),
        }));

        // Prefer the profile row; older sign-ups may not have one.
        let profile: Vec<UserRow> = self
            .get_rows("users", &format!("?id=eq.{}", token.user.id))
            .await?;
        let user = profile.into_iter().next().map(convert::user).unwrap_or(fallback);
        self.set_auth(Some(AuthState {
            access_token: self.bearer()?,
            user: user.clone(),
        }));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        let token = self.bearer()?;
        let endpoint = self.endpoint("auth/v1/logout")?;
        let result = self
            .http
            .post(endpoint)
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await;
        // The local token is gone either way.
        self.set_auth(None);
        let res = result.map_err(transport)?;
        if !res.status().is_success() {
            return Err(error_from(res).await);
        }
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<User>, BackendError> {
        Ok(self.auth_state().map(|s| s.user))
    }

    async fn accounts(&self, owner: Uuid) -> Result<Vec<Account>, BackendError> {
        let rows: Vec<AccountRow> = self
            .get_rows("accounts", &format!("?user_id=eq.{owner}"))
            .await?;
        convert::collect(rows, convert::account)
    }

    async fn create_account(
        &self,
        owner: Uuid,
        draft: &NewAccount,
    ) -> Result<Account, BackendError> {
        let body = json!({
            "user_id": owner,
            "name": draft.name,
            "kind": draft.kind,
            "balance": draft.balance_minor,
            "currency": draft.currency,
        });
        let row: AccountRow = self.insert_row("accounts", &body).await?;
        convert::account(row)
    }

    async fn update_account(&self, account: &Account) -> Result<(), BackendError> {
        let patch = json!({
            "name": account.name,
            "kind": account.kind,
            "balance": account.balance_minor,
            "currency": account.currency,
        });
        self.patch_row("accounts", account.id, &patch).await
    }

    async fn delete_account(&self, account_id: Uuid) -> Result<(), BackendError> {
        self.delete_row("accounts", account_id).await
    }

    async fn categories(&self) -> Result<Vec<Category>, BackendError> {
        let rows: Vec<CategoryRow> = self.get_rows("categories", "").await?;
        convert::collect(rows, convert::category)
    }

    async fn create_category(&self, draft: &NewCategory) -> Result<Category, BackendError> {
        let body = json!({
            "name": draft.name,
            "kind": draft.kind,
            "icon": draft.icon,
            "color": draft.color,
        });
        let row: CategoryRow = self.insert_row("categories", &body).await?;
        convert::category(row)
    }

    async fn transactions(&self, owner: Uuid) -> Result<Vec<Transaction>, BackendError> {
        let rows: Vec<TransactionRow> = self
            .get_rows(
                "transactions",
                &format!("?user_id=eq.{owner}&order=date.desc,created_at.desc"),
            )
            .await?;
        convert::collect(rows, convert::transaction)
    }

    async fn create_transaction(
        &self,
        owner: Uuid,
        draft: &NewTransaction,
    ) -> Result<Transaction, BackendError> {
        let body = json!({
            "user_id": owner,
            "account_id": draft.account_id,
            "category_id": draft.category_id,
            "amount": draft.amount_minor,
            "description": draft.description,
            "date": draft.date,
            "kind": draft.kind,
        });
        let row: TransactionRow = self.insert_row("transactions", &body).await?;
        convert::transaction(row)
    }

    async fn delete_transaction(&self, transaction_id: Uuid) -> Result<(), BackendError> {
        self.delete_row("transactions", transaction_id).await
    }

    async fn budgets(&self, owner: Uuid) -> Result<Vec<Budget>, BackendError> {
        let rows: Vec<BudgetRow> = self
            .get_rows("budgets", &format!("?user_id=eq.{owner}"))
            .await?;
        convert::collect(rows, convert::budget)
    }

    async fn create_budget(&self, owner: Uuid, draft: &NewBudget) -> Result<Budget, BackendError> {
        let body = json!({
            "user_id": owner,
            "category_id": draft.category_id,
            "amount": draft.amount_minor,
            "period": draft.period,
            "start_date": draft.start_date,
            "end_date": draft.end_date,
        });
        let row: BudgetRow = self.insert_row("budgets", &body).await?;
        convert::budget(row)
    }

    async fn bills(&self, owner: Uuid) -> Result<Vec<Bill>, BackendError> {
        let rows: Vec<BillRow> = self
            .get_rows("bills", &format!("?user_id=eq.{owner}"))
            .await?;
        convert::collect(rows, convert::bill)
    }

    async fn create_bill(&self, owner: Uuid, draft: &NewBill) -> Result<Bill, BackendError> {
        let body = json!({
            "user_id": owner,
            "name": draft.name,
            "amount": draft.amount_minor,
            "due_date": draft.due_day,
            "account_id": draft.account_id,
            "category_id": draft.category_id,
            "is_active": draft.active,
        });
        let row: BillRow = self.insert_row("bills", &body).await?;
        convert::bill(row)
    }

    async fn update_bill(&self, bill: &Bill) -> Result<(), BackendError> {
        let patch = json!({
            "name": bill.name,
            "amount": bill.amount_minor,
            "due_date": bill.due_day,
            "account_id": bill.account_id,
            "category_id": bill.category_id,
            "is_active": bill.active,
            "last_paid_date": bill.last_paid,
        });
        self.patch_row("bills", bill.id, &patch).await
    }

    async fn delete_bill(&self, bill_id: Uuid) -> Result<(), BackendError> {
        self.delete_row("bills", bill_id).await
    }
}

fn transport(err: reqwest::Error) -> BackendError {
    BackendError::Transport(err.to_string())
}

async fn error_from(res: reqwest::Response) -> BackendError {
    let status = res.status();
    let body = res
        .json::<ErrorResponse>()
        .await
        .map(|err| err.error)
        .unwrap_or_else(|_| "unknown error".to_string());

    match status.as_u16() {
        401 => BackendError::Unauthorized,
        403 => BackendError::Forbidden,
        404 => BackendError::NotFound,
        409 => BackendError::Conflict(body),
        422 => BackendError::Validation(body),
        _ => BackendError::Server(body),
    }
}
