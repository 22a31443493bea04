use std::collections::BTreeMap;

use api_types::{
    dashboard::Settlement,
    expense::{Expense, ExpenseNew, ExpenseUpdate},
    user::{Credentials, UserNew, UserView},
};
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Uniform gateway failure: transport breakage or any non-2xx response.
///
/// The gateway does not retry and does not interpret status codes beyond
/// success/failure; callers only get the underlying cause to report.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{status}: {message}")]
    Server { status: StatusCode, message: String },
}

/// Error body the remote service attaches to failed requests.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Typed façade over the remote ledger service. Holds no state beyond the
/// connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

impl Client {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json::<T>().await?);
        }
        let message = match resp.json::<ErrorBody>().await {
            Ok(body) => body.message,
            Err(_) => "server error".to_string(),
        };
        Err(ClientError::Server { status, message })
    }

    async fn expect_success(resp: reqwest::Response) -> Result<(), ClientError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let message = match resp.json::<ErrorBody>().await {
            Ok(body) => body.message,
            Err(_) => "server error".to_string(),
        };
        Err(ClientError::Server { status, message })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let resp = self.http.get(self.url(path)).send().await?;
        Self::decode(resp).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.http.post(self.url(path)).json(body).send().await?;
        Self::decode(resp).await
    }

    async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.http.put(self.url(path)).json(body).send().await?;
        Self::decode(resp).await
    }

    async fn delete_unit(&self, path: &str) -> Result<(), ClientError> {
        let resp = self.http.delete(self.url(path)).send().await?;
        Self::expect_success(resp).await
    }

    // User

    pub async fn create_user(&self, payload: &UserNew) -> Result<UserView, ClientError> {
        self.post_json("/user", payload).await
    }

    pub async fn authenticate(&self, payload: &Credentials) -> Result<UserView, ClientError> {
        self.post_json("/user/authenticate", payload).await
    }

    pub async fn delete_user(&self, username: &str) -> Result<(), ClientError> {
        self.delete_unit(&format!("/user/{username}")).await
    }

    // Group members

    pub async fn add_members(
        &self,
        username: &str,
        names: &[String],
    ) -> Result<Vec<String>, ClientError> {
        self.post_json(&format!("/group-members/add/{username}"), names)
            .await
    }

    pub async fn list_members(&self, username: &str) -> Result<Vec<String>, ClientError> {
        self.get_json(&format!("/group-members/list/{username}"))
            .await
    }

    pub async fn remove_member(&self, username: &str, member: &str) -> Result<(), ClientError> {
        self.delete_unit(&format!("/group-members/remove/{username}/{member}"))
            .await
    }

    // Expenses

    pub async fn add_expense(
        &self,
        username: &str,
        payload: &ExpenseNew,
    ) -> Result<Expense, ClientError> {
        self.post_json(&format!("/expense/{username}/add"), payload)
            .await
    }

    pub async fn edit_expense(
        &self,
        id: i64,
        payload: &ExpenseUpdate,
    ) -> Result<Expense, ClientError> {
        self.put_json(&format!("/expense/{id}"), payload).await
    }

    /// Global read: the collaborator contract does not scope this by user.
    pub async fn list_expenses(&self) -> Result<Vec<Expense>, ClientError> {
        self.get_json("/expense").await
    }

    pub async fn delete_expense(&self, id: i64) -> Result<(), ClientError> {
        self.delete_unit(&format!("/expense/{id}")).await
    }

    // Dashboard summaries

    pub async fn total_sum(&self, username: &str) -> Result<f64, ClientError> {
        self.get_json(&format!("/dashboard/{username}/total-sum"))
            .await
    }

    pub async fn sum_by_type(&self, username: &str) -> Result<BTreeMap<String, f64>, ClientError> {
        self.get_json(&format!("/dashboard/{username}/sum-by-type"))
            .await
    }

    pub async fn count_by_type(
        &self,
        username: &str,
    ) -> Result<BTreeMap<String, u64>, ClientError> {
        self.get_json(&format!("/dashboard/{username}/count-by-type"))
            .await
    }

    pub async fn count_total(&self, username: &str) -> Result<u64, ClientError> {
        self.get_json(&format!("/dashboard/{username}/count-total"))
            .await
    }

    pub async fn balances(&self, username: &str) -> Result<BTreeMap<String, f64>, ClientError> {
        self.get_json(&format!("/dashboard/{username}/balances"))
            .await
    }

    pub async fn settlement(&self, username: &str) -> Result<Settlement, ClientError> {
        self.get_json(&format!("/dashboard/{username}/settlement"))
            .await
    }

    pub async fn reset_dashboard(&self, username: &str) -> Result<(), ClientError> {
        self.delete_unit(&format!("/dashboard/{username}/reset"))
            .await
    }
}
