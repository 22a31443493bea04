use std::collections::BTreeMap;

use api_types::{
    dashboard::Settlement,
    expense::{Expense, ExpenseNew},
    user::{Credentials, UserNew},
};
use tracing::{debug, warn};

use crate::client::{Client, ClientError};
use crate::forms::RegisterSubmit;

/// The authenticated actor for the session. Created once at registration
/// (or login), never mutated, dropped when the process exits.
#[derive(Debug, Clone)]
pub struct Identity {
    pub username: String,
    pub name: String,
}

/// Session lifecycle. Transitions are monotonic: the store keeps the
/// furthest-reached phase and never moves backwards, so removing the last
/// member does not regress an active session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SessionPhase {
    Anonymous,
    Registered,
    HasMembers,
    Active,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Malformed or incomplete input, caught before any network call.
    #[error("{0}")]
    Validation(String),
    /// A remote call failed; the cause is opaque beyond "failed".
    #[error("gateway error: {0}")]
    Gateway(#[from] ClientError),
}

/// Monotonic fetch generation. A response that lost the race against a
/// newer one is discarded instead of clobbering fresher state.
#[derive(Debug, Default)]
struct FetchGen {
    issued: u64,
    applied: u64,
}

impl FetchGen {
    fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    fn try_apply(&mut self, generation: u64) -> bool {
        if generation > self.applied {
            self.applied = generation;
            true
        } else {
            false
        }
    }
}

/// Summary figures fetched straight from the dashboard endpoints. These are
/// authoritative server values, never recomputed from the local expense
/// list.
#[derive(Debug, Default, Clone)]
pub struct Summary {
    pub total_sum: Option<f64>,
    pub sum_by_type: BTreeMap<String, f64>,
    pub count_by_type: BTreeMap<String, u64>,
    pub count_total: Option<u64>,
    pub balances: BTreeMap<String, f64>,
}

/// The only place allowed to mutate session identity, the member list and
/// the expense list. Mutations call the gateway first and apply the
/// server's canonical answer; local state is replaced, not merged.
#[derive(Debug)]
pub struct LedgerStore {
    client: Client,
    identity: Option<Identity>,
    dashboard_name: Option<String>,
    members: Vec<String>,
    expenses: Vec<Expense>,
    summary: Summary,
    phase: SessionPhase,
    expense_gen: FetchGen,
    summary_gen: FetchGen,
}

impl LedgerStore {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            identity: None,
            dashboard_name: None,
            members: Vec::new(),
            expenses: Vec::new(),
            summary: Summary::default(),
            phase: SessionPhase::Anonymous,
            expense_gen: FetchGen::default(),
            summary_gen: FetchGen::default(),
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn dashboard_name(&self) -> Option<&str> {
        self.dashboard_name.as_deref()
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    fn advance(&mut self, phase: SessionPhase) {
        self.phase = self.phase.max(phase);
    }

    fn require_identity(&self) -> Result<Identity, StoreError> {
        self.identity
            .clone()
            .ok_or_else(|| StoreError::Validation("Username is missing.".to_string()))
    }

    /// Creates the account and opens the session. The optional dashboard
    /// display name stays local; it is not part of the payload.
    pub async fn register(&mut self, submit: RegisterSubmit) -> Result<(), StoreError> {
        if submit.username.is_empty() || submit.password.len() < 8 || submit.name.is_empty() {
            return Err(StoreError::Validation(
                "Please fill all fields correctly.".to_string(),
            ));
        }

        let user = self
            .client
            .create_user(&UserNew {
                username: submit.username,
                password: submit.password,
                name: submit.name,
            })
            .await?;
        debug!(username = %user.username, "registered");

        self.identity = Some(Identity {
            username: user.username,
            name: user.name,
        });
        self.dashboard_name = submit.dashboard_name;
        self.advance(SessionPhase::Registered);
        Ok(())
    }

    /// Opens a session against an existing account.
    pub async fn login(&mut self, submit: RegisterSubmit) -> Result<(), StoreError> {
        if submit.username.is_empty() || submit.password.is_empty() {
            return Err(StoreError::Validation(
                "Please fill all fields correctly.".to_string(),
            ));
        }

        let user = self
            .client
            .authenticate(&Credentials {
                username: submit.username,
                password: submit.password,
            })
            .await?;
        debug!(username = %user.username, "authenticated");

        self.identity = Some(Identity {
            username: user.username,
            name: user.name,
        });
        self.dashboard_name = submit.dashboard_name;
        self.advance(SessionPhase::Registered);

        // An existing account may already have members and expenses.
        if let Ok(members) = self.client.list_members(&self.require_identity()?.username).await {
            self.members = members;
            if !self.members.is_empty() {
                self.advance(SessionPhase::HasMembers);
            }
        }
        let _ = self.fetch_all_expenses().await;
        Ok(())
    }

    /// Sends the whole batch in one call. On success the local list is
    /// REPLACED by the server's returned list, which is authoritative; a
    /// failure leaves the local list untouched.
    pub async fn add_members(&mut self, names: Vec<String>) -> Result<(), StoreError> {
        if names.is_empty() || names.iter().any(|name| name.trim().is_empty()) {
            return Err(StoreError::Validation(
                "All member names must be filled.".to_string(),
            ));
        }
        let identity = self.require_identity()?;

        let members = self.client.add_members(&identity.username, &names).await?;
        debug!(count = members.len(), "member list replaced");
        self.members = members;
        if !self.members.is_empty() {
            self.advance(SessionPhase::HasMembers);
        }
        Ok(())
    }

    /// Removes one member, then re-fetches the authoritative list. The
    /// session phase never regresses even if the list becomes empty.
    pub async fn remove_member(&mut self, member: &str) -> Result<(), StoreError> {
        let identity = self.require_identity()?;

        self.client
            .remove_member(&identity.username, member)
            .await?;
        let members = self.client.list_members(&identity.username).await?;
        self.members = members;
        Ok(())
    }

    /// Appends the server-returned canonical expense, then re-fetches the
    /// whole list. The re-fetch is redundant on a quiet server but it is
    /// the synchronization policy: the list view always ends on a full
    /// server snapshot. A failed re-fetch degrades to an empty list and is
    /// not reported as a failure of the add itself.
    pub async fn add_expense(&mut self, candidate: ExpenseNew) -> Result<(), StoreError> {
        if candidate.amount <= 0.0
            || candidate.description.is_empty()
            || candidate.paid_by.is_empty()
            || candidate.shared_by.is_empty()
        {
            return Err(StoreError::Validation(
                "Please fill all fields correctly.".to_string(),
            ));
        }
        let identity = self.require_identity()?;

        let created = self
            .client
            .add_expense(&identity.username, &candidate)
            .await?;
        debug!(id = created.id, "expense created");
        self.expenses.push(created);
        self.advance(SessionPhase::Active);

        if let Err(err) = self.fetch_all_expenses().await {
            warn!("expense re-fetch after add failed: {err}");
        }
        Ok(())
    }

    /// Deletes by server id, then re-fetches the list.
    pub async fn delete_expense(&mut self, id: i64) -> Result<(), StoreError> {
        self.client.delete_expense(id).await?;
        self.fetch_all_expenses().await
    }

    /// Wholesale replace of the local expense list with the server's
    /// current one. On failure the list is cleared rather than left stale
    /// (fail-safe-empty). Responses that arrive after a newer fetch has
    /// already been applied are discarded.
    pub async fn fetch_all_expenses(&mut self) -> Result<(), StoreError> {
        let generation = self.expense_gen.issue();
        match self.client.list_expenses().await {
            Ok(expenses) => {
                if self.expense_gen.try_apply(generation) {
                    self.expenses = expenses;
                }
                Ok(())
            }
            Err(err) => {
                if self.expense_gen.try_apply(generation) {
                    self.expenses.clear();
                }
                Err(err.into())
            }
        }
    }

    /// Refreshes every summary figure from the dashboard endpoints in one
    /// pass. On any failure the previous summary is kept; the caller
    /// reports the error to its own flow.
    pub async fn refresh_summary(&mut self) -> Result<(), StoreError> {
        let identity = self.require_identity()?;
        let generation = self.summary_gen.issue();

        let username = &identity.username;
        let total_sum = self.client.total_sum(username).await?;
        let sum_by_type = self.client.sum_by_type(username).await?;
        let count_by_type = self.client.count_by_type(username).await?;
        let count_total = self.client.count_total(username).await?;
        let balances = self.client.balances(username).await?;

        if self.summary_gen.try_apply(generation) {
            self.summary = Summary {
                total_sum: Some(total_sum),
                sum_by_type,
                count_by_type,
                count_total: Some(count_total),
                balances,
            };
        }
        Ok(())
    }

    /// Fetches the settlement plan. Read-only; the rendered text is derived
    /// by the caller.
    pub async fn fetch_settlement(&self) -> Result<Settlement, StoreError> {
        let identity = self.require_identity()?;
        Ok(self.client.settlement(&identity.username).await?)
    }

    /// Clears the dashboard server-side, then drops the local snapshot.
    pub async fn reset_dashboard(&mut self) -> Result<(), StoreError> {
        let identity = self.require_identity()?;
        self.client.reset_dashboard(&identity.username).await?;
        self.expenses.clear();
        self.summary = Summary::default();
        self.fetch_all_expenses().await
    }

    /// Deletes the account; the session terminates with it.
    pub async fn delete_account(&mut self) -> Result<(), StoreError> {
        let identity = self.require_identity()?;
        self.client.delete_user(&identity.username).await?;
        self.identity = None;
        Ok(())
    }
}
