//! End-to-end store tests against an in-process stub of the remote ledger
//! service. The stub implements just enough of the collaborator contract
//! to exercise every synchronization rule.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use api_types::expense::{Expense, ExpenseNew, ExpenseUpdate, SharedMember};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use serde_json::json;

use fairshare_tui::client::Client;
use fairshare_tui::forms::RegisterSubmit;
use fairshare_tui::store::{LedgerStore, SessionPhase, StoreError};
use fairshare_tui::views;

#[derive(Default)]
struct StubLedger {
    members: Vec<String>,
    expenses: Vec<Expense>,
    next_id: i64,
    fail_member_add: bool,
    fail_expense_list: bool,
}

type Shared = Arc<Mutex<StubLedger>>;

fn error_body(message: &str) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": message })),
    )
}

async fn create_user(Json(body): Json<serde_json::Value>) -> impl IntoResponse {
    (
        StatusCode::CREATED,
        Json(json!({
            "username": body["username"],
            "name": body["name"],
        })),
    )
}

async fn authenticate(Json(body): Json<serde_json::Value>) -> Json<serde_json::Value> {
    Json(json!({ "username": body["username"], "name": "Stub User" }))
}

async fn add_members(
    State(stub): State<Shared>,
    Path(_username): Path<String>,
    Json(names): Json<Vec<String>>,
) -> axum::response::Response {
    let mut stub = stub.lock().unwrap();
    if stub.fail_member_add {
        return error_body("boom").into_response();
    }
    stub.members.extend(names);
    (StatusCode::CREATED, Json(stub.members.clone())).into_response()
}

async fn list_members(State(stub): State<Shared>) -> Json<Vec<String>> {
    Json(stub.lock().unwrap().members.clone())
}

async fn remove_member(
    State(stub): State<Shared>,
    Path((_username, member)): Path<(String, String)>,
) -> StatusCode {
    let mut stub = stub.lock().unwrap();
    stub.members.retain(|name| *name != member);
    StatusCode::NO_CONTENT
}

async fn add_expense(
    State(stub): State<Shared>,
    Path(_username): Path<String>,
    Json(candidate): Json<ExpenseNew>,
) -> impl IntoResponse {
    let mut stub = stub.lock().unwrap();
    stub.next_id += 1;
    let expense = Expense {
        id: stub.next_id,
        kind: candidate.kind,
        amount: candidate.amount,
        description: candidate.description,
        paid_by: candidate.paid_by,
        shared_by: candidate.shared_by,
    };
    stub.expenses.push(expense.clone());
    (StatusCode::CREATED, Json(expense))
}

async fn edit_expense(
    State(stub): State<Shared>,
    Path(id): Path<i64>,
    Json(update): Json<ExpenseUpdate>,
) -> axum::response::Response {
    let mut stub = stub.lock().unwrap();
    let Some(expense) = stub.expenses.iter_mut().find(|e| e.id == id) else {
        return (StatusCode::NOT_FOUND, Json(json!({"message": "not found"}))).into_response();
    };
    if let Some(amount) = update.amount {
        expense.amount = amount;
    }
    if let Some(description) = update.description {
        expense.description = description;
    }
    Json(expense.clone()).into_response()
}

async fn list_expenses(State(stub): State<Shared>) -> axum::response::Response {
    let stub = stub.lock().unwrap();
    if stub.fail_expense_list {
        return error_body("boom").into_response();
    }
    Json(stub.expenses.clone()).into_response()
}

async fn delete_expense(State(stub): State<Shared>, Path(id): Path<i64>) -> StatusCode {
    let mut stub = stub.lock().unwrap();
    stub.expenses.retain(|e| e.id != id);
    StatusCode::NO_CONTENT
}

async fn total_sum(State(stub): State<Shared>) -> Json<f64> {
    let stub = stub.lock().unwrap();
    Json(stub.expenses.iter().map(|e| e.amount).sum())
}

async fn sum_by_type(State(stub): State<Shared>) -> Json<BTreeMap<String, f64>> {
    let stub = stub.lock().unwrap();
    let mut sums = BTreeMap::new();
    for expense in &stub.expenses {
        *sums.entry(expense.kind.clone()).or_insert(0.0) += expense.amount;
    }
    Json(sums)
}

async fn count_by_type(State(stub): State<Shared>) -> Json<BTreeMap<String, u64>> {
    let stub = stub.lock().unwrap();
    let mut counts = BTreeMap::new();
    for expense in &stub.expenses {
        *counts.entry(expense.kind.clone()).or_insert(0u64) += 1;
    }
    Json(counts)
}

async fn count_total(State(stub): State<Shared>) -> Json<u64> {
    Json(stub.lock().unwrap().expenses.len() as u64)
}

async fn balances(State(stub): State<Shared>) -> Json<BTreeMap<String, f64>> {
    let stub = stub.lock().unwrap();
    Json(stub.members.iter().map(|m| (m.clone(), 0.0)).collect())
}

async fn settlement() -> impl IntoResponse {
    // Raw body so the object key order is exactly what the client sees.
    (
        [(header::CONTENT_TYPE, "application/json")],
        r#"{"Alice": ["owes Bob $5"], "Carol": ["owes Bob $3", "owes Dan $2"]}"#,
    )
}

async fn delete_user() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn reset_dashboard(State(stub): State<Shared>) -> StatusCode {
    let mut stub = stub.lock().unwrap();
    stub.expenses.clear();
    StatusCode::NO_CONTENT
}

async fn spawn_stub() -> (String, Shared) {
    let stub: Shared = Arc::new(Mutex::new(StubLedger::default()));

    let router = Router::new()
        .route("/user", post(create_user))
        .route("/user/authenticate", post(authenticate))
        .route("/user/{username}", delete(delete_user))
        .route("/group-members/add/{username}", post(add_members))
        .route("/group-members/list/{username}", get(list_members))
        .route(
            "/group-members/remove/{username}/{member}",
            delete(remove_member),
        )
        .route("/expense/{username}/add", post(add_expense))
        .route("/expense/{id}", put(edit_expense).delete(delete_expense))
        .route("/expense", get(list_expenses))
        .route("/dashboard/{username}/total-sum", get(total_sum))
        .route("/dashboard/{username}/sum-by-type", get(sum_by_type))
        .route("/dashboard/{username}/count-by-type", get(count_by_type))
        .route("/dashboard/{username}/count-total", get(count_total))
        .route("/dashboard/{username}/balances", get(balances))
        .route("/dashboard/{username}/settlement", get(settlement))
        .route("/dashboard/{username}/reset", delete(reset_dashboard))
        .with_state(stub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (format!("http://{addr}"), stub)
}

fn register_submit(username: &str) -> RegisterSubmit {
    RegisterSubmit {
        username: username.to_string(),
        password: "password1".to_string(),
        name: "Alice".to_string(),
        dashboard_name: Some("Road trip".to_string()),
    }
}

async fn registered_store(base_url: &str) -> LedgerStore {
    let mut store = LedgerStore::new(Client::new(base_url));
    store.register(register_submit("alice")).await.unwrap();
    store
}

#[tokio::test]
async fn register_members_expense_fetch_scenario() {
    let (base_url, _stub) = spawn_stub().await;
    let mut store = registered_store(&base_url).await;
    assert_eq!(store.phase(), SessionPhase::Registered);
    assert_eq!(store.dashboard_name(), Some("Road trip"));

    store
        .add_members(vec!["bob".to_string(), "carol".to_string()])
        .await
        .unwrap();
    assert_eq!(store.members(), ["bob", "carol"]);
    assert_eq!(store.phase(), SessionPhase::HasMembers);

    store
        .add_expense(ExpenseNew {
            kind: "Food".to_string(),
            amount: 30.0,
            description: "lunch".to_string(),
            paid_by: "alice".to_string(),
            shared_by: vec![SharedMember::from("bob"), SharedMember::from("carol")],
        })
        .await
        .unwrap();
    assert_eq!(store.phase(), SessionPhase::Active);

    store.fetch_all_expenses().await.unwrap();
    let expenses = store.expenses();
    assert_eq!(expenses.len(), 1);
    let expense = &expenses[0];
    assert_eq!(expense.description, "lunch");
    assert_eq!(expense.amount, 30.0);
    assert_eq!(expense.paid_by, "alice");
    let sharers: Vec<&str> = expense
        .shared_by
        .iter()
        .map(|m| m.member_name.as_str())
        .collect();
    assert!(sharers.contains(&"bob") && sharers.contains(&"carol"));
}

#[tokio::test]
async fn member_list_is_replaced_not_accumulated() {
    let (base_url, _stub) = spawn_stub().await;
    let mut store = registered_store(&base_url).await;

    store.add_members(vec!["bob".to_string()]).await.unwrap();
    store.add_members(vec!["carol".to_string()]).await.unwrap();

    // Local membership equals the server's last-returned list, not a pile
    // of client-side appends.
    assert_eq!(store.members(), ["bob", "carol"]);
}

#[tokio::test]
async fn failed_member_add_leaves_list_and_phase_unchanged() {
    let (base_url, stub) = spawn_stub().await;
    let mut store = registered_store(&base_url).await;
    stub.lock().unwrap().fail_member_add = true;

    let err = store
        .add_members(vec!["bob".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Gateway(_)));
    assert!(store.members().is_empty());
    assert_eq!(store.phase(), SessionPhase::Registered);
}

#[tokio::test]
async fn blank_member_names_never_reach_the_network() {
    // Unroutable address: a validation failure must not attempt a call.
    let mut store = LedgerStore::new(Client::new("http://127.0.0.1:9"));
    let err = store
        .add_members(vec!["bob".to_string(), "  ".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}

#[tokio::test]
async fn short_password_is_rejected_locally() {
    let mut store = LedgerStore::new(Client::new("http://127.0.0.1:9"));
    let mut submit = register_submit("alice");
    submit.password = "1234567".to_string();
    let err = store.register(submit).await.unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert!(store.identity().is_none());
}

#[tokio::test]
async fn failed_expense_refresh_clears_the_list() {
    let (base_url, stub) = spawn_stub().await;
    let mut store = registered_store(&base_url).await;
    store.add_members(vec!["bob".to_string()]).await.unwrap();
    store
        .add_expense(ExpenseNew {
            kind: "Food".to_string(),
            amount: 12.34,
            description: "snacks".to_string(),
            paid_by: "bob".to_string(),
            shared_by: vec![SharedMember::from("bob")],
        })
        .await
        .unwrap();
    assert_eq!(store.expenses().len(), 1);

    stub.lock().unwrap().fail_expense_list = true;
    let err = store.fetch_all_expenses().await.unwrap_err();
    assert!(matches!(err, StoreError::Gateway(_)));

    // Fail-safe-empty: no stale itemized view.
    assert!(store.expenses().is_empty());
}

#[tokio::test]
async fn expense_delete_and_edit_round_trip() {
    let (base_url, _stub) = spawn_stub().await;
    let mut store = registered_store(&base_url).await;
    store.add_members(vec!["bob".to_string()]).await.unwrap();

    for description in ["snacks", "tickets"] {
        store
            .add_expense(ExpenseNew {
                kind: "Entertainment".to_string(),
                amount: 10.0,
                description: description.to_string(),
                paid_by: "bob".to_string(),
                shared_by: vec![SharedMember::from("bob")],
            })
            .await
            .unwrap();
    }
    assert_eq!(store.expenses().len(), 2);

    let client = Client::new(&base_url);
    let first_id = store.expenses()[0].id;
    let updated = client
        .edit_expense(
            first_id,
            &ExpenseUpdate {
                amount: Some(25.5),
                ..ExpenseUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.amount, 25.5);

    let second_id = store.expenses()[1].id;
    store.delete_expense(second_id).await.unwrap();
    assert_eq!(store.expenses().len(), 1);
    assert_eq!(store.expenses()[0].amount, 25.5);
}

#[tokio::test]
async fn remove_member_refetches_authoritative_list() {
    let (base_url, _stub) = spawn_stub().await;
    let mut store = registered_store(&base_url).await;
    store
        .add_members(vec!["bob".to_string(), "carol".to_string()])
        .await
        .unwrap();

    store.remove_member("bob").await.unwrap();
    assert_eq!(store.members(), ["carol"]);
    // Phase is monotonic even if the group later empties.
    store.remove_member("carol").await.unwrap();
    assert!(store.members().is_empty());
    assert_eq!(store.phase(), SessionPhase::HasMembers);
}

#[tokio::test]
async fn summary_comes_from_the_dashboard_endpoints() {
    let (base_url, _stub) = spawn_stub().await;
    let mut store = registered_store(&base_url).await;
    store.add_members(vec!["bob".to_string()]).await.unwrap();
    store
        .add_expense(ExpenseNew {
            kind: "Transport".to_string(),
            amount: 7.5,
            description: "bus".to_string(),
            paid_by: "bob".to_string(),
            shared_by: vec![SharedMember::from("bob")],
        })
        .await
        .unwrap();

    store.refresh_summary().await.unwrap();
    let summary = store.summary();
    assert_eq!(summary.total_sum, Some(7.5));
    assert_eq!(summary.sum_by_type.get("Transport"), Some(&7.5));
    assert_eq!(summary.count_by_type.get("Transport"), Some(&1));
    assert_eq!(summary.count_total, Some(1));
    assert_eq!(summary.balances.get("bob"), Some(&0.0));
}

#[tokio::test]
async fn settlement_order_survives_the_whole_pipeline() {
    let (base_url, _stub) = spawn_stub().await;
    let store = {
        let mut store = LedgerStore::new(Client::new(&base_url));
        store.register(register_submit("alice")).await.unwrap();
        store
    };

    let settlement = store.fetch_settlement().await.unwrap();
    assert_eq!(
        views::settlement_text(&settlement),
        "Alice owes Bob $5\nCarol owes Bob $3\nCarol owes Dan $2"
    );
}

#[tokio::test]
async fn reset_dashboard_drops_local_snapshot() {
    let (base_url, _stub) = spawn_stub().await;
    let mut store = registered_store(&base_url).await;
    store.add_members(vec!["bob".to_string()]).await.unwrap();
    store
        .add_expense(ExpenseNew {
            kind: "Misc".to_string(),
            amount: 1.0,
            description: "gum".to_string(),
            paid_by: "bob".to_string(),
            shared_by: vec![SharedMember::from("bob")],
        })
        .await
        .unwrap();
    store.refresh_summary().await.unwrap();

    store.reset_dashboard().await.unwrap();
    assert!(store.expenses().is_empty());
    assert_eq!(store.summary().total_sum, None);
}

#[tokio::test]
async fn login_restores_an_existing_session() {
    let (base_url, stub) = spawn_stub().await;
    stub.lock().unwrap().members = vec!["bob".to_string()];

    let mut store = LedgerStore::new(Client::new(&base_url));
    store.login(register_submit("alice")).await.unwrap();
    assert!(store.identity().is_some());
    assert_eq!(store.members(), ["bob"]);
    assert_eq!(store.phase(), SessionPhase::HasMembers);
}

#[tokio::test]
async fn delete_account_terminates_the_session() {
    let (base_url, _stub) = spawn_stub().await;
    let mut store = registered_store(&base_url).await;
    store.delete_account().await.unwrap();
    assert!(store.identity().is_none());
}
