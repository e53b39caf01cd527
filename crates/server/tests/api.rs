use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use migration::MigratorTrait;

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    server::router(Arc::new(engine))
}

fn basic(email: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{email}:{password}")))
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    auth: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let res = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &Router, email: &str) -> String {
    let (status, _) = call(
        app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({"email": email, "name": "Test", "password": "pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    basic(email, "pw")
}

#[tokio::test]
async fn requests_without_credentials_are_rejected() {
    let app = app().await;
    let (status, body) = call(&app, Method::GET, "/accounts", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    register(&app, "alice@example.com").await;
    let (status, _) = call(
        &app,
        Method::GET,
        "/auth/profile",
        Some(&basic("alice@example.com", "nope")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_and_duplicate_registration() {
    let app = app().await;
    let alice = register(&app, "alice@example.com").await;

    let (status, body) = call(&app, Method::GET, "/auth/profile", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["role"], "USER");
    assert!(body.get("password_hash").is_none());

    let (status, _) = call(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({"email": "alice@example.com", "name": "Again", "password": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn transaction_lifecycle_over_http() {
    let app = app().await;
    let alice = register(&app, "alice@example.com").await;

    let (status, account) = call(
        &app,
        Method::POST,
        "/accounts",
        Some(&alice),
        Some(json!({"name": "Main", "type": "CHECKING", "balance_minor": 10000})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let account_id = account["id"].as_str().unwrap().to_string();

    let (status, budget) = call(
        &app,
        Method::POST,
        "/budgets",
        Some(&alice),
        Some(json!({"category": "food", "amount_minor": 20000, "month": "2024-03"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(budget["month"], "2024-03");
    let budget_id = budget["id"].as_str().unwrap().to_string();

    let (status, tx) = call(
        &app,
        Method::POST,
        "/transactions",
        Some(&alice),
        Some(json!({
            "account_id": account_id,
            "type": "EXPENSE",
            "amount_minor": 3000,
            "category": "food",
            "transaction_date": "2024-03-05"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(tx["account"]["balance_minor"], 7000);
    let tx_id = tx["id"].as_str().unwrap().to_string();

    let (status, updated) = call(
        &app,
        Method::PUT,
        &format!("/transactions/{tx_id}"),
        Some(&alice),
        Some(json!({
            "account_id": account_id,
            "type": "EXPENSE",
            "amount_minor": 5000,
            "category": "food",
            "transaction_date": "2024-03-05"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["account"]["balance_minor"], 5000);

    let (_, budget) = call(
        &app,
        Method::GET,
        &format!("/budgets/{budget_id}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(budget["spent_minor"], 5000);
    assert_eq!(budget["remaining_minor"], 15000);

    let (_, by_month) = call(
        &app,
        Method::GET,
        "/budgets/month/3/year/2024",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(by_month.as_array().unwrap().len(), 1);

    let (_, ranged) = call(
        &app,
        Method::GET,
        "/transactions/date-range?start_date=2024-03-01&end_date=2024-03-31",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(ranged.as_array().unwrap().len(), 1);

    let (status, _) = call(
        &app,
        Method::DELETE,
        &format!("/transactions/{tx_id}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, total) = call(
        &app,
        Method::GET,
        "/accounts/total-balance",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(total["total_minor"], 10000);
}

#[tokio::test]
async fn business_errors_map_to_status_codes() {
    let app = app().await;
    let alice = register(&app, "alice@example.com").await;
    let bob = register(&app, "bob@example.com").await;

    let (_, account) = call(
        &app,
        Method::POST,
        "/accounts",
        Some(&alice),
        Some(json!({"name": "Main", "type": "CASH"})),
    )
    .await;
    let account_id = account["id"].as_str().unwrap().to_string();

    let (status, _) = call(
        &app,
        Method::GET,
        &format!("/accounts/{account_id}"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(
        &app,
        Method::GET,
        &format!("/accounts/{}", uuid::Uuid::new_v4()),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
        &app,
        Method::POST,
        "/transactions",
        Some(&alice),
        Some(json!({
            "account_id": account_id,
            "type": "EXPENSE",
            "amount_minor": 0,
            "category": "food"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = call(
        &app,
        Method::POST,
        "/budgets",
        Some(&alice),
        Some(json!({"category": "food", "amount_minor": 100, "month": "2024-13"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let budget = json!({"category": "food", "amount_minor": 100, "month": "2024-03"});
    let (status, _) = call(&app, Method::POST, "/budgets", Some(&alice), Some(budget.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = call(&app, Method::POST, "/budgets", Some(&alice), Some(budget)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn categories_are_listed() {
    let app = app().await;
    let alice = register(&app, "alice@example.com").await;
    let (status, body) = call(&app, Method::GET, "/categories", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        body.as_array()
            .unwrap()
            .iter()
            .any(|c| c["name"] == "Food" && c["type"] == "EXPENSE")
    );
}
