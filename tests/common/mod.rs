//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use longshot::adapters::sqlite_adapter::SqliteLedger;
use longshot::adapters::web::{build_router, AppState, USER_ID_HEADER};
use longshot::domain::executor::{self, TradeOutcome};
use longshot::domain::market::{Market, NewMarket, Side};
use longshot::domain::user::User;
use longshot::ports::ledger_port::LedgerPort;

pub fn test_ledger() -> SqliteLedger {
    let ledger = SqliteLedger::in_memory().expect("in-memory ledger");
    ledger.initialize_schema().expect("schema");
    ledger
}

pub fn seed_user(ledger: &dyn LedgerPort, username: &str) -> User {
    ledger
        .create_user(username, "$argon2id$test-hash")
        .expect("create user")
}

pub fn seed_market(ledger: &dyn LedgerPort, creator: &User, question: &str) -> Market {
    ledger
        .create_market(&NewMarket {
            question: question.to_string(),
            description: None,
            creator_id: creator.id,
            resolve_by: None,
        })
        .expect("create market")
}

pub fn buy(
    ledger: &dyn LedgerPort,
    market: &Market,
    user: &User,
    side: Side,
    shares: i64,
) -> TradeOutcome {
    executor::execute_trade(ledger, market.id, user.id, side, shares).expect("trade")
}

/// A router over a fresh in-memory ledger, plus a handle to that ledger so
/// tests can seed and inspect state directly.
pub fn test_app() -> (Router, Arc<SqliteLedger>) {
    let ledger = Arc::new(test_ledger());
    let app = build_router(AppState {
        ledger: ledger.clone(),
    });
    (app, ledger)
}

/// Fire one JSON request at the router and decode the JSON response body.
/// An empty body decodes as `Value::Null`.
pub async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    user_id: Option<i64>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(id) = user_id {
        builder = builder.header(USER_ID_HEADER, id.to_string());
    }

    let request = builder
        .body(match body {
            Some(value) => Body::from(value.to_string()),
            None => Body::empty(),
        })
        .expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();

    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}
