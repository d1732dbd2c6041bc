//! JSON API adapter.
//!
//! A stateless request-handling layer over the ledger port. The caller's
//! identity arrives in the `x-user-id` header, supplied by the auth
//! collaborator in front of this service; the core trusts it without
//! re-verifying credentials.

mod auth;
mod error;
mod handlers;

pub use auth::{hash_password, verify_password, CallerId, USER_ID_HEADER};
pub use error::ApiError;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::ports::ledger_port::LedgerPort;

pub struct AppState {
    pub ledger: Arc<dyn LedgerPort + Send + Sync>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/users", get(handlers::list_users).post(handlers::signup))
        .route("/api/users/{id}/positions", get(handlers::positions))
        .route("/api/auth/login", post(handlers::login))
        .route(
            "/api/markets",
            get(handlers::list_markets).post(handlers::create_market),
        )
        .route("/api/markets/{id}", get(handlers::get_market))
        .route("/api/markets/{id}/trades", post(handlers::place_trade))
        .route("/api/markets/{id}/resolve", post(handlers::resolve))
        .route("/api/feed", get(handlers::feed))
        .with_state(Arc::new(state))
}
