//! HTTP request handlers for the JSON API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::domain::error::LongshotError;
use crate::domain::executor;
use crate::domain::feed::{self, ActivityFeed};
use crate::domain::market::{Market, MarketId, MarketStatus, NewMarket, Side};
use crate::domain::position;
use crate::domain::pricing;
use crate::domain::resolution;
use crate::domain::user::{User, UserId};
use crate::ports::ledger_port::LedgerPort;

use super::{auth, ApiError, AppState, CallerId};

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBody {
    pub id: UserId,
    pub username: String,
    pub balance: f64,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserBody {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            balance: user.balance,
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketBody {
    pub id: MarketId,
    pub question: String,
    pub description: Option<String>,
    pub status: MarketStatus,
    pub resolution: Option<Side>,
    pub yes_price: f64,
    pub no_price: f64,
    pub creator_id: UserId,
    pub creator: Option<String>,
    pub resolve_by: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub total_yes_shares: i64,
    pub total_no_shares: i64,
    pub trade_count: i64,
}

/// Enrich a market row with its derived share totals and creator name.
fn market_body(ledger: &dyn LedgerPort, market: Market) -> Result<MarketBody, LongshotError> {
    let trades = ledger.trades_for_market(market.id)?;
    let totals = pricing::share_totals(&trades);
    let creator = ledger.get_user(market.creator_id)?.map(|u| u.username);

    Ok(MarketBody {
        id: market.id,
        question: market.question,
        description: market.description,
        status: market.status,
        resolution: market.resolution,
        yes_price: market.yes_price,
        no_price: market.no_price,
        creator_id: market.creator_id,
        creator,
        resolve_by: market.resolve_by,
        resolved_at: market.resolved_at,
        created_at: market.created_at,
        total_yes_shares: totals.yes,
        total_no_shares: totals.no,
        trade_count: trades.len() as i64,
    })
}

#[derive(Debug, serde::Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
}

pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<Json<UserBody>, ApiError> {
    let username = req.username.trim();
    if username.is_empty() {
        return Err(ApiError::bad_request("username is required"));
    }
    if req.password.chars().count() < 6 {
        return Err(ApiError::bad_request(
            "password must be at least 6 characters",
        ));
    }

    let hash = auth::hash_password(&req.password)?;
    let user = state.ledger.create_user(username, &hash)?;
    Ok(Json(UserBody::from(&user)))
}

#[derive(Debug, serde::Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<UserBody>, ApiError> {
    // Same failure for unknown user and wrong password.
    let user = state
        .ledger
        .get_user_by_username(req.username.trim())?
        .filter(|user| auth::verify_password(&req.password, &user.password_hash))
        .ok_or(LongshotError::InvalidCredentials)?;

    Ok(Json(UserBody::from(&user)))
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserBody>>, ApiError> {
    let users = state.ledger.list_users_by_balance()?;
    Ok(Json(users.iter().map(UserBody::from).collect()))
}

#[derive(Debug, serde::Deserialize)]
pub struct ListMarketsQuery {
    pub status: Option<String>,
}

pub async fn list_markets(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListMarketsQuery>,
) -> Result<Json<Vec<MarketBody>>, ApiError> {
    let status = query.status.as_deref().and_then(MarketStatus::parse);
    let markets = state.ledger.list_markets(status)?;

    let mut bodies = Vec::with_capacity(markets.len());
    for market in markets {
        bodies.push(market_body(&*state.ledger, market)?);
    }
    Ok(Json(bodies))
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMarketRequest {
    pub question: String,
    pub description: Option<String>,
    pub resolve_by: Option<String>,
}

pub async fn create_market(
    State(state): State<Arc<AppState>>,
    caller: CallerId,
    Json(req): Json<CreateMarketRequest>,
) -> Result<Json<MarketBody>, ApiError> {
    let question = req.question.trim();
    if question.is_empty() {
        return Err(ApiError::bad_request("question is required"));
    }

    state
        .ledger
        .get_user(caller.0)?
        .ok_or(LongshotError::UserNotFound { id: caller.0 })?;

    let description = req
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());
    // An unparseable target date is dropped rather than rejected; the field
    // is informational only.
    let resolve_by = req
        .resolve_by
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
        .map(|dt| dt.with_timezone(&Utc));

    let market = state.ledger.create_market(&NewMarket {
        question: question.to_string(),
        description,
        creator_id: caller.0,
        resolve_by,
    })?;

    Ok(Json(market_body(&*state.ledger, market)?))
}

pub async fn get_market(
    State(state): State<Arc<AppState>>,
    Path(id): Path<MarketId>,
) -> Result<Json<MarketBody>, ApiError> {
    let market = state
        .ledger
        .get_market(id)?
        .ok_or(LongshotError::MarketNotFound { id })?;
    Ok(Json(market_body(&*state.ledger, market)?))
}

#[derive(Debug, serde::Deserialize)]
pub struct TradeRequest {
    pub side: String,
    pub shares: i64,
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeResponse {
    pub market: MarketBody,
    pub user_balance: f64,
}

pub async fn place_trade(
    State(state): State<Arc<AppState>>,
    Path(market_id): Path<MarketId>,
    caller: CallerId,
    Json(req): Json<TradeRequest>,
) -> Result<Json<TradeResponse>, ApiError> {
    let side: Side = req.side.parse()?;
    let outcome = executor::execute_trade(&*state.ledger, market_id, caller.0, side, req.shares)?;

    Ok(Json(TradeResponse {
        market: market_body(&*state.ledger, outcome.market)?,
        user_balance: outcome.balance,
    }))
}

#[derive(Debug, serde::Deserialize)]
pub struct ResolveRequest {
    pub resolution: String,
}

pub async fn resolve(
    State(state): State<Arc<AppState>>,
    Path(market_id): Path<MarketId>,
    caller: CallerId,
    Json(req): Json<ResolveRequest>,
) -> Result<Json<MarketBody>, ApiError> {
    let resolution: Side = req.resolution.parse()?;
    let outcome = resolution::resolve_market(&*state.ledger, market_id, caller.0, resolution)?;

    Ok(Json(market_body(&*state.ledger, outcome.market)?))
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketRef {
    pub id: MarketId,
    pub question: String,
    pub status: MarketStatus,
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionBody {
    pub market: MarketRef,
    pub yes_shares: i64,
    pub no_shares: i64,
}

pub async fn positions(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<PositionBody>>, ApiError> {
    let trades = state.ledger.trades_for_user(user_id)?;
    let positions = position::aggregate(&trades);

    let mut bodies = Vec::with_capacity(positions.len());
    for pos in positions {
        let market = state
            .ledger
            .get_market(pos.market_id)?
            .ok_or(LongshotError::MarketNotFound { id: pos.market_id })?;
        bodies.push(PositionBody {
            market: MarketRef {
                id: market.id,
                question: market.question,
                status: market.status,
            },
            yes_shares: pos.yes_shares,
            no_shares: pos.no_shares,
        });
    }
    Ok(Json(bodies))
}

pub async fn feed(State(state): State<Arc<AppState>>) -> Result<Json<ActivityFeed>, ApiError> {
    Ok(Json(feed::build(&*state.ledger)?))
}
