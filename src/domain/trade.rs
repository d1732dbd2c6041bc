//! Trade records: the append-only ledger.

use chrono::{DateTime, Utc};

use crate::domain::market::{MarketId, Side};
use crate::domain::user::UserId;

/// One executed trade. Never updated or deleted; the full trade history of
/// a market is the sole source of truth for pricing and payouts.
#[derive(Debug, Clone)]
pub struct Trade {
    pub id: i64,
    pub user_id: UserId,
    pub market_id: MarketId,
    pub side: Side,
    pub shares: i64,
    /// The market price for `side` at the moment the trade executed.
    pub price: f64,
    pub created_at: DateTime<Utc>,
}

/// Fields of a trade about to be recorded.
#[derive(Debug, Clone)]
pub struct NewTrade {
    pub user_id: UserId,
    pub market_id: MarketId,
    pub side: Side,
    pub shares: i64,
    pub price: f64,
}
