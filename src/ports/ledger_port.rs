//! Ledger persistence port trait.
//!
//! The store keeps three related collections (users, markets, trades) and
//! provides the two atomic multi-row mutations the engine needs:
//! [`LedgerPort::record_trade`] (trade insert + balance debit) and
//! [`LedgerPort::apply_resolution`] (market close + all payout credits).
//! Either commits fully or leaves no writes behind.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::domain::error::LongshotError;
use crate::domain::market::{Market, MarketId, MarketStatus, NewMarket, Side};
use crate::domain::trade::{NewTrade, Trade};
use crate::domain::user::{User, UserId};

pub trait LedgerPort {
    fn create_user(&self, username: &str, password_hash: &str) -> Result<User, LongshotError>;
    fn get_user(&self, id: UserId) -> Result<Option<User>, LongshotError>;
    fn get_user_by_username(&self, username: &str) -> Result<Option<User>, LongshotError>;
    /// All users, highest balance first (leaderboard order).
    fn list_users_by_balance(&self) -> Result<Vec<User>, LongshotError>;
    fn set_admin(&self, username: &str, is_admin: bool) -> Result<(), LongshotError>;

    fn create_market(&self, new: &NewMarket) -> Result<Market, LongshotError>;
    fn get_market(&self, id: MarketId) -> Result<Option<Market>, LongshotError>;
    /// Markets newest first, optionally filtered by lifecycle status.
    fn list_markets(&self, status: Option<MarketStatus>) -> Result<Vec<Market>, LongshotError>;
    fn update_prices(
        &self,
        id: MarketId,
        yes_price: f64,
        no_price: f64,
    ) -> Result<(), LongshotError>;

    fn trades_for_market(&self, id: MarketId) -> Result<Vec<Trade>, LongshotError>;
    fn trades_for_user(&self, id: UserId) -> Result<Vec<Trade>, LongshotError>;
    fn latest_trade(&self) -> Result<Option<Trade>, LongshotError>;

    /// Insert the trade and debit the buyer by `cost` in one transaction.
    /// Does not re-check the balance; the pre-write check is the executor's.
    fn record_trade(&self, new: &NewTrade, cost: f64) -> Result<Trade, LongshotError>;

    /// Close the market and credit every payout in one transaction. Fails
    /// with `AlreadyResolved` if the market is no longer OPEN at commit time.
    fn apply_resolution(
        &self,
        id: MarketId,
        resolution: Side,
        resolved_at: DateTime<Utc>,
        payouts: &BTreeMap<UserId, f64>,
    ) -> Result<Market, LongshotError>;

    /// The OPEN market with the nearest target resolution date, if any.
    fn soonest_closing_market(&self) -> Result<Option<Market>, LongshotError>;
    /// The OPEN market with the most trades, with its trade count.
    fn most_traded_market(&self) -> Result<Option<(Market, i64)>, LongshotError>;
    /// The OPEN market with the most shares bought, with its share total.
    fn highest_volume_market(&self) -> Result<Option<(Market, i64)>, LongshotError>;
}
