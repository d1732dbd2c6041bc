//! Position aggregation: a pure projection over a user's trades.
//!
//! Positions are never stored; they are recomputed from the trade log on
//! every read.

use std::collections::BTreeMap;

use crate::domain::market::{MarketId, Side};
use crate::domain::trade::Trade;

/// A user's net holdings in one market.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub market_id: MarketId,
    pub yes_shares: i64,
    pub no_shares: i64,
}

/// Sum one user's trades by market and side. Produces one entry per market
/// the user has at least one trade in; entry order follows market id.
pub fn aggregate(trades: &[Trade]) -> Vec<Position> {
    let mut by_market: BTreeMap<MarketId, (i64, i64)> = BTreeMap::new();
    for trade in trades {
        let entry = by_market.entry(trade.market_id).or_default();
        match trade.side {
            Side::Yes => entry.0 += trade.shares,
            Side::No => entry.1 += trade.shares,
        }
    }
    by_market
        .into_iter()
        .map(|(market_id, (yes_shares, no_shares))| Position {
            market_id,
            yes_shares,
            no_shares,
        })
        .collect()
}
