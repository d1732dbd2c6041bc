//! Trade execution: validate, record, debit, re-price.

use crate::domain::error::LongshotError;
use crate::domain::market::{Market, MarketId, Side};
use crate::domain::pricing::{self, ShareTotals};
use crate::domain::trade::{NewTrade, Trade};
use crate::domain::user::UserId;
use crate::ports::ledger_port::LedgerPort;

pub const MIN_SHARES: i64 = 1;
pub const MAX_SHARES: i64 = 100;

/// What a successful trade returns to the caller: the refreshed market with
/// its new prices, the recorded trade, per-side totals, and the buyer's
/// updated balance.
#[derive(Debug, Clone)]
pub struct TradeOutcome {
    pub market: Market,
    pub trade: Trade,
    pub totals: ShareTotals,
    pub balance: f64,
}

/// Execute a single trade against an open market.
///
/// The cost is charged at the market's currently persisted price, not a
/// price re-derived from trades at this instant. Two concurrent trades on
/// the same market may therefore both be charged the pre-trade price; that
/// race is part of the design and is not serialized away. The price
/// recompute that follows always covers at least the trade just written.
pub fn execute_trade(
    ledger: &dyn LedgerPort,
    market_id: MarketId,
    user_id: UserId,
    side: Side,
    shares: i64,
) -> Result<TradeOutcome, LongshotError> {
    if !(MIN_SHARES..=MAX_SHARES).contains(&shares) {
        return Err(LongshotError::InvalidShares { shares });
    }

    let market = ledger
        .get_market(market_id)?
        .ok_or(LongshotError::MarketNotFound { id: market_id })?;
    if !market.is_open() {
        return Err(LongshotError::MarketClosed { id: market_id });
    }

    let user = ledger
        .get_user(user_id)?
        .ok_or(LongshotError::UserNotFound { id: user_id })?;

    let price = market.price(side);
    let cost = price * shares as f64;
    if user.balance < cost {
        return Err(LongshotError::InsufficientBalance {
            cost,
            balance: user.balance,
        });
    }

    // Trade insert and balance debit are one transaction; the price update
    // below is a separate step and may briefly lag the written trade.
    let trade = ledger.record_trade(
        &NewTrade {
            user_id,
            market_id,
            side,
            shares,
            price,
        },
        cost,
    )?;

    let trades = ledger.trades_for_market(market_id)?;
    let totals = pricing::share_totals(&trades);
    let (yes_price, no_price) = pricing::prices(totals);
    ledger.update_prices(market_id, yes_price, no_price)?;

    let market = ledger
        .get_market(market_id)?
        .ok_or(LongshotError::MarketNotFound { id: market_id })?;
    let user = ledger
        .get_user(user_id)?
        .ok_or(LongshotError::UserNotFound { id: user_id })?;

    Ok(TradeOutcome {
        market,
        trade,
        totals,
        balance: user.balance,
    })
}
