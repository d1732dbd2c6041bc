//! Proportional price derivation from the trade log.
//!
//! Prices are purely historical-volume-weighted: yesPrice is the YES share
//! of all shares ever bought, not a probability estimate. There is no
//! slippage curve, so a single large trade can move the price sharply and a
//! side can reach exactly 0 or 1.

use crate::domain::market::Side;
use crate::domain::trade::Trade;

/// Cumulative shares bought per side on one market.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShareTotals {
    pub yes: i64,
    pub no: i64,
}

impl ShareTotals {
    pub fn total(&self) -> i64 {
        self.yes + self.no
    }
}

/// Sum share quantities by side over a market's full trade history.
pub fn share_totals(trades: &[Trade]) -> ShareTotals {
    let mut totals = ShareTotals::default();
    for trade in trades {
        match trade.side {
            Side::Yes => totals.yes += trade.shares,
            Side::No => totals.no += trade.shares,
        }
    }
    totals
}

/// Derive (yesPrice, noPrice) from share totals. A market with no trades
/// prices both sides at 0.5.
pub fn prices(totals: ShareTotals) -> (f64, f64) {
    let total = totals.total();
    if total == 0 {
        return (0.5, 0.5);
    }
    let yes_price = totals.yes as f64 / total as f64;
    let no_price = totals.no as f64 / total as f64;
    (yes_price, no_price)
}

/// Convenience for recomputation after a trade.
pub fn prices_from_trades(trades: &[Trade]) -> (f64, f64) {
    prices(share_totals(trades))
}
