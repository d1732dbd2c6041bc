//! Payout computation at resolution.
//!
//! Flat redemption: every winning-side share pays 1 point, independent of
//! the price it was bought at. The total paid out is not constrained by the
//! total staked, so the market is deliberately not zero-sum.

use std::collections::BTreeMap;

use crate::domain::market::Side;
use crate::domain::trade::Trade;
use crate::domain::user::UserId;

/// Group a market's trades by user and sum winning-side shares. Users with
/// only losing-side trades get no entry.
pub fn payouts(trades: &[Trade], resolution: Side) -> BTreeMap<UserId, f64> {
    let mut payouts: BTreeMap<UserId, f64> = BTreeMap::new();
    for trade in trades {
        if trade.side == resolution {
            *payouts.entry(trade.user_id).or_default() += trade.shares as f64;
        }
    }
    payouts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn trade(user_id: UserId, side: Side, shares: i64, price: f64) -> Trade {
        Trade {
            id: 0,
            user_id,
            market_id: 1,
            side,
            shares,
            price,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn sums_winning_shares_per_user() {
        let trades = vec![
            trade(1, Side::Yes, 10, 0.5),
            trade(1, Side::Yes, 5, 0.8),
            trade(2, Side::Yes, 3, 0.9),
            trade(2, Side::No, 7, 0.1),
        ];
        let result = payouts(&trades, Side::Yes);
        assert_eq!(result.len(), 2);
        assert_eq!(result[&1], 15.0);
        assert_eq!(result[&2], 3.0);
    }

    #[test]
    fn payout_ignores_purchase_price() {
        // 10 shares bought at 0.9 and 10 bought at 0.1 redeem identically.
        let expensive = payouts(&[trade(1, Side::Yes, 10, 0.9)], Side::Yes);
        let cheap = payouts(&[trade(1, Side::Yes, 10, 0.1)], Side::Yes);
        assert_eq!(expensive[&1], cheap[&1]);
    }

    #[test]
    fn losing_only_holders_get_no_entry() {
        let trades = vec![trade(1, Side::Yes, 10, 0.5), trade(2, Side::No, 10, 0.5)];
        let result = payouts(&trades, Side::Yes);
        assert_eq!(result.len(), 1);
        assert!(!result.contains_key(&2));
    }

    #[test]
    fn no_trades_means_no_payouts() {
        assert!(payouts(&[], Side::No).is_empty());
    }
}
