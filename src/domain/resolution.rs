//! Market resolution: authorize, compute payouts, close, credit.

use std::collections::BTreeMap;

use chrono::Utc;

use crate::domain::error::LongshotError;
use crate::domain::market::{Market, MarketId, MarketStatus, Side};
use crate::domain::settlement;
use crate::domain::user::UserId;
use crate::ports::ledger_port::LedgerPort;

/// The closed market plus what each user was credited.
#[derive(Debug, Clone)]
pub struct ResolutionOutcome {
    pub market: Market,
    pub payouts: BTreeMap<UserId, f64>,
}

/// Resolve a market to YES or NO, crediting 1 point per winning share.
///
/// Only the market's creator or an admin may resolve, and a market resolves
/// at most once. The status flip and every balance credit commit in a
/// single transaction.
pub fn resolve_market(
    ledger: &dyn LedgerPort,
    market_id: MarketId,
    caller_id: UserId,
    resolution: Side,
) -> Result<ResolutionOutcome, LongshotError> {
    let market = ledger
        .get_market(market_id)?
        .ok_or(LongshotError::MarketNotFound { id: market_id })?;
    if market.status == MarketStatus::Resolved {
        return Err(LongshotError::AlreadyResolved { id: market_id });
    }

    let caller = ledger
        .get_user(caller_id)?
        .ok_or(LongshotError::UserNotFound { id: caller_id })?;
    if market.creator_id != caller.id && !caller.is_admin {
        return Err(LongshotError::Forbidden);
    }

    let trades = ledger.trades_for_market(market_id)?;
    let payouts = settlement::payouts(&trades, resolution);

    let market = ledger.apply_resolution(market_id, resolution, Utc::now(), &payouts)?;

    Ok(ResolutionOutcome { market, payouts })
}
