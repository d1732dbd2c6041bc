//! Activity feed: read-only aggregates for the landing banner.
//!
//! Everything here is derived by queries over the ledger; nothing is cached
//! and nothing mutates state.

use chrono::{DateTime, Utc};

use crate::domain::error::LongshotError;
use crate::domain::market::{MarketId, Side};
use crate::ports::ledger_port::LedgerPort;

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LastTrade {
    pub username: String,
    pub market_id: MarketId,
    pub market_question: String,
    pub side: Side,
    pub shares: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosingSoon {
    pub market_id: MarketId,
    pub question: String,
    pub resolve_by: DateTime<Utc>,
    pub creator: String,
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MostTraded {
    pub market_id: MarketId,
    pub question: String,
    pub trade_count: i64,
    pub creator: String,
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighestVolume {
    pub market_id: MarketId,
    pub question: String,
    pub total_shares: i64,
    pub creator: String,
}

/// One row of the leaderboard extremes.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub username: String,
    pub balance: f64,
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityFeed {
    pub last_trade: Option<LastTrade>,
    pub closing_soon: Option<ClosingSoon>,
    pub most_traded: Option<MostTraded>,
    pub highest_volume: Option<HighestVolume>,
    pub leader: Option<Standing>,
    pub straggler: Option<Standing>,
}

fn creator_name(ledger: &dyn LedgerPort, user_id: i64) -> Result<String, LongshotError> {
    Ok(ledger
        .get_user(user_id)?
        .map(|u| u.username)
        .unwrap_or_default())
}

/// Assemble the feed from ledger queries.
pub fn build(ledger: &dyn LedgerPort) -> Result<ActivityFeed, LongshotError> {
    let last_trade = match ledger.latest_trade()? {
        Some(trade) => {
            let user = ledger
                .get_user(trade.user_id)?
                .ok_or(LongshotError::UserNotFound { id: trade.user_id })?;
            let market = ledger
                .get_market(trade.market_id)?
                .ok_or(LongshotError::MarketNotFound {
                    id: trade.market_id,
                })?;
            Some(LastTrade {
                username: user.username,
                market_id: market.id,
                market_question: market.question,
                side: trade.side,
                shares: trade.shares,
                created_at: trade.created_at,
            })
        }
        None => None,
    };

    let closing_soon = match ledger.soonest_closing_market()? {
        Some(market) => {
            let creator = creator_name(ledger, market.creator_id)?;
            market.resolve_by.map(|resolve_by| ClosingSoon {
                market_id: market.id,
                question: market.question,
                resolve_by,
                creator,
            })
        }
        None => None,
    };

    let most_traded = match ledger.most_traded_market()? {
        Some((market, trade_count)) => Some(MostTraded {
            creator: creator_name(ledger, market.creator_id)?,
            market_id: market.id,
            question: market.question,
            trade_count,
        }),
        None => None,
    };

    let highest_volume = match ledger.highest_volume_market()? {
        Some((market, total_shares)) => Some(HighestVolume {
            creator: creator_name(ledger, market.creator_id)?,
            market_id: market.id,
            question: market.question,
            total_shares,
        }),
        None => None,
    };

    let users = ledger.list_users_by_balance()?;
    let leader = users.first().map(|u| Standing {
        username: u.username.clone(),
        balance: u.balance,
    });
    let straggler = users.last().map(|u| Standing {
        username: u.username.clone(),
        balance: u.balance,
    });

    Ok(ActivityFeed {
        last_trade,
        closing_soon,
        most_traded,
        highest_volume,
        leader,
        straggler,
    })
}
