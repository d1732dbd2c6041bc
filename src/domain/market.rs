//! Markets and trade sides.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

use crate::domain::error::LongshotError;
use crate::domain::user::UserId;

pub type MarketId = i64;

/// Which outcome a share backs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Yes,
    No,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Yes => "YES",
            Side::No => "NO",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = LongshotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "YES" => Ok(Side::Yes),
            "NO" => Ok(Side::No),
            other => Err(LongshotError::InvalidSide {
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MarketStatus {
    Open,
    Resolved,
}

impl MarketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketStatus::Open => "OPEN",
            MarketStatus::Resolved => "RESOLVED",
        }
    }

    /// Lenient parse for query filters; unknown values mean "no filter".
    pub fn parse(s: &str) -> Option<MarketStatus> {
        match s {
            "OPEN" => Some(MarketStatus::Open),
            "RESOLVED" => Some(MarketStatus::Resolved),
            _ => None,
        }
    }
}

/// A binary-outcome market. Prices always sum to 1 while OPEN; the
/// resolution is unset until the market is RESOLVED, then set exactly once.
#[derive(Debug, Clone)]
pub struct Market {
    pub id: MarketId,
    pub question: String,
    pub description: Option<String>,
    pub status: MarketStatus,
    pub resolution: Option<Side>,
    pub yes_price: f64,
    pub no_price: f64,
    pub creator_id: UserId,
    /// Informational target date only; nothing resolves automatically.
    pub resolve_by: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Market {
    pub fn is_open(&self) -> bool {
        self.status == MarketStatus::Open
    }

    /// The currently persisted price for one side.
    pub fn price(&self, side: Side) -> f64 {
        match side {
            Side::Yes => self.yes_price,
            Side::No => self.no_price,
        }
    }
}

/// Fields supplied by the caller at market creation.
#[derive(Debug, Clone)]
pub struct NewMarket {
    pub question: String,
    pub description: Option<String>,
    pub creator_id: UserId,
    pub resolve_by: Option<DateTime<Utc>>,
}
