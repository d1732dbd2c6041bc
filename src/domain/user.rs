//! User accounts and point balances.

use chrono::{DateTime, Utc};

pub type UserId = i64;

/// Points granted to every account at signup.
pub const STARTING_BALANCE: f64 = 1000.0;

/// A registered user. The balance is debited by trades and credited by
/// resolutions; it can only go negative through the documented concurrent
/// trade race, never through a single checked trade.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
    pub balance: f64,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}
