//! SQLite ledger adapter.
//!
//! Users, markets, and trades live in three related tables; trades reference
//! both by foreign key. Prices are the only persisted derived state, kept on
//! the market row. The two multi-row mutations (trade + debit, resolve +
//! credit-all) run inside explicit transactions; dropping an uncommitted
//! transaction rolls it back.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};

use crate::domain::error::LongshotError;
use crate::domain::market::{Market, MarketId, MarketStatus, NewMarket, Side};
use crate::domain::trade::{NewTrade, Trade};
use crate::domain::user::{User, UserId, STARTING_BALANCE};
use crate::ports::config_port::ConfigPort;
use crate::ports::ledger_port::LedgerPort;

const MARKET_COLUMNS: &str = "id, question, description, status, resolution, yes_price, \
                              no_price, creator_id, resolve_by, resolved_at, created_at";

pub struct SqliteLedger {
    pool: Pool<SqliteConnectionManager>,
}

fn pool_err(e: r2d2::Error) -> LongshotError {
    LongshotError::Database {
        reason: e.to_string(),
    }
}

fn query_err(e: rusqlite::Error) -> LongshotError {
    LongshotError::DatabaseQuery {
        reason: e.to_string(),
    }
}

fn parse_timestamp(value: &str, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn parse_side(value: &str, idx: usize) -> rusqlite::Result<Side> {
    value.parse::<Side>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

impl SqliteLedger {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, LongshotError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| LongshotError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let pool_size = config.get_int("sqlite", "pool_size", 4) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(pool_err)?;

        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, LongshotError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder().max_size(1).build(manager).map_err(pool_err)?;

        Ok(Self { pool })
    }

    pub fn initialize_schema(&self) -> Result<(), LongshotError> {
        let conn = self.pool.get().map_err(pool_err)?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                balance REAL NOT NULL,
                is_admin INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS markets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                question TEXT NOT NULL,
                description TEXT,
                status TEXT NOT NULL DEFAULT 'OPEN',
                resolution TEXT,
                yes_price REAL NOT NULL DEFAULT 0.5,
                no_price REAL NOT NULL DEFAULT 0.5,
                creator_id INTEGER NOT NULL REFERENCES users(id),
                resolve_by TEXT,
                resolved_at TEXT,
                created_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS trades (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id),
                market_id INTEGER NOT NULL REFERENCES markets(id),
                side TEXT NOT NULL,
                shares INTEGER NOT NULL,
                price REAL NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_trades_market ON trades(market_id);
            CREATE INDEX IF NOT EXISTS idx_trades_user ON trades(user_id);",
        )
        .map_err(query_err)?;

        Ok(())
    }

    /// Delete all rows in foreign-key order. Returns counts of deleted
    /// (trades, markets, users).
    pub fn reset(&self) -> Result<(usize, usize, usize), LongshotError> {
        let conn = self.pool.get().map_err(pool_err)?;
        let trades = conn.execute("DELETE FROM trades", []).map_err(query_err)?;
        let markets = conn.execute("DELETE FROM markets", []).map_err(query_err)?;
        let users = conn.execute("DELETE FROM users", []).map_err(query_err)?;
        Ok((trades, markets, users))
    }

    fn user_from_row(row: &rusqlite::Row) -> rusqlite::Result<User> {
        let created_at: String = row.get(5)?;
        Ok(User {
            id: row.get(0)?,
            username: row.get(1)?,
            password_hash: row.get(2)?,
            balance: row.get(3)?,
            is_admin: row.get(4)?,
            created_at: parse_timestamp(&created_at, 5)?,
        })
    }

    fn market_from_row(row: &rusqlite::Row) -> rusqlite::Result<Market> {
        let status_str: String = row.get(3)?;
        let status = MarketStatus::parse(&status_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                3,
                rusqlite::types::Type::Text,
                format!("unknown market status {status_str:?}").into(),
            )
        })?;
        let resolution = match row.get::<_, Option<String>>(4)? {
            Some(value) => Some(parse_side(&value, 4)?),
            None => None,
        };
        let resolve_by = match row.get::<_, Option<String>>(8)? {
            Some(value) => Some(parse_timestamp(&value, 8)?),
            None => None,
        };
        let resolved_at = match row.get::<_, Option<String>>(9)? {
            Some(value) => Some(parse_timestamp(&value, 9)?),
            None => None,
        };
        let created_at: String = row.get(10)?;

        Ok(Market {
            id: row.get(0)?,
            question: row.get(1)?,
            description: row.get(2)?,
            status,
            resolution,
            yes_price: row.get(5)?,
            no_price: row.get(6)?,
            creator_id: row.get(7)?,
            resolve_by,
            resolved_at,
            created_at: parse_timestamp(&created_at, 10)?,
        })
    }

    fn trade_from_row(row: &rusqlite::Row) -> rusqlite::Result<Trade> {
        let side: String = row.get(3)?;
        let created_at: String = row.get(6)?;
        Ok(Trade {
            id: row.get(0)?,
            user_id: row.get(1)?,
            market_id: row.get(2)?,
            side: parse_side(&side, 3)?,
            shares: row.get(4)?,
            price: row.get(5)?,
            created_at: parse_timestamp(&created_at, 6)?,
        })
    }

    fn collect_trades(
        &self,
        query: &str,
        id: i64,
    ) -> Result<Vec<Trade>, LongshotError> {
        let conn = self.pool.get().map_err(pool_err)?;
        let mut stmt = conn.prepare(query).map_err(query_err)?;
        let rows = stmt
            .query_map(params![id], Self::trade_from_row)
            .map_err(query_err)?;

        let mut trades = Vec::new();
        for row in rows {
            trades.push(row.map_err(query_err)?);
        }
        Ok(trades)
    }

    fn market_with_stat(
        &self,
        query: &str,
    ) -> Result<Option<(Market, i64)>, LongshotError> {
        let conn = self.pool.get().map_err(pool_err)?;
        conn.query_row(query, [], |row| {
            Ok((Self::market_from_row(row)?, row.get::<_, i64>(11)?))
        })
        .optional()
        .map_err(query_err)
    }
}

impl LedgerPort for SqliteLedger {
    fn create_user(&self, username: &str, password_hash: &str) -> Result<User, LongshotError> {
        let conn = self.pool.get().map_err(pool_err)?;
        let created_at = Utc::now();

        let result = conn.execute(
            "INSERT INTO users (username, password_hash, balance, is_admin, created_at)
             VALUES (?1, ?2, ?3, 0, ?4)",
            params![
                username,
                password_hash,
                STARTING_BALANCE,
                created_at.to_rfc3339()
            ],
        );

        match result {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                return Err(LongshotError::UsernameTaken {
                    username: username.to_string(),
                });
            }
            Err(e) => return Err(query_err(e)),
        }

        Ok(User {
            id: conn.last_insert_rowid(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            balance: STARTING_BALANCE,
            is_admin: false,
            created_at,
        })
    }

    fn get_user(&self, id: UserId) -> Result<Option<User>, LongshotError> {
        let conn = self.pool.get().map_err(pool_err)?;
        conn.query_row(
            "SELECT id, username, password_hash, balance, is_admin, created_at
             FROM users WHERE id = ?1",
            params![id],
            Self::user_from_row,
        )
        .optional()
        .map_err(query_err)
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>, LongshotError> {
        let conn = self.pool.get().map_err(pool_err)?;
        conn.query_row(
            "SELECT id, username, password_hash, balance, is_admin, created_at
             FROM users WHERE username = ?1",
            params![username],
            Self::user_from_row,
        )
        .optional()
        .map_err(query_err)
    }

    fn list_users_by_balance(&self) -> Result<Vec<User>, LongshotError> {
        let conn = self.pool.get().map_err(pool_err)?;
        let mut stmt = conn
            .prepare(
                "SELECT id, username, password_hash, balance, is_admin, created_at
                 FROM users ORDER BY balance DESC, id ASC",
            )
            .map_err(query_err)?;
        let rows = stmt.query_map([], Self::user_from_row).map_err(query_err)?;

        let mut users = Vec::new();
        for row in rows {
            users.push(row.map_err(query_err)?);
        }
        Ok(users)
    }

    fn set_admin(&self, username: &str, is_admin: bool) -> Result<(), LongshotError> {
        let conn = self.pool.get().map_err(pool_err)?;
        let updated = conn
            .execute(
                "UPDATE users SET is_admin = ?2 WHERE username = ?1",
                params![username, is_admin],
            )
            .map_err(query_err)?;
        if updated == 0 {
            return Err(LongshotError::UnknownUser {
                username: username.to_string(),
            });
        }
        Ok(())
    }

    fn create_market(&self, new: &NewMarket) -> Result<Market, LongshotError> {
        let conn = self.pool.get().map_err(pool_err)?;
        let created_at = Utc::now();

        conn.execute(
            "INSERT INTO markets (question, description, status, yes_price, no_price,
                                  creator_id, resolve_by, created_at)
             VALUES (?1, ?2, 'OPEN', 0.5, 0.5, ?3, ?4, ?5)",
            params![
                new.question,
                new.description,
                new.creator_id,
                new.resolve_by.map(|ts| ts.to_rfc3339()),
                created_at.to_rfc3339()
            ],
        )
        .map_err(query_err)?;

        Ok(Market {
            id: conn.last_insert_rowid(),
            question: new.question.clone(),
            description: new.description.clone(),
            status: MarketStatus::Open,
            resolution: None,
            yes_price: 0.5,
            no_price: 0.5,
            creator_id: new.creator_id,
            resolve_by: new.resolve_by,
            resolved_at: None,
            created_at,
        })
    }

    fn get_market(&self, id: MarketId) -> Result<Option<Market>, LongshotError> {
        let conn = self.pool.get().map_err(pool_err)?;
        conn.query_row(
            &format!("SELECT {MARKET_COLUMNS} FROM markets WHERE id = ?1"),
            params![id],
            Self::market_from_row,
        )
        .optional()
        .map_err(query_err)
    }

    fn list_markets(&self, status: Option<MarketStatus>) -> Result<Vec<Market>, LongshotError> {
        let conn = self.pool.get().map_err(pool_err)?;

        let mut query = format!("SELECT {MARKET_COLUMNS} FROM markets");
        if status.is_some() {
            query.push_str(" WHERE status = ?1");
        }
        query.push_str(" ORDER BY created_at DESC, id DESC");

        let mut stmt = conn.prepare(&query).map_err(query_err)?;
        let rows = match status {
            Some(status) => stmt
                .query_map(params![status.as_str()], Self::market_from_row)
                .map_err(query_err)?,
            None => stmt
                .query_map([], Self::market_from_row)
                .map_err(query_err)?,
        };

        let mut markets = Vec::new();
        for row in rows {
            markets.push(row.map_err(query_err)?);
        }
        Ok(markets)
    }

    fn update_prices(
        &self,
        id: MarketId,
        yes_price: f64,
        no_price: f64,
    ) -> Result<(), LongshotError> {
        let conn = self.pool.get().map_err(pool_err)?;
        conn.execute(
            "UPDATE markets SET yes_price = ?1, no_price = ?2 WHERE id = ?3",
            params![yes_price, no_price, id],
        )
        .map_err(query_err)?;
        Ok(())
    }

    fn trades_for_market(&self, id: MarketId) -> Result<Vec<Trade>, LongshotError> {
        self.collect_trades(
            "SELECT id, user_id, market_id, side, shares, price, created_at
             FROM trades WHERE market_id = ?1 ORDER BY id ASC",
            id,
        )
    }

    fn trades_for_user(&self, id: UserId) -> Result<Vec<Trade>, LongshotError> {
        self.collect_trades(
            "SELECT id, user_id, market_id, side, shares, price, created_at
             FROM trades WHERE user_id = ?1 ORDER BY id ASC",
            id,
        )
    }

    fn latest_trade(&self) -> Result<Option<Trade>, LongshotError> {
        let conn = self.pool.get().map_err(pool_err)?;
        conn.query_row(
            "SELECT id, user_id, market_id, side, shares, price, created_at
             FROM trades ORDER BY id DESC LIMIT 1",
            [],
            Self::trade_from_row,
        )
        .optional()
        .map_err(query_err)
    }

    fn record_trade(&self, new: &NewTrade, cost: f64) -> Result<Trade, LongshotError> {
        let mut conn = self.pool.get().map_err(pool_err)?;
        let created_at = Utc::now();

        let tx = conn.transaction().map_err(query_err)?;

        tx.execute(
            "INSERT INTO trades (user_id, market_id, side, shares, price, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                new.user_id,
                new.market_id,
                new.side.as_str(),
                new.shares,
                new.price,
                created_at.to_rfc3339()
            ],
        )
        .map_err(query_err)?;
        let trade_id = tx.last_insert_rowid();

        let debited = tx
            .execute(
                "UPDATE users SET balance = balance - ?1 WHERE id = ?2",
                params![cost, new.user_id],
            )
            .map_err(query_err)?;
        if debited == 0 {
            // Dropping the uncommitted transaction rolls the insert back.
            return Err(LongshotError::UserNotFound { id: new.user_id });
        }

        tx.commit().map_err(query_err)?;

        Ok(Trade {
            id: trade_id,
            user_id: new.user_id,
            market_id: new.market_id,
            side: new.side,
            shares: new.shares,
            price: new.price,
            created_at,
        })
    }

    fn apply_resolution(
        &self,
        id: MarketId,
        resolution: Side,
        resolved_at: DateTime<Utc>,
        payouts: &BTreeMap<UserId, f64>,
    ) -> Result<Market, LongshotError> {
        let mut conn = self.pool.get().map_err(pool_err)?;
        let tx = conn.transaction().map_err(query_err)?;

        // The status guard makes double resolution lose even if two callers
        // race past the engine's pre-check.
        let updated = tx
            .execute(
                "UPDATE markets SET status = 'RESOLVED', resolution = ?1, resolved_at = ?2
                 WHERE id = ?3 AND status = 'OPEN'",
                params![resolution.as_str(), resolved_at.to_rfc3339(), id],
            )
            .map_err(query_err)?;
        if updated == 0 {
            return Err(LongshotError::AlreadyResolved { id });
        }

        for (user_id, payout) in payouts {
            tx.execute(
                "UPDATE users SET balance = balance + ?1 WHERE id = ?2",
                params![payout, user_id],
            )
            .map_err(query_err)?;
        }

        tx.commit().map_err(query_err)?;
        drop(conn);

        self.get_market(id)?
            .ok_or(LongshotError::MarketNotFound { id })
    }

    fn soonest_closing_market(&self) -> Result<Option<Market>, LongshotError> {
        let conn = self.pool.get().map_err(pool_err)?;
        conn.query_row(
            &format!(
                "SELECT {MARKET_COLUMNS} FROM markets
                 WHERE status = 'OPEN' AND resolve_by IS NOT NULL
                 ORDER BY resolve_by ASC LIMIT 1"
            ),
            [],
            Self::market_from_row,
        )
        .optional()
        .map_err(query_err)
    }

    fn most_traded_market(&self) -> Result<Option<(Market, i64)>, LongshotError> {
        self.market_with_stat(
            "SELECT m.id, m.question, m.description, m.status, m.resolution, m.yes_price,
                    m.no_price, m.creator_id, m.resolve_by, m.resolved_at, m.created_at,
                    COUNT(t.id)
             FROM markets m LEFT JOIN trades t ON t.market_id = m.id
             WHERE m.status = 'OPEN'
             GROUP BY m.id
             ORDER BY COUNT(t.id) DESC, m.id ASC LIMIT 1",
        )
    }

    fn highest_volume_market(&self) -> Result<Option<(Market, i64)>, LongshotError> {
        self.market_with_stat(
            "SELECT m.id, m.question, m.description, m.status, m.resolution, m.yes_price,
                    m.no_price, m.creator_id, m.resolve_by, m.resolved_at, m.created_at,
                    COALESCE(SUM(t.shares), 0)
             FROM markets m LEFT JOIN trades t ON t.market_id = m.id
             WHERE m.status = 'OPEN'
             GROUP BY m.id
             ORDER BY COALESCE(SUM(t.shares), 0) DESC, m.id ASC LIMIT 1",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EmptyConfig;

    impl ConfigPort for EmptyConfig {
        fn get_string(&self, _section: &str, _key: &str) -> Option<String> {
            None
        }
        fn get_int(&self, _section: &str, _key: &str, default: i64) -> i64 {
            default
        }
        fn get_double(&self, _section: &str, _key: &str, default: f64) -> f64 {
            default
        }
        fn get_bool(&self, _section: &str, _key: &str, default: bool) -> bool {
            default
        }
    }

    fn test_ledger() -> SqliteLedger {
        let ledger = SqliteLedger::in_memory().unwrap();
        ledger.initialize_schema().unwrap();
        ledger
    }

    fn seed_user(ledger: &SqliteLedger, name: &str) -> User {
        ledger.create_user(name, "hash").unwrap()
    }

    fn seed_market(ledger: &SqliteLedger, creator: &User, question: &str) -> Market {
        ledger
            .create_market(&NewMarket {
                question: question.to_string(),
                description: None,
                creator_id: creator.id,
                resolve_by: None,
            })
            .unwrap()
    }

    #[test]
    fn from_config_missing_path() {
        let result = SqliteLedger::from_config(&EmptyConfig);
        match result {
            Err(LongshotError::ConfigMissing { section, key }) => {
                assert_eq!(section, "sqlite");
                assert_eq!(key, "path");
            }
            Err(other) => panic!("expected ConfigMissing, got: {other}"),
            Ok(_) => panic!("expected error, got Ok"),
        }
    }

    #[test]
    fn in_memory_initialization() {
        test_ledger();
    }

    #[test]
    fn create_user_starts_with_default_balance() {
        let ledger = test_ledger();
        let user = seed_user(&ledger, "alice");
        assert_eq!(user.balance, STARTING_BALANCE);
        assert!(!user.is_admin);

        let loaded = ledger.get_user(user.id).unwrap().unwrap();
        assert_eq!(loaded.username, "alice");
        assert_eq!(loaded.balance, STARTING_BALANCE);
    }

    #[test]
    fn duplicate_username_is_rejected() {
        let ledger = test_ledger();
        seed_user(&ledger, "alice");
        match ledger.create_user("alice", "other-hash") {
            Err(LongshotError::UsernameTaken { username }) => assert_eq!(username, "alice"),
            other => panic!("expected UsernameTaken, got {other:?}"),
        }
    }

    #[test]
    fn get_user_by_username_round_trips() {
        let ledger = test_ledger();
        let user = seed_user(&ledger, "bob");
        let loaded = ledger.get_user_by_username("bob").unwrap().unwrap();
        assert_eq!(loaded.id, user.id);
        assert!(ledger.get_user_by_username("nobody").unwrap().is_none());
    }

    #[test]
    fn set_admin_flags_user() {
        let ledger = test_ledger();
        let user = seed_user(&ledger, "alice");
        ledger.set_admin("alice", true).unwrap();
        assert!(ledger.get_user(user.id).unwrap().unwrap().is_admin);

        match ledger.set_admin("nobody", true) {
            Err(LongshotError::UnknownUser { username }) => assert_eq!(username, "nobody"),
            other => panic!("expected UnknownUser, got {other:?}"),
        }
    }

    #[test]
    fn new_market_opens_at_even_prices() {
        let ledger = test_ledger();
        let alice = seed_user(&ledger, "alice");
        let market = seed_market(&ledger, &alice, "Will it rain tomorrow?");

        assert_eq!(market.status, MarketStatus::Open);
        assert_eq!(market.yes_price, 0.5);
        assert_eq!(market.no_price, 0.5);
        assert!(market.resolution.is_none());

        let loaded = ledger.get_market(market.id).unwrap().unwrap();
        assert_eq!(loaded.question, "Will it rain tomorrow?");
        assert_eq!(loaded.creator_id, alice.id);
    }

    #[test]
    fn list_markets_filters_by_status() {
        let ledger = test_ledger();
        let alice = seed_user(&ledger, "alice");
        let open = seed_market(&ledger, &alice, "open one");
        let closed = seed_market(&ledger, &alice, "closed one");
        ledger
            .apply_resolution(closed.id, Side::Yes, Utc::now(), &BTreeMap::new())
            .unwrap();

        let all = ledger.list_markets(None).unwrap();
        assert_eq!(all.len(), 2);

        let open_only = ledger.list_markets(Some(MarketStatus::Open)).unwrap();
        assert_eq!(open_only.len(), 1);
        assert_eq!(open_only[0].id, open.id);

        let resolved_only = ledger.list_markets(Some(MarketStatus::Resolved)).unwrap();
        assert_eq!(resolved_only.len(), 1);
        assert_eq!(resolved_only[0].id, closed.id);
        assert_eq!(resolved_only[0].resolution, Some(Side::Yes));
    }

    #[test]
    fn record_trade_inserts_and_debits_atomically() {
        let ledger = test_ledger();
        let alice = seed_user(&ledger, "alice");
        let market = seed_market(&ledger, &alice, "q");

        let trade = ledger
            .record_trade(
                &NewTrade {
                    user_id: alice.id,
                    market_id: market.id,
                    side: Side::Yes,
                    shares: 10,
                    price: 0.5,
                },
                5.0,
            )
            .unwrap();

        assert_eq!(trade.shares, 10);
        assert_eq!(trade.side, Side::Yes);

        let balance = ledger.get_user(alice.id).unwrap().unwrap().balance;
        assert_eq!(balance, STARTING_BALANCE - 5.0);

        let trades = ledger.trades_for_market(market.id).unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].price, 0.5);
    }

    #[test]
    fn record_trade_rolls_back_when_debit_hits_no_user() {
        let ledger = test_ledger();
        let alice = seed_user(&ledger, "alice");
        let market = seed_market(&ledger, &alice, "q");

        let result = ledger.record_trade(
            &NewTrade {
                user_id: 9999,
                market_id: market.id,
                side: Side::No,
                shares: 3,
                price: 0.5,
            },
            1.5,
        );
        match result {
            Err(LongshotError::UserNotFound { id }) => assert_eq!(id, 9999),
            other => panic!("expected UserNotFound, got {other:?}"),
        }

        // The insert must not have survived the rollback.
        assert!(ledger.trades_for_market(market.id).unwrap().is_empty());
    }

    #[test]
    fn apply_resolution_credits_and_closes_once() {
        let ledger = test_ledger();
        let alice = seed_user(&ledger, "alice");
        let bob = seed_user(&ledger, "bob");
        let market = seed_market(&ledger, &alice, "q");

        let mut payouts = BTreeMap::new();
        payouts.insert(bob.id, 25.0);

        let resolved = ledger
            .apply_resolution(market.id, Side::No, Utc::now(), &payouts)
            .unwrap();
        assert_eq!(resolved.status, MarketStatus::Resolved);
        assert_eq!(resolved.resolution, Some(Side::No));
        assert!(resolved.resolved_at.is_some());

        let balance = ledger.get_user(bob.id).unwrap().unwrap().balance;
        assert_eq!(balance, STARTING_BALANCE + 25.0);

        // A second resolution attempt fails and pays nobody.
        match ledger.apply_resolution(market.id, Side::Yes, Utc::now(), &payouts) {
            Err(LongshotError::AlreadyResolved { id }) => assert_eq!(id, market.id),
            other => panic!("expected AlreadyResolved, got {other:?}"),
        }
        let balance = ledger.get_user(bob.id).unwrap().unwrap().balance;
        assert_eq!(balance, STARTING_BALANCE + 25.0);
    }

    #[test]
    fn latest_trade_returns_newest() {
        let ledger = test_ledger();
        let alice = seed_user(&ledger, "alice");
        let market = seed_market(&ledger, &alice, "q");

        assert!(ledger.latest_trade().unwrap().is_none());

        for shares in [1, 2, 3] {
            ledger
                .record_trade(
                    &NewTrade {
                        user_id: alice.id,
                        market_id: market.id,
                        side: Side::Yes,
                        shares,
                        price: 0.5,
                    },
                    0.5 * shares as f64,
                )
                .unwrap();
        }

        let latest = ledger.latest_trade().unwrap().unwrap();
        assert_eq!(latest.shares, 3);
    }

    #[test]
    fn market_stat_queries_pick_busiest_open_markets() {
        let ledger = test_ledger();
        let alice = seed_user(&ledger, "alice");
        let quiet = seed_market(&ledger, &alice, "quiet");
        let busy = seed_market(&ledger, &alice, "busy");

        for _ in 0..3 {
            ledger
                .record_trade(
                    &NewTrade {
                        user_id: alice.id,
                        market_id: busy.id,
                        side: Side::Yes,
                        shares: 10,
                        price: 0.5,
                    },
                    5.0,
                )
                .unwrap();
        }
        ledger
            .record_trade(
                &NewTrade {
                    user_id: alice.id,
                    market_id: quiet.id,
                    side: Side::No,
                    shares: 1,
                    price: 0.5,
                },
                0.5,
            )
            .unwrap();

        let (most_traded, count) = ledger.most_traded_market().unwrap().unwrap();
        assert_eq!(most_traded.id, busy.id);
        assert_eq!(count, 3);

        let (highest, total) = ledger.highest_volume_market().unwrap().unwrap();
        assert_eq!(highest.id, busy.id);
        assert_eq!(total, 30);
    }

    #[test]
    fn soonest_closing_skips_markets_without_target_date() {
        let ledger = test_ledger();
        let alice = seed_user(&ledger, "alice");
        seed_market(&ledger, &alice, "undated");
        assert!(ledger.soonest_closing_market().unwrap().is_none());

        let later = Utc::now() + chrono::Duration::days(7);
        let sooner = Utc::now() + chrono::Duration::days(1);
        ledger
            .create_market(&NewMarket {
                question: "later".into(),
                description: None,
                creator_id: alice.id,
                resolve_by: Some(later),
            })
            .unwrap();
        let expected = ledger
            .create_market(&NewMarket {
                question: "sooner".into(),
                description: None,
                creator_id: alice.id,
                resolve_by: Some(sooner),
            })
            .unwrap();

        let found = ledger.soonest_closing_market().unwrap().unwrap();
        assert_eq!(found.id, expected.id);
    }

    #[test]
    fn reset_clears_all_tables() {
        let ledger = test_ledger();
        let alice = seed_user(&ledger, "alice");
        let market = seed_market(&ledger, &alice, "q");
        ledger
            .record_trade(
                &NewTrade {
                    user_id: alice.id,
                    market_id: market.id,
                    side: Side::Yes,
                    shares: 1,
                    price: 0.5,
                },
                0.5,
            )
            .unwrap();

        let (trades, markets, users) = ledger.reset().unwrap();
        assert_eq!((trades, markets, users), (1, 1, 1));
        assert!(ledger.list_markets(None).unwrap().is_empty());
        assert!(ledger.list_users_by_balance().unwrap().is_empty());
    }
}
