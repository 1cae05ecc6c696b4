//! Storage layer
//!
//! [`LeaderboardStore`] is the set of primitives the domain operations need.
//! Compound writes (claim, cascading delete) are single primitives so each
//! backend can make them atomic.
//!
//! [`SqliteStore`] is the embedded backend: one connection behind a mutex,
//! used for local runs and tests. See `pg_storage` for PostgreSQL.

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::{params, types::Type, Connection, OptionalExtension, Row};
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{Account, AccountRecord, ClaimRecord, HistoryEntry, Role};

/// Shown in history listings when a claim's account no longer exists
pub const DELETED_ACCOUNT_NAME: &str = "(deleted account)";

/// Outcome of [`LeaderboardStore::record_claim`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    Credited {
        record: ClaimRecord,
        name: String,
        new_total: i64,
    },
    UnknownAccount,
    NotAPlayer,
}

/// Outcome of [`LeaderboardStore::delete_player`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted { claims_removed: u64 },
    UnknownAccount,
    NotAPlayer,
}

#[async_trait]
pub trait LeaderboardStore: Send + Sync {
    /// Insert an account. Returns `false` if the email is already taken.
    async fn create_account(&self, record: &AccountRecord) -> Result<bool>;

    async fn find_account(&self, id: &str) -> Result<Option<AccountRecord>>;

    /// Exact, case-sensitive email lookup
    async fn find_account_by_email(&self, email: &str) -> Result<Option<AccountRecord>>;

    /// Remove the account row only. Fails while claim records still reference it.
    async fn delete_account(&self, id: &str) -> Result<bool>;

    async fn count_accounts(&self) -> Result<u64>;

    /// All player accounts, highest total first
    async fn list_players(&self) -> Result<Vec<Account>>;

    /// Atomically add `points` to a player's total and append the claim record
    async fn record_claim(
        &self,
        account_id: &str,
        points: i64,
        at: DateTime<Utc>,
    ) -> Result<ClaimOutcome>;

    /// Atomically remove a player together with all of its claim records
    async fn delete_player(&self, id: &str) -> Result<DeleteOutcome>;

    /// Claim history, most recent first
    async fn list_history(&self) -> Result<Vec<HistoryEntry>>;

    async fn claims_for_account(&self, account_id: &str) -> Result<Vec<ClaimRecord>>;
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL CHECK (role IN ('admin', 'player')),
    total_points INTEGER NOT NULL DEFAULT 0 CHECK (total_points >= 0),
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_accounts_role_points ON accounts (role, total_points DESC);

CREATE TABLE IF NOT EXISTS claim_records (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    account_id TEXT NOT NULL REFERENCES accounts (id),
    points INTEGER NOT NULL CHECK (points BETWEEN 1 AND 10),
    claimed_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_claim_records_account ON claim_records (account_id);
"#;

const ACCOUNT_COLUMNS: &str = "id, name, email, password_hash, role, total_points, created_at";

/// Fixed-width timestamps so that text ordering matches time ordering
fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_role(idx: usize, raw: &str) -> rusqlite::Result<Role> {
    Role::parse(raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, format!("unknown role {raw}").into())
    })
}

fn account_from_row(row: &Row<'_>) -> rusqlite::Result<AccountRecord> {
    let role: String = row.get(4)?;
    let created_at: String = row.get(6)?;
    Ok(AccountRecord {
        account: Account {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            role: parse_role(4, &role)?,
            total_points: row.get(5)?,
            created_at: parse_ts(6, &created_at)?,
        },
        password_hash: row.get(3)?,
    })
}

fn claim_from_row(row: &Row<'_>) -> rusqlite::Result<ClaimRecord> {
    let claimed_at: String = row.get(3)?;
    Ok(ClaimRecord {
        id: row.get(0)?,
        account_id: row.get(1)?,
        points: row.get(2)?,
        timestamp: parse_ts(3, &claimed_at)?,
    })
}

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        let store = Self::init(conn)?;
        info!("SQLite storage opened at {}", path.display());
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

#[async_trait]
impl LeaderboardStore for SqliteStore {
    async fn create_account(&self, record: &AccountRecord) -> Result<bool> {
        let conn = self.conn.lock();
        let account = &record.account;
        let inserted = conn.execute(
            "INSERT INTO accounts (id, name, email, password_hash, role, total_points, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT (email) DO NOTHING",
            params![
                account.id,
                account.name,
                account.email,
                record.password_hash,
                account.role.as_str(),
                account.total_points,
                format_ts(&account.created_at),
            ],
        )?;
        Ok(inserted > 0)
    }

    async fn find_account(&self, id: &str) -> Result<Option<AccountRecord>> {
        let conn = self.conn.lock();
        let record = conn
            .query_row(
                &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?1"),
                params![id],
                account_from_row,
            )
            .optional()?;
        Ok(record)
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<AccountRecord>> {
        let conn = self.conn.lock();
        let record = conn
            .query_row(
                &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = ?1"),
                params![email],
                account_from_row,
            )
            .optional()?;
        Ok(record)
    }

    async fn delete_account(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let removed = conn.execute("DELETE FROM accounts WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }

    async fn count_accounts(&self) -> Result<u64> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM accounts", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    async fn list_players(&self) -> Result<Vec<Account>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts
             WHERE role = 'player'
             ORDER BY total_points DESC, id ASC"
        ))?;

        let players = stmt
            .query_map([], account_from_row)?
            .map(|row| row.map(|record| record.account))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(players)
    }

    async fn record_claim(
        &self,
        account_id: &str,
        points: i64,
        at: DateTime<Utc>,
    ) -> Result<ClaimOutcome> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let credited: Option<(String, i64)> = tx
            .query_row(
                "UPDATE accounts SET total_points = total_points + ?1
                 WHERE id = ?2 AND role = 'player'
                 RETURNING name, total_points",
                params![points, account_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((name, new_total)) = credited else {
            let exists = tx
                .query_row(
                    "SELECT 1 FROM accounts WHERE id = ?1",
                    params![account_id],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();
            return Ok(if exists {
                ClaimOutcome::NotAPlayer
            } else {
                ClaimOutcome::UnknownAccount
            });
        };

        let record = ClaimRecord {
            id: Uuid::new_v4().to_string(),
            account_id: account_id.to_string(),
            points,
            timestamp: at,
        };
        tx.execute(
            "INSERT INTO claim_records (id, account_id, points, claimed_at) VALUES (?1, ?2, ?3, ?4)",
            params![record.id, record.account_id, record.points, format_ts(&record.timestamp)],
        )?;
        tx.commit()?;

        debug!("Claim {} credited {} points to {}", record.id, points, account_id);
        Ok(ClaimOutcome::Credited {
            record,
            name,
            new_total,
        })
    }

    async fn delete_player(&self, id: &str) -> Result<DeleteOutcome> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let role: Option<String> = tx
            .query_row("SELECT role FROM accounts WHERE id = ?1", params![id], |row| {
                row.get(0)
            })
            .optional()?;

        match role.as_deref().map(|r| parse_role(0, r)).transpose()? {
            None => return Ok(DeleteOutcome::UnknownAccount),
            Some(Role::Admin) => return Ok(DeleteOutcome::NotAPlayer),
            Some(Role::Player) => {}
        }

        let claims_removed =
            tx.execute("DELETE FROM claim_records WHERE account_id = ?1", params![id])? as u64;
        tx.execute("DELETE FROM accounts WHERE id = ?1", params![id])?;
        tx.commit()?;

        Ok(DeleteOutcome::Deleted { claims_removed })
    }

    async fn list_history(&self) -> Result<Vec<HistoryEntry>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT c.account_id, a.name, c.points, c.claimed_at
             FROM claim_records c
             LEFT JOIN accounts a ON a.id = c.account_id
             ORDER BY c.claimed_at DESC, c.seq DESC",
        )?;

        let history = stmt
            .query_map([], |row| {
                let name: Option<String> = row.get(1)?;
                let claimed_at: String = row.get(3)?;
                Ok(HistoryEntry {
                    account_id: row.get(0)?,
                    account_missing: name.is_none(),
                    user: name.unwrap_or_else(|| DELETED_ACCOUNT_NAME.to_string()),
                    points: row.get(2)?,
                    timestamp: parse_ts(3, &claimed_at)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(history)
    }

    async fn claims_for_account(&self, account_id: &str) -> Result<Vec<ClaimRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, account_id, points, claimed_at FROM claim_records
             WHERE account_id = ?1 ORDER BY claimed_at DESC, seq DESC",
        )?;

        let claims = stmt
            .query_map(params![account_id], claim_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(claims)
    }
}
