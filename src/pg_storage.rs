//! PostgreSQL Storage for the Leaderboard Service
//!
//! Persistent backend used when a `DATABASE_URL` is configured.
//! Compound writes run inside a transaction on a pooled connection.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_postgres::{
    Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime, Timeouts,
};
use tokio_postgres::{NoTls, Row};
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{Account, AccountRecord, ClaimRecord, HistoryEntry, Role};
use crate::storage::{ClaimOutcome, DeleteOutcome, LeaderboardStore, DELETED_ACCOUNT_NAME};

/// Database pool configuration
const DB_POOL_MAX_SIZE: usize = 20;
const DB_QUERY_TIMEOUT_SECS: u64 = 30;

/// Embedded migrations, applied in order and recorded in `schema_migrations`
const MIGRATIONS: &[(i32, &str, &str)] = &[(
    1,
    "001_schema",
    include_str!("../migrations/001_schema.sql"),
)];

const ACCOUNT_COLUMNS: &str = "id, name, email, password_hash, role, total_points, created_at";

fn account_from_row(row: &Row) -> Result<AccountRecord> {
    let role: String = row.try_get(4)?;
    Ok(AccountRecord {
        account: Account {
            id: row.try_get(0)?,
            name: row.try_get(1)?,
            email: row.try_get(2)?,
            role: Role::parse(&role).ok_or_else(|| anyhow::anyhow!("unknown role {role}"))?,
            total_points: row.try_get(5)?,
            created_at: row.try_get(6)?,
        },
        password_hash: row.try_get(3)?,
    })
}

/// Pool settings. The statement timeout is a startup option so every pooled
/// connection carries it.
fn pool_config(database_url: &str) -> Config {
    let mut config = Config::new();
    config.url = Some(database_url.to_string());
    config.options = Some(format!("-c statement_timeout={}s", DB_QUERY_TIMEOUT_SECS));

    config.manager = Some(ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    });

    config.pool = Some(PoolConfig {
        max_size: DB_POOL_MAX_SIZE,
        timeouts: Timeouts {
            wait: Some(Duration::from_secs(DB_QUERY_TIMEOUT_SECS)),
            create: Some(Duration::from_secs(10)),
            recycle: Some(Duration::from_secs(30)),
        },
        ..Default::default()
    });

    config
}

#[derive(Clone)]
pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    /// Create storage from a connection URL
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = pool_config(database_url).create_pool(Some(Runtime::Tokio1), NoTls)?;

        // Test connection
        let client = pool.get().await?;
        client.simple_query("SELECT 1").await?;
        drop(client);

        info!(
            "Connected to PostgreSQL (pool_size: {}, query_timeout: {}s)",
            DB_POOL_MAX_SIZE, DB_QUERY_TIMEOUT_SECS
        );

        let storage = Self { pool };
        storage.run_migrations().await?;

        Ok(storage)
    }

    /// Run embedded migrations
    async fn run_migrations(&self) -> Result<()> {
        let client = self.pool.get().await?;

        client
            .batch_execute(
                "CREATE TABLE IF NOT EXISTS schema_migrations (
                    version INTEGER PRIMARY KEY,
                    applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )",
            )
            .await?;

        for (version, name, sql) in MIGRATIONS {
            let applied: bool = client
                .query_one(
                    "SELECT EXISTS(SELECT 1 FROM schema_migrations WHERE version = $1)",
                    &[version],
                )
                .await?
                .get(0);

            if !applied {
                client.batch_execute(sql).await?;
                client
                    .execute(
                        "INSERT INTO schema_migrations (version) VALUES ($1)",
                        &[version],
                    )
                    .await?;
                info!("Applied migration {}", name);
            }
        }

        Ok(())
    }
}

#[async_trait]
impl LeaderboardStore for PgStore {
    // ========================================================================
    // ACCOUNTS
    // ========================================================================

    async fn create_account(&self, record: &AccountRecord) -> Result<bool> {
        let client = self.pool.get().await?;
        let account = &record.account;

        let inserted = client
            .execute(
                "INSERT INTO accounts (id, name, email, password_hash, role, total_points, created_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)
                 ON CONFLICT (email) DO NOTHING",
                &[
                    &account.id,
                    &account.name,
                    &account.email,
                    &record.password_hash,
                    &account.role.as_str(),
                    &account.total_points,
                    &account.created_at,
                ],
            )
            .await?;

        Ok(inserted > 0)
    }

    async fn find_account(&self, id: &str) -> Result<Option<AccountRecord>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"),
                &[&id],
            )
            .await?;

        row.as_ref().map(account_from_row).transpose()
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<AccountRecord>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1"),
                &[&email],
            )
            .await?;

        row.as_ref().map(account_from_row).transpose()
    }

    async fn delete_account(&self, id: &str) -> Result<bool> {
        let client = self.pool.get().await?;
        let removed = client
            .execute("DELETE FROM accounts WHERE id = $1", &[&id])
            .await?;
        Ok(removed > 0)
    }

    async fn count_accounts(&self) -> Result<u64> {
        let client = self.pool.get().await?;
        let count: i64 = client
            .query_one("SELECT COUNT(*) FROM accounts", &[])
            .await?
            .get(0);
        Ok(count as u64)
    }

    async fn list_players(&self) -> Result<Vec<Account>> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                &format!(
                    "SELECT {ACCOUNT_COLUMNS} FROM accounts
                     WHERE role = 'player'
                     ORDER BY total_points DESC, id ASC"
                ),
                &[],
            )
            .await?;

        rows.iter()
            .map(|row| account_from_row(row).map(|record| record.account))
            .collect()
    }

    // ========================================================================
    // CLAIMS
    // ========================================================================

    async fn record_claim(
        &self,
        account_id: &str,
        points: i64,
        at: DateTime<Utc>,
    ) -> Result<ClaimOutcome> {
        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;

        let credited = tx
            .query_opt(
                "UPDATE accounts SET total_points = total_points + $1
                 WHERE id = $2 AND role = 'player'
                 RETURNING name, total_points",
                &[&points, &account_id],
            )
            .await?;

        let Some(row) = credited else {
            let exists = tx
                .query_opt("SELECT 1 FROM accounts WHERE id = $1", &[&account_id])
                .await?
                .is_some();
            tx.rollback().await?;
            return Ok(if exists {
                ClaimOutcome::NotAPlayer
            } else {
                ClaimOutcome::UnknownAccount
            });
        };

        let name: String = row.try_get(0)?;
        let new_total: i64 = row.try_get(1)?;
        let record = ClaimRecord {
            id: Uuid::new_v4().to_string(),
            account_id: account_id.to_string(),
            points,
            timestamp: at,
        };

        tx.execute(
            "INSERT INTO claim_records (id, account_id, points, claimed_at) VALUES ($1, $2, $3, $4)",
            &[&record.id, &record.account_id, &record.points, &record.timestamp],
        )
        .await?;
        tx.commit().await?;

        debug!("Claim {} credited {} points to {}", record.id, points, account_id);
        Ok(ClaimOutcome::Credited {
            record,
            name,
            new_total,
        })
    }

    async fn delete_player(&self, id: &str) -> Result<DeleteOutcome> {
        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;

        // Row lock keeps a concurrent claim from slipping in between the two deletes
        let role: Option<String> = tx
            .query_opt("SELECT role FROM accounts WHERE id = $1 FOR UPDATE", &[&id])
            .await?
            .map(|row| row.try_get(0))
            .transpose()?;

        match role.as_deref().map(Role::parse) {
            None => {
                tx.rollback().await?;
                return Ok(DeleteOutcome::UnknownAccount);
            }
            Some(Some(Role::Player)) => {}
            Some(_) => {
                tx.rollback().await?;
                return Ok(DeleteOutcome::NotAPlayer);
            }
        }

        let claims_removed = tx
            .execute("DELETE FROM claim_records WHERE account_id = $1", &[&id])
            .await?;
        tx.execute("DELETE FROM accounts WHERE id = $1", &[&id])
            .await?;
        tx.commit().await?;

        Ok(DeleteOutcome::Deleted { claims_removed })
    }

    async fn list_history(&self) -> Result<Vec<HistoryEntry>> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                "SELECT c.account_id, a.name, c.points, c.claimed_at
                 FROM claim_records c
                 LEFT JOIN accounts a ON a.id = c.account_id
                 ORDER BY c.claimed_at DESC, c.seq DESC",
                &[],
            )
            .await?;

        rows.iter()
            .map(|row| -> Result<HistoryEntry> {
                let name: Option<String> = row.try_get(1)?;
                Ok(HistoryEntry {
                    account_id: row.try_get(0)?,
                    account_missing: name.is_none(),
                    user: name.unwrap_or_else(|| DELETED_ACCOUNT_NAME.to_string()),
                    points: row.try_get(2)?,
                    timestamp: row.try_get(3)?,
                })
            })
            .collect()
    }

    async fn claims_for_account(&self, account_id: &str) -> Result<Vec<ClaimRecord>> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                "SELECT id, account_id, points, claimed_at FROM claim_records
                 WHERE account_id = $1 ORDER BY claimed_at DESC, seq DESC",
                &[&account_id],
            )
            .await?;

        rows.iter()
            .map(|row| -> Result<ClaimRecord> {
                Ok(ClaimRecord {
                    id: row.try_get(0)?,
                    account_id: row.try_get(1)?,
                    points: row.try_get(2)?,
                    timestamp: row.try_get(3)?,
                })
            })
            .collect()
    }
}
