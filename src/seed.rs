//! Demo data seeder
//!
//! Bulk-inserts ten players and one admin. Writes go straight to the store,
//! which is the only way to create an admin account. Safe to call repeatedly.

use chrono::Utc;
use futures::future::try_join_all;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Account, AccountRecord, Role};
use crate::password::hash_password;
use crate::storage::LeaderboardStore;

pub const SEED_PLAYERS: [&str; 10] = [
    "Rahul", "Kamal", "Sanak", "Priya", "Ravi", "Ankit", "Nisha", "Aman", "Divya", "Tarun",
];
pub const SEED_PLAYER_PASSWORD: &str = "123456";

pub const SEED_ADMIN_NAME: &str = "Admin";
pub const SEED_ADMIN_EMAIL: &str = "admin@leader.com";
pub const SEED_ADMIN_PASSWORD: &str = "admin123";

/// Players are only seeded while the store holds fewer accounts than this
const SEED_THRESHOLD: u64 = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    pub players_created: u32,
    pub admin_created: bool,
}

fn seed_email(name: &str) -> String {
    format!("{}@test.com", name.to_lowercase())
}

fn new_record(name: &str, email: String, role: Role, password_hash: String) -> AccountRecord {
    AccountRecord {
        account: Account {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email,
            role,
            total_points: 0,
            created_at: Utc::now(),
        },
        password_hash,
    }
}

pub async fn seed(store: &dyn LeaderboardStore) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    if store.count_accounts().await? < SEED_THRESHOLD {
        let hashes = try_join_all(
            SEED_PLAYERS
                .iter()
                .map(|_| hash_password(SEED_PLAYER_PASSWORD.to_string())),
        )
        .await?;

        for (name, password_hash) in SEED_PLAYERS.iter().zip(hashes) {
            let record = new_record(name, seed_email(name), Role::Player, password_hash);
            if store.create_account(&record).await? {
                report.players_created += 1;
            }
        }
    }

    if store.find_account_by_email(SEED_ADMIN_EMAIL).await?.is_none() {
        let password_hash = hash_password(SEED_ADMIN_PASSWORD.to_string()).await?;
        let record = new_record(
            SEED_ADMIN_NAME,
            SEED_ADMIN_EMAIL.to_string(),
            Role::Admin,
            password_hash,
        );
        report.admin_created = store.create_account(&record).await?;
    }

    info!(
        "Seed complete: {} players created, admin created: {}",
        report.players_created, report.admin_created
    );
    Ok(report)
}
