#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use leaderboard_service::models::{Account, AccountRecord, Role};
use leaderboard_service::password::hash_password;
use leaderboard_service::{AppState, LeaderboardStore, SqliteStore, TokenService};
use uuid::Uuid;

pub const SECRET: &str = "integration-test-secret";

pub fn record(name: &str, role: Role, total_points: i64, password_hash: &str) -> AccountRecord {
    AccountRecord {
        account: Account {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: format!("{}@test.com", name.to_lowercase()),
            role,
            total_points,
            created_at: Utc::now(),
        },
        password_hash: password_hash.to_string(),
    }
}

pub fn memory_store() -> Arc<dyn LeaderboardStore> {
    Arc::new(SqliteStore::in_memory().unwrap())
}

/// Insert an account whose password is `password`
pub async fn insert(
    store: &Arc<dyn LeaderboardStore>,
    name: &str,
    role: Role,
    total_points: i64,
    password: &str,
) -> Account {
    let hash = hash_password(password.to_string()).await.unwrap();
    let rec = record(name, role, total_points, &hash);
    assert!(store.create_account(&rec).await.unwrap());
    rec.account
}

pub fn app_state(store: Arc<dyn LeaderboardStore>, seed_enabled: bool) -> Arc<AppState> {
    Arc::new(AppState::new(
        store,
        TokenService::with_ttl_days(SECRET, 7),
        seed_enabled,
    ))
}
