//! Admin Operations
//!
//! Player removal (with its claim history), the audit listing, and profile lookup.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::models::{Account, HistoryEntry};
use crate::storage::{DeleteOutcome, LeaderboardStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedPlayer {
    pub claims_removed: u64,
}

#[derive(Clone)]
pub struct AdminOps {
    store: Arc<dyn LeaderboardStore>,
}

impl AdminOps {
    pub fn new(store: Arc<dyn LeaderboardStore>) -> Self {
        Self { store }
    }

    /// Delete a player and every claim record it owns as one unit.
    ///
    /// Admin accounts and unknown ids are refused and nothing changes.
    pub async fn delete_player(&self, id: &str) -> Result<DeletedPlayer> {
        match self.store.delete_player(id).await? {
            DeleteOutcome::Deleted { claims_removed } => {
                info!("Deleted player {} and {} claim records", id, claims_removed);
                Ok(DeletedPlayer { claims_removed })
            }
            DeleteOutcome::UnknownAccount => Err(AppError::NotFound("Player not found".into())),
            DeleteOutcome::NotAPlayer => Err(AppError::NotAPlayer("Player not found".into())),
        }
    }

    /// Full claim history, most recent first
    pub async fn list_history(&self) -> Result<Vec<HistoryEntry>> {
        let history = self.store.list_history().await?;

        let dangling = history.iter().filter(|entry| entry.account_missing).count();
        if dangling > 0 {
            warn!("{} claim records reference missing accounts", dangling);
        }

        Ok(history)
    }

    /// The caller's own account, without its credential
    pub async fn get_profile(&self, principal_id: &str) -> Result<Account> {
        self.store
            .find_account(principal_id)
            .await?
            .map(|record| record.account)
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::{AccountRecord, Role};
    use crate::storage::SqliteStore;
    use chrono::Utc;

    async fn store_with(accounts: &[(&str, Role)]) -> (Arc<dyn LeaderboardStore>, Vec<String>) {
        let store: Arc<dyn LeaderboardStore> = Arc::new(SqliteStore::in_memory().unwrap());
        let mut ids = Vec::new();
        for (name, role) in accounts {
            let record = AccountRecord {
                account: Account {
                    id: uuid::Uuid::new_v4().to_string(),
                    name: name.to_string(),
                    email: format!("{}@test.com", name.to_lowercase()),
                    role: *role,
                    total_points: 0,
                    created_at: Utc::now(),
                },
                password_hash: "$argon2id$placeholder".to_string(),
            };
            store.create_account(&record).await.unwrap();
            ids.push(record.account.id);
        }
        (store, ids)
    }

    #[tokio::test]
    async fn test_delete_player_removes_history() {
        let (store, ids) = store_with(&[("Nisha", Role::Player), ("Aman", Role::Player)]).await;
        store.record_claim(&ids[0], 3, Utc::now()).await.unwrap();
        store.record_claim(&ids[0], 7, Utc::now()).await.unwrap();
        store.record_claim(&ids[1], 2, Utc::now()).await.unwrap();

        let admin = AdminOps::new(store.clone());
        let deleted = admin.delete_player(&ids[0]).await.unwrap();
        assert_eq!(deleted.claims_removed, 2);

        let history = admin.list_history().await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].user, "Aman");
        assert!(admin.get_profile(&ids[0]).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_refuses_admin_and_unknown() {
        let (store, ids) = store_with(&[("Admin", Role::Admin)]).await;
        let admin = AdminOps::new(store.clone());

        let err = admin.delete_player(&ids[0]).await.unwrap_err();
        assert_eq!(err.status().as_u16(), 404);
        assert!(store.find_account(&ids[0]).await.unwrap().is_some());

        let err = admin.delete_player("no-such-id").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_get_profile_omits_credential() {
        let (store, ids) = store_with(&[("Divya", Role::Player)]).await;
        let admin = AdminOps::new(store);

        let profile = admin.get_profile(&ids[0]).await.unwrap();
        assert_eq!(profile.name, "Divya");

        let json = serde_json::to_value(&profile).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password").is_none());
    }
}
