//! Domain types shared by the store, the services and the HTTP layer
//!
//! Field names on the wire follow the leaderboard frontend (`_id`, camelCase).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account roles. Fixed at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Player,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Player => "player",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Self::Admin),
            "player" => Some(Self::Player),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account as exposed to clients. Carries no credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub total_points: i64,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn is_player(&self) -> bool {
        self.role == Role::Player
    }
}

/// Account row together with its password hash, as held by the store
#[derive(Debug, Clone)]
pub struct AccountRecord {
    pub account: Account,
    /// Argon2 PHC string
    pub password_hash: String,
}

/// One point-award event. Never mutated once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub account_id: String,
    pub points: i64,
    pub timestamp: DateTime<Utc>,
}

/// Claim history row with the account name resolved at read time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "userId")]
    pub account_id: String,
    pub user: String,
    pub points: i64,
    pub timestamp: DateTime<Utc>,
    /// Set when the account no longer exists and `user` is the placeholder
    #[serde(skip)]
    pub account_missing: bool,
}

/// Leaderboard row. `rank` is derived on every read and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedPlayer {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub total_points: i64,
    pub rank: u32,
}

/// Result of a successful claim
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimReceipt {
    pub message: String,
    #[serde(rename = "userId")]
    pub account_id: String,
    pub points: i64,
    pub new_total: i64,
    pub updated_user: String,
    pub leaderboard: Vec<RankedPlayer>,
}
