//! Leaderboard Service - Players claim random points and climb a shared ranking
//!
//! Accounts register with email and password, log in for a signed session
//! token, and players then claim between 1 and 10 points at a time. Every
//! claim is kept in an append-only ledger that admins can audit.
//!
//! # How it works
//!
//! 1. A player registers and logs in to receive a bearer token
//! 2. `POST /api/claim` credits a random amount and records the claim
//! 3. `GET /api/leaderboard` ranks players by total points
//! 4. Admins read the claim history and can delete players with their claims
//!
//! # Consistency
//!
//! - A claim credits the total and appends the record in one transaction
//! - Concurrent claims for the same player never lose an increment
//! - Deleting a player removes the account and all its claims, or nothing

pub mod admin;
pub mod auth;
pub mod config;
pub mod credentials;
pub mod error;
pub mod ledger;
pub mod models;
pub mod password;
pub mod pg_storage;
pub mod ranking;
pub mod seed;
pub mod server;
pub mod storage;
pub mod token;

pub use admin::AdminOps;
pub use config::{Config, StorageBackend};
pub use credentials::CredentialStore;
pub use error::{AppError, ErrorKind};
pub use ledger::{PointsLedger, CLAIM_POINTS};
pub use models::{Account, ClaimReceipt, ClaimRecord, HistoryEntry, RankedPlayer, Role};
pub use pg_storage::PgStore;
pub use ranking::{rank_players, RankingEngine};
pub use server::{create_router, run_server, AppState};
pub use storage::{LeaderboardStore, SqliteStore};
pub use token::{Principal, TokenService};
