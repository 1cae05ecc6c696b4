//! Points Ledger
//!
//! A claim draws 1..=10 points and credits them through the store's atomic
//! claim primitive. The total increment and the history append commit
//! together or not at all. Concurrent claims on one account never lose an
//! update.

use std::ops::RangeInclusive;
use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use tracing::{error, info};

use crate::error::{AppError, Result};
use crate::models::ClaimReceipt;
use crate::ranking::RankingEngine;
use crate::storage::{ClaimOutcome, LeaderboardStore};

/// Points awarded per claim, inclusive on both ends
pub const CLAIM_POINTS: RangeInclusive<i64> = 1..=10;

/// Draw a claim award uniformly from [`CLAIM_POINTS`]
pub fn draw_points() -> i64 {
    rand::thread_rng().gen_range(CLAIM_POINTS)
}

#[derive(Clone)]
pub struct PointsLedger {
    store: Arc<dyn LeaderboardStore>,
    ranking: RankingEngine,
}

impl PointsLedger {
    pub fn new(store: Arc<dyn LeaderboardStore>, ranking: RankingEngine) -> Self {
        Self { store, ranking }
    }

    /// Credit a random award to `account_id`.
    ///
    /// The caller must already have checked that the principal is a player.
    pub async fn claim(&self, account_id: &str) -> Result<ClaimReceipt> {
        let points = draw_points();

        let outcome = self
            .store
            .record_claim(account_id, points, Utc::now())
            .await
            .map_err(|e| {
                error!(
                    "Claim of {} points for {} failed and was rolled back: {:#}",
                    points, account_id, e
                );
                AppError::Storage(e)
            })?;

        let (name, new_total) = match outcome {
            ClaimOutcome::Credited {
                name, new_total, ..
            } => (name, new_total),
            ClaimOutcome::UnknownAccount => {
                return Err(AppError::NotFound("User not found".into()));
            }
            ClaimOutcome::NotAPlayer => {
                return Err(AppError::NotAPlayer("Only players can claim".into()));
            }
        };

        info!("{} claimed {} points (total {})", name, points, new_total);

        let leaderboard = self.ranking.rank().await?;

        Ok(ClaimReceipt {
            message: "Points claimed".to_string(),
            account_id: account_id.to_string(),
            points,
            new_total,
            updated_user: name,
            leaderboard,
        })
    }
}
