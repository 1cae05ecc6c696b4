//! Ranking Engine
//!
//! Rank is a pure function of the current player totals. Ties are broken by
//! account id so the same totals always produce the same order.

use std::sync::Arc;

use crate::error::Result;
use crate::models::{Account, RankedPlayer};
use crate::storage::LeaderboardStore;

/// Order players by total points (descending, then id ascending) and number them from 1
pub fn rank_players(accounts: Vec<Account>) -> Vec<RankedPlayer> {
    let mut players: Vec<Account> = accounts.into_iter().filter(Account::is_player).collect();

    players.sort_by(|a, b| {
        b.total_points
            .cmp(&a.total_points)
            .then_with(|| a.id.cmp(&b.id))
    });

    players
        .into_iter()
        .enumerate()
        .map(|(i, account)| RankedPlayer {
            id: account.id,
            name: account.name,
            total_points: account.total_points,
            rank: (i + 1) as u32,
        })
        .collect()
}

#[derive(Clone)]
pub struct RankingEngine {
    store: Arc<dyn LeaderboardStore>,
}

impl RankingEngine {
    pub fn new(store: Arc<dyn LeaderboardStore>) -> Self {
        Self { store }
    }

    pub async fn rank(&self) -> Result<Vec<RankedPlayer>> {
        let players = self.store.list_players().await?;
        Ok(rank_players(players))
    }
}
