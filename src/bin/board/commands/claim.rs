//! Claim command - draw random points for the logged-in player

use crate::client::BoardClient;
use crate::style::*;
use anyhow::Result;
use leaderboard_service::models::{ClaimReceipt, RankedPlayer};

pub async fn run(client: &BoardClient) -> Result<()> {
    let receipt = client.claim().await?;

    print_success(&format!(
        "{} claimed {} points",
        receipt.updated_user,
        style_green(&format!("+{}", receipt.points))
    ));
    println!("New total: {}", style_bold(&receipt.new_total.to_string()));

    if let Some(me) = own_row(&receipt) {
        println!("Rank:      {}", style_rank(me.rank));
    }

    super::leaderboard::print_table(&receipt.leaderboard, 10);

    Ok(())
}

/// The claimant's row in the fresh leaderboard
fn own_row(receipt: &ClaimReceipt) -> Option<&RankedPlayer> {
    receipt
        .leaderboard
        .iter()
        .find(|p| p.id == receipt.account_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, total_points: i64, rank: u32) -> RankedPlayer {
        RankedPlayer {
            id: id.to_string(),
            name: "Ravi".to_string(),
            total_points,
            rank,
        }
    }

    #[test]
    fn test_own_row_matches_by_id_not_name() {
        let receipt = ClaimReceipt {
            message: "Points claimed".to_string(),
            account_id: "second".to_string(),
            points: 4,
            new_total: 9,
            updated_user: "Ravi".to_string(),
            leaderboard: vec![row("first", 9, 1), row("second", 9, 2)],
        };

        assert_eq!(own_row(&receipt).map(|p| p.rank), Some(2));
    }
}
