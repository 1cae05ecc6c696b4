//! Leaderboard command

use crate::client::BoardClient;
use crate::style::*;
use anyhow::Result;
use leaderboard_service::models::RankedPlayer;

pub async fn run(client: &BoardClient, limit: usize) -> Result<()> {
    print_header("Leaderboard");

    let players = client.leaderboard().await?;
    if players.is_empty() {
        print_info("No players yet.");
        return Ok(());
    }

    print_table(&players, limit);
    println!();
    println!("Total players: {}", players.len());

    Ok(())
}

pub fn print_table(players: &[RankedPlayer], limit: usize) {
    println!();
    println!("{:>5}  {:<20}  {:>8}  Id", "Rank", "Name", "Points");
    println!("{}", "─".repeat(50));

    for player in players.iter().take(limit) {
        println!(
            "{:>5}  {:<20}  {:>8}  {}",
            style_rank(player.rank),
            player.name,
            player.total_points,
            style_dim(&short_id(&player.id))
        );
    }
}
