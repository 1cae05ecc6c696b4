//! History command - admin audit of every claim

use crate::client::BoardClient;
use crate::style::*;
use anyhow::Result;

pub async fn run(client: &BoardClient, limit: usize) -> Result<()> {
    print_header("Claim History");

    let entries = client.history().await?;
    if entries.is_empty() {
        print_info("No claims recorded yet.");
        return Ok(());
    }

    println!();
    println!("{:<20}  {:<20}  {:>6}", "When", "Player", "Points");
    println!("{}", "─".repeat(50));

    for entry in entries.iter().take(limit) {
        println!(
            "{:<20}  {:<20}  {:>6}",
            style_dim(&entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()),
            entry.user,
            style_green(&format!("+{}", entry.points))
        );
    }

    println!();
    println!("Showing {} of {} claims", entries.len().min(limit), entries.len());

    Ok(())
}
