//! Seed command - load demo players and the default admin

use crate::client::BoardClient;
use crate::style::*;
use anyhow::Result;

pub async fn run(client: &BoardClient) -> Result<()> {
    let resp = client.seed().await?;

    print_success(&resp.message);
    println!("Players created: {}", resp.players_created);
    println!(
        "Admin created:   {}",
        if resp.admin_created {
            style_green("yes")
        } else {
            style_dim("already present")
        }
    );

    Ok(())
}
