//! Me command - show the logged-in account

use crate::client::BoardClient;
use crate::style::*;
use anyhow::Result;

pub async fn run(client: &BoardClient) -> Result<()> {
    print_header("Profile");

    let account = client.me().await?;

    println!("Name:     {}", style_bold(&account.name));
    println!("Email:    {}", account.email);
    println!("Role:     {}", style_cyan(account.role.as_str()));
    println!("Points:   {}", style_green(&account.total_points.to_string()));
    println!("Id:       {}", style_dim(&account.id));
    println!("Joined:   {}", account.created_at.format("%Y-%m-%d %H:%M UTC"));

    Ok(())
}
