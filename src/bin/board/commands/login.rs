//! Login command - exchange credentials for a session token

use crate::client::BoardClient;
use crate::style::*;
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Password};

pub async fn run(client: &BoardClient, email: &str, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => Password::with_theme(&ColorfulTheme::default())
            .with_prompt("Password")
            .interact()?,
    };

    let resp = client.login(email, &password).await?;

    print_success(&format!(
        "Logged in as {} ({})",
        style_bold(&resp.name),
        resp.role
    ));
    println!();
    println!("export BOARD_TOKEN={}", resp.token);
    println!();
    println!("{}", style_dim("The token is valid for 7 days by default."));

    Ok(())
}
