//! Register command - create a player account

use crate::client::BoardClient;
use crate::style::*;
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Password};

pub async fn run(client: &BoardClient, name: &str, email: &str, password: Option<String>) -> Result<()> {
    print_header("Register");

    let password = match password {
        Some(p) => p,
        None => Password::with_theme(&ColorfulTheme::default())
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()?,
    };

    let resp = client.register(name, email, &password).await?;
    print_success(&resp.message);
    println!();
    println!("Log in with: board login {}", style_cyan(email));

    Ok(())
}
