//! Delete command - admin removal of a player and its claims

use crate::client::BoardClient;
use crate::style::*;
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm};

pub async fn run(client: &BoardClient, id: &str, yes: bool) -> Result<()> {
    if !yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Delete player {} and all of its claims?", id))
            .default(false)
            .interact()?;
        if !confirmed {
            print_info("Cancelled.");
            return Ok(());
        }
    }

    let resp = client.delete_player(id).await?;
    print_success(&resp.message);

    Ok(())
}
