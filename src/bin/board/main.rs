//! Leaderboard CLI
//!
//! Command-line client for the Leaderboard Service.

mod client;
mod commands;
mod style;

use clap::{Parser, Subcommand};
use client::BoardClient;
use style::*;

#[derive(Parser)]
#[command(name = "board")]
#[command(version)]
#[command(about = "Leaderboard - claim points and climb the ranks", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Leaderboard server URL
    #[arg(
        short,
        long,
        env = "BOARD_URL",
        default_value = "http://localhost:5000",
        global = true
    )]
    url: String,

    /// Session token from `board login`
    #[arg(short, long, env = "BOARD_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a player account
    #[command(visible_alias = "r")]
    Register {
        name: String,
        email: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Log in and print a session token
    Login {
        email: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// View the leaderboard
    #[command(visible_alias = "lb")]
    Leaderboard {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Claim random points (players only)
    #[command(visible_alias = "c")]
    Claim,

    /// Show your account
    Me,

    /// Show the claim history (admins only)
    History {
        /// Number of entries to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },

    /// Delete a player and its claims (admins only)
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Load demo players and the default admin
    Seed,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt().with_env_filter("info").init();
    }

    let client = BoardClient::new(&cli.url, cli.token);

    let result = match cli.command {
        Commands::Register {
            name,
            email,
            password,
        } => commands::register::run(&client, &name, &email, password).await,
        Commands::Login { email, password } => {
            commands::login::run(&client, &email, password).await
        }
        Commands::Leaderboard { limit } => commands::leaderboard::run(&client, limit).await,
        Commands::Claim => commands::claim::run(&client).await,
        Commands::Me => commands::me::run(&client).await,
        Commands::History { limit } => commands::history::run(&client, limit).await,
        Commands::Delete { id, yes } => commands::delete::run(&client, &id, yes).await,
        Commands::Seed => commands::seed::run(&client).await,
    };

    if let Err(e) = result {
        print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
