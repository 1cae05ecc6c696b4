//! Leaderboard Server
//!
//! Serves the points leaderboard API

use std::sync::Arc;

use leaderboard_service::{
    run_server, AppState, Config, LeaderboardStore, PgStore, SqliteStore, StorageBackend,
    TokenService,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Leaderboard Server");

    let config = Config::load()?;

    let secret = config.jwt_secret().map_err(|e| {
        error!("{}", e);
        e
    })?;
    let tokens = TokenService::with_ttl_days(&secret, config.auth.token_ttl_days);

    let store: Arc<dyn LeaderboardStore> = match config.storage_backend() {
        StorageBackend::Postgres(url) => {
            let store = PgStore::new(&url).await?;
            info!("PostgreSQL storage initialized");
            Arc::new(store)
        }
        StorageBackend::Sqlite(path) => {
            let store = SqliteStore::open(&path)?;
            info!("SQLite storage initialized at {}", path);
            Arc::new(store)
        }
    };

    if config.seed.enabled {
        info!("Seed endpoint enabled at /api/seed");
    }

    let state = Arc::new(AppState::new(store, tokens, config.seed.enabled));
    run_server(&config.host(), config.port(), state).await?;

    Ok(())
}
