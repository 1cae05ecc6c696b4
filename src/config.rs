//! Configuration management
//!
//! Loads configuration from config.toml with support for:
//! - Server binding settings
//! - Storage backend selection (PostgreSQL URL or SQLite file)
//! - Session token secret and lifetime
//! - The demo seed endpoint toggle

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::token::DEFAULT_TOKEN_TTL_DAYS;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

/// Main configuration structure matching config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL URL; empty selects SQLite
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_sqlite_path")]
    pub sqlite_path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            sqlite_path: default_sqlite_path(),
        }
    }
}

fn default_sqlite_path() -> String {
    "leaderboard.db".to_string()
}

/// Session token settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_ttl_days")]
    pub token_ttl_days: i64,
}

fn default_ttl_days() -> i64 {
    DEFAULT_TOKEN_TTL_DAYS
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedConfig {
    #[serde(default)]
    pub enabled: bool,
}

/// Which store the server should open
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres(String),
    Sqlite(String),
}

impl Config {
    /// Load from config.toml or use defaults
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    /// Load from specific path
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read config file")?;
            Self::parse(&content).context("Failed to parse config file")
        } else {
            // Use embedded default config
            Self::parse(DEFAULT_CONFIG).context("Failed to parse default config")
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Bind host (SERVER_HOST env var takes precedence)
    pub fn host(&self) -> String {
        env_non_empty("SERVER_HOST").unwrap_or_else(|| self.server.host.clone())
    }

    /// Bind port (SERVER_PORT env var takes precedence)
    pub fn port(&self) -> u16 {
        env_non_empty("SERVER_PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(self.server.port)
    }

    /// Storage backend (DATABASE_URL env var takes precedence)
    pub fn storage_backend(&self) -> StorageBackend {
        match env_non_empty("DATABASE_URL") {
            Some(url) => StorageBackend::Postgres(url),
            None if !self.database.url.is_empty() => {
                StorageBackend::Postgres(self.database.url.clone())
            }
            None => StorageBackend::Sqlite(self.database.sqlite_path.clone()),
        }
    }

    /// Token signing secret (JWT_SECRET env var takes precedence, required)
    pub fn jwt_secret(&self) -> Result<String> {
        match env_non_empty("JWT_SECRET") {
            Some(secret) => Ok(secret),
            None if !self.auth.jwt_secret.is_empty() => Ok(self.auth.jwt_secret.clone()),
            None => bail!("JWT secret not configured: set JWT_SECRET or auth.jwt_secret"),
        }
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_default_parses() {
        let config = Config::parse(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.auth.token_ttl_days, 7);
        assert!(config.database.url.is_empty());
        assert!(!config.seed.enabled);
    }

    #[test]
    fn test_optional_sections_default() {
        let config = Config::parse(
            r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [auth]
            jwt_secret = "from-file"
            "#,
        )
        .unwrap();

        assert_eq!(config.database.sqlite_path, "leaderboard.db");
        assert_eq!(config.auth.token_ttl_days, DEFAULT_TOKEN_TTL_DAYS);
        assert!(!config.seed.enabled);
        assert_eq!(config.auth.jwt_secret, "from-file");
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let config = Config::load_from("/definitely/not/here.toml").unwrap();
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[server]\nhost = \"localhost\"\nport = 7000\n\n[database]\nurl = \"postgres://db/board\"\n\n[auth]\njwt_secret = \"s\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.server.port, 7000);
        assert_eq!(config.database.url, "postgres://db/board");
    }
}
