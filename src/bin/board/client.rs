//! Leaderboard API Client
//!
//! Thin reqwest wrapper over the `/api` routes. Authenticated calls send the
//! session token as a bearer header.

use anyhow::{anyhow, bail, Result};
use leaderboard_service::models::{Account, ClaimReceipt, HistoryEntry, RankedPlayer};
use leaderboard_service::server::LoginResponse;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct RegisterBody<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedResponse {
    pub message: String,
    pub players_created: u32,
    pub admin_created: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

pub struct BoardClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl BoardClient {
    pub fn new(server_url: &str, token: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: server_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
        }
    }

    fn api_url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}/api/{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        match &self.token {
            Some(token) => Ok(request.bearer_auth(token)),
            None => bail!("Not logged in: pass --token or set BOARD_TOKEN"),
        }
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<MessageResponse> {
        let resp = self
            .client
            .post(self.api_url("register"))
            .json(&RegisterBody { name, email, password })
            .send()
            .await?;
        read_json(resp, "Registration failed").await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let resp = self
            .client
            .post(self.api_url("login"))
            .json(&LoginBody { email, password })
            .send()
            .await?;
        read_json(resp, "Login failed").await
    }

    pub async fn seed(&self) -> Result<SeedResponse> {
        let resp = self.client.get(self.api_url("seed")).send().await?;
        read_json(resp, "Seed failed").await
    }

    pub async fn leaderboard(&self) -> Result<Vec<RankedPlayer>> {
        let resp = self
            .authorized(self.client.get(self.api_url("leaderboard")))?
            .send()
            .await?;
        read_json(resp, "Failed to fetch leaderboard").await
    }

    pub async fn claim(&self) -> Result<ClaimReceipt> {
        let resp = self
            .authorized(self.client.post(self.api_url("claim")))?
            .send()
            .await?;
        read_json(resp, "Claim failed").await
    }

    pub async fn me(&self) -> Result<Account> {
        let resp = self
            .authorized(self.client.get(self.api_url("me")))?
            .send()
            .await?;
        read_json(resp, "Failed to fetch profile").await
    }

    pub async fn history(&self) -> Result<Vec<HistoryEntry>> {
        let resp = self
            .authorized(self.client.get(self.api_url("history")))?
            .send()
            .await?;
        read_json(resp, "Failed to fetch history").await
    }

    pub async fn delete_player(&self, id: &str) -> Result<MessageResponse> {
        let url = self.api_url(&format!("player/{}", id));
        let resp = self.authorized(self.client.delete(url))?.send().await?;
        read_json(resp, "Delete failed").await
    }
}

async fn read_json<T: DeserializeOwned>(resp: Response, context: &str) -> Result<T> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json().await?);
    }

    let text = resp.text().await.unwrap_or_else(|_| "Unknown error".into());
    Err(anyhow!("{} ({}): {}", context, status, error_message(&text)))
}

/// Pull the `error` field out of an error body, or fall back to the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error)
        .unwrap_or_else(|_| body.to_string())
}
