//! Leaderboard HTTP Server
//!
//! JSON endpoints under `/api`. Protected routes take an [`AuthUser`], so a
//! missing or bad token is answered with 401 before the handler runs.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::admin::AdminOps;
use crate::auth::{require_role, AuthUser};
use crate::credentials::CredentialStore;
use crate::error::{ApiJson, Result};
use crate::ledger::PointsLedger;
use crate::models::{Account, ClaimReceipt, HistoryEntry, RankedPlayer, Role};
use crate::ranking::RankingEngine;
use crate::seed::{seed, SeedReport};
use crate::storage::LeaderboardStore;
use crate::token::TokenService;

pub struct AppState {
    pub store: Arc<dyn LeaderboardStore>,
    pub tokens: TokenService,
    pub credentials: CredentialStore,
    pub ranking: RankingEngine,
    pub ledger: PointsLedger,
    pub admin: AdminOps,
    pub seed_enabled: bool,
    pub started_at: Instant,
}

impl AppState {
    /// Wire every component onto one shared store
    pub fn new(store: Arc<dyn LeaderboardStore>, tokens: TokenService, seed_enabled: bool) -> Self {
        let ranking = RankingEngine::new(store.clone());
        Self {
            credentials: CredentialStore::new(store.clone()),
            ledger: PointsLedger::new(store.clone(), ranking.clone()),
            admin: AdminOps::new(store.clone()),
            ranking,
            store,
            tokens,
            seed_enabled,
            started_at: Instant::now(),
        }
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let mut api: Router<Arc<AppState>> = Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/leaderboard", get(leaderboard_handler))
        .route("/claim", post(claim_handler))
        .route("/player/:id", delete(delete_player_handler))
        .route("/history", get(history_handler))
        .route("/me", get(me_handler));

    if state.seed_enabled {
        api = api.route("/seed", get(seed_handler));
    }

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ============================================================================
// Request / response bodies
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedResponse {
    pub message: String,
    #[serde(flatten)]
    pub report: SeedReport,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub uptime_secs: u64,
    pub version: String,
}

// ============================================================================
// Handlers
// ============================================================================

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        healthy: true,
        uptime_secs: state.started_at.elapsed().as_secs(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn register_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<Json<MessageResponse>> {
    state
        .credentials
        .register(request.name, request.email, request.password)
        .await?;

    Ok(Json(MessageResponse {
        message: "Registered successfully".to_string(),
    }))
}

async fn login_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let account = state
        .credentials
        .verify_login(&request.email, request.password)
        .await?;
    let token = state.tokens.issue(&account)?;

    info!("Login: {} ({})", account.name, account.role);
    Ok(Json(LoginResponse {
        token,
        role: account.role,
        name: account.name,
    }))
}

async fn seed_handler(State(state): State<Arc<AppState>>) -> Result<Json<SeedResponse>> {
    let report = seed(state.store.as_ref()).await?;

    Ok(Json(SeedResponse {
        message: "Seeded players and admin".to_string(),
        report,
    }))
}

async fn leaderboard_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(_): AuthUser,
) -> Result<Json<Vec<RankedPlayer>>> {
    Ok(Json(state.ranking.rank().await?))
}

async fn claim_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
) -> Result<Json<ClaimReceipt>> {
    require_role(&principal, Role::Player)?;
    Ok(Json(state.ledger.claim(&principal.id).await?))
}

async fn delete_player_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    require_role(&principal, Role::Admin)?;
    state.admin.delete_player(&id).await?;

    info!("Admin {} deleted player {}", principal.id, id);
    Ok(Json(MessageResponse {
        message: "Player deleted".to_string(),
    }))
}

async fn history_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
) -> Result<Json<Vec<HistoryEntry>>> {
    require_role(&principal, Role::Admin)?;
    Ok(Json(state.admin.list_history().await?))
}

async fn me_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
) -> Result<Json<Account>> {
    Ok(Json(state.admin.get_profile(&principal.id).await?))
}

/// Run the server
pub async fn run_server(host: &str, port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);
    let addr = format!("{}:{}", host, port);

    info!("Starting Leaderboard server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
