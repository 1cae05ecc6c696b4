mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use common::*;
use http_body_util::BodyExt;
use leaderboard_service::create_router;
use leaderboard_service::models::Role;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["token"].as_str().unwrap().to_string()
}

struct Fixture {
    app: Router,
    player_id: String,
    admin_id: String,
    player_token: String,
    admin_token: String,
}

async fn fixture() -> Fixture {
    let store = memory_store();
    let player = insert(&store, "Kamal", Role::Player, 0, "123456").await;
    let admin = insert(&store, "Admin", Role::Admin, 0, "admin123").await;
    let app = create_router(app_state(store, false));

    let player_token = login(&app, &player.email, "123456").await;
    let admin_token = login(&app, &admin.email, "admin123").await;

    Fixture {
        app,
        player_id: player.id,
        admin_id: admin.id,
        player_token,
        admin_token,
    }
}

#[tokio::test]
async fn test_health() {
    let app = create_router(app_state(memory_store(), false));
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["healthy"], true);
}

#[tokio::test]
async fn test_register_then_duplicate() {
    let app = create_router(app_state(memory_store(), false));
    let payload = json!({ "name": "Priya", "email": "priya@test.com", "password": "pw" });

    let (status, body) = send(&app, Method::POST, "/api/register", None, Some(payload.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Registered successfully");

    let (status, body) = send(&app, Method::POST, "/api/register", None, Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "conflict");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "email": "priya@test.com", "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "player");
    assert_eq!(body["name"], "Priya");
}

#[tokio::test]
async fn test_login_failures() {
    let f = fixture().await;

    let (status, body) = send(
        &f.app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "email": "nobody@test.com", "password": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");

    let (status, body) = send(
        &f.app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "email": "kamal@test.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Wrong password");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let f = fixture().await;

    for (method, uri) in [
        (Method::GET, "/api/leaderboard"),
        (Method::POST, "/api/claim"),
        (Method::GET, "/api/history"),
        (Method::GET, "/api/me"),
    ] {
        let (status, body) = send(&f.app, method.clone(), uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body["error"], "Token missing");

        let (status, body) = send(&f.app, method, uri, Some("not.a.token"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body["error"], "Invalid token");
    }

    let uri = format!("/api/player/{}", f.player_id);
    let (status, _) = send(&f.app, Method::DELETE, &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_from_other_secret_rejected() {
    let f = fixture().await;
    let other = leaderboard_service::TokenService::with_ttl_days("another-secret", 7);
    let account = leaderboard_service::models::Account {
        id: f.player_id.clone(),
        name: "Kamal".into(),
        email: "kamal@test.com".into(),
        role: Role::Player,
        total_points: 0,
        created_at: chrono::Utc::now(),
    };
    let forged = other.issue(&account).unwrap();

    let (status, _) = send(&f.app, Method::POST, "/api/claim", Some(&forged), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_player_claim_and_leaderboard() {
    let f = fixture().await;

    let (status, receipt) =
        send(&f.app, Method::POST, "/api/claim", Some(&f.player_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let points = receipt["points"].as_i64().unwrap();
    assert!((1..=10).contains(&points));
    assert_eq!(receipt["newTotal"], points);
    assert_eq!(receipt["updatedUser"], "Kamal");
    assert_eq!(receipt["userId"], f.player_id.as_str());
    assert_eq!(receipt["leaderboard"][0]["_id"], f.player_id.as_str());

    let (status, board) =
        send(&f.app, Method::GET, "/api/leaderboard", Some(&f.admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = board.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["rank"], 1);
    assert_eq!(rows[0]["totalPoints"], points);

    let (status, me) = send(&f.app, Method::GET, "/api/me", Some(&f.player_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["totalPoints"], points);
    assert!(me.get("passwordHash").is_none());
}

#[tokio::test]
async fn test_role_checks() {
    let f = fixture().await;

    let (status, body) = send(&f.app, Method::POST, "/api/claim", Some(&f.admin_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "authorization");

    let (status, _) = send(&f.app, Method::GET, "/api/history", Some(&f.player_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let uri = format!("/api/player/{}", f.admin_id);
    let (status, _) = send(&f.app, Method::DELETE, &uri, Some(&f.player_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_history_and_delete() {
    let f = fixture().await;

    for _ in 0..3 {
        let (status, _) = send(&f.app, Method::POST, "/api/claim", Some(&f.player_token), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, history) =
        send(&f.app, Method::GET, "/api/history", Some(&f.admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let entries = history.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|e| e["user"] == "Kamal"));
    assert!(entries.iter().all(|e| e["userId"] == f.player_id.as_str()));

    // Admin accounts and unknown ids are both reported as missing players
    let uri = format!("/api/player/{}", f.admin_id);
    let (status, _) = send(&f.app, Method::DELETE, &uri, Some(&f.admin_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) =
        send(&f.app, Method::DELETE, "/api/player/unknown", Some(&f.admin_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/api/player/{}", f.player_id);
    let (status, body) = send(&f.app, Method::DELETE, &uri, Some(&f.admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Player deleted");

    let (_, history) = send(&f.app, Method::GET, "/api/history", Some(&f.admin_token), None).await;
    assert!(history.as_array().unwrap().is_empty());

    let (_, board) = send(&f.app, Method::GET, "/api/leaderboard", Some(&f.admin_token), None).await;
    assert!(board.as_array().unwrap().is_empty());

    // The deleted player's token still verifies but the account is gone
    let (status, _) = send(&f.app, Method::POST, "/api/claim", Some(&f.player_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_seed_route_is_opt_in() {
    let disabled = create_router(app_state(memory_store(), false));
    let (status, _) = send(&disabled, Method::GET, "/api/seed", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let enabled = create_router(app_state(memory_store(), true));
    let (status, body) = send(&enabled, Method::GET, "/api/seed", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["playersCreated"], 10);
    assert_eq!(body["adminCreated"], true);

    let token = login(&enabled, "admin@leader.com", "admin123").await;
    let (status, board) = send(&enabled, Method::GET, "/api/leaderboard", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(board.as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_padded_email_logs_in_as_registered() {
    let app = create_router(app_state(memory_store(), false));

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/register",
        None,
        Some(json!({ "name": "Bob", "email": " bob@test.com", "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    for email in [" bob@test.com", "bob@test.com"] {
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/login",
            None,
            Some(json!({ "email": email, "password": "pw" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{email:?}: {body}");
        assert_eq!(body["name"], "Bob");
    }

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/register",
        None,
        Some(json!({ "name": "Bob2", "email": "bob@test.com ", "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "conflict");
}

#[tokio::test]
async fn test_incomplete_body_gets_structured_error() {
    let app = create_router(app_state(memory_store(), false));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/register",
        None,
        Some(json!({ "name": "Bob" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");
    assert!(body["error"].as_str().unwrap().contains("email"));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "email": "bob@test.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");
    assert!(body["error"].as_str().unwrap().contains("password"));

    // Not JSON at all, and no content type
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/login")
        .body(Body::from("email=bob"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["kind"], "validation");
}
