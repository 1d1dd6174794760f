use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;

use jobtrack_backend::config::{Config, StoreBackend};
use jobtrack_backend::store::memory::{MemJobStore, MemUserStore};
use jobtrack_backend::{app, AppState};

fn test_config() -> Config {
    Config {
        server_address: "127.0.0.1:0".to_string(),
        store_backend: StoreBackend::Memory,
        database_url: None,
        jwt_secret: "integration-test-secret".to_string(),
        jwt_ttl_secs: 3600,
        google_client_id: None,
        client_origin: None,
    }
}

fn app_with(config: Config) -> Router {
    let state = AppState::new(
        config,
        Arc::new(MemUserStore::new()),
        Arc::new(MemJobStore::new()),
    );
    app(state)
}

fn test_app() -> Router {
    app_with(test_config())
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<JsonValue>,
) -> (StatusCode, JsonValue) {
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
    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let body = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn register(app: &Router, name: &str, email: &str, password: &str) -> JsonValue {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "name": name, "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
    body
}

#[tokio::test]
async fn register_returns_a_working_token() {
    let app = test_app();
    let body = register(&app, "Ada", "ada@example.com", "secret-password").await;

    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["user"]["name"], "Ada");
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert!(body["user"]["id"].is_string());
    assert!(body["user"].get("password").is_none());

    let token = body["token"].as_str().unwrap();
    let (status, listing) = send(&app, "GET", "/api/jobs", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["totalJobs"], 0);
}

#[tokio::test]
async fn duplicate_emails_are_rejected_whatever_the_case() {
    let app = test_app();
    register(&app, "Ada", "ada@example.com", "secret-password").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "name": "Other", "email": "ADA@EXAMPLE.COM", "password": "other-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email already in use");
}

#[tokio::test]
async fn register_rejects_missing_or_weak_fields() {
    let app = test_app();

    let (status, _) = send(&app, "POST", "/api/auth/register", None, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "name": "Ada", "email": "not-an-email", "password": "secret-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "name": "Ada", "email": "ada@example.com", "password": "short" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_succeeds_with_the_registered_password() {
    let app = test_app();
    register(&app, "Ada", "ada@example.com", "secret-password").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "ada@example.com", "password": "secret-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert!(body["token"].is_string());
}

#[tokio::test]
async fn bad_credentials_all_get_the_same_answer() {
    let app = test_app();
    register(&app, "Ada", "ada@example.com", "secret-password").await;

    let (wrong_status, wrong_body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "ada@example.com", "password": "wrong-password" })),
    )
    .await;
    let (unknown_status, unknown_body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "nobody@example.com", "password": "secret-password" })),
    )
    .await;

    assert_eq!(wrong_status, StatusCode::BAD_REQUEST);
    assert_eq!(unknown_status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_body, unknown_body);
    assert_eq!(wrong_body["error"], "Invalid email or password");
}

#[tokio::test]
async fn protected_routes_refuse_anonymous_callers() {
    let app = test_app();

    let (status, body) = send(&app, "GET", "/api/jobs", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized - No token provided");

    let (status, body) = send(&app, "GET", "/api/jobs", Some("garbage-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized - Invalid token");

    // A non-Bearer scheme counts as no token at all.
    let request = Request::builder()
        .method("GET")
        .uri("/api/jobs")
        .header(header::AUTHORIZATION, "Basic YWRhOnNlY3JldA==")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "Unauthorized - No token provided");
}

#[tokio::test]
async fn expired_tokens_are_turned_away() {
    let mut config = test_config();
    config.jwt_ttl_secs = -3600;
    let app = app_with(config);

    let body = register(&app, "Ada", "ada@example.com", "secret-password").await;
    let token = body["token"].as_str().unwrap();

    let (status, body) = send(&app, "GET", "/api/jobs", Some(token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized - Invalid token");
}

#[tokio::test]
async fn google_sign_in_rejects_garbage_tokens() {
    let mut config = test_config();
    config.google_client_id = Some("client-id.apps.googleusercontent.com".to_string());
    let app = app_with(config);

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/google/token",
        None,
        Some(json!({ "token": "not-a-jwt" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().contains("Google"));
}

#[tokio::test]
async fn google_sign_in_is_unavailable_without_a_client_id() {
    let app = test_app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/google/token",
        None,
        Some(json!({ "token": "anything" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "An unexpected error occurred");
}

#[tokio::test]
async fn health_needs_no_token() {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
