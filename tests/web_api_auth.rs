//! Web API Authentication Tests
//!
//! Integration tests for registration, login, token verification and the
//! cookie/header credential carriers.

use axum::http::header::AUTHORIZATION;
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_test::TestServer;
use chirp::config::Config;
use chirp::web::handlers::{AppState, SharedDatabase};
use chirp::web::middleware::JwtState;
use chirp::web::router::create_router;
use chirp::Database;
use serde_json::{json, Value};
use std::sync::Arc;

const TEST_SECRET: &str = "test-secret-key-for-testing-only";

/// Create a test configuration.
fn create_test_config() -> Config {
    let mut config = Config::default();
    config.server.login_rate_limit = 100;
    config.server.api_rate_limit = 10000;
    config.auth.jwt_secret = TEST_SECRET.to_string();
    config.auth.token_expiry_secs = 900;
    config
}

/// Create a test server with an in-memory database.
async fn create_test_server() -> (TestServer, SharedDatabase) {
    let config = create_test_config();

    let db: SharedDatabase = Arc::new(
        Database::open_in_memory()
            .await
            .expect("Failed to create test database"),
    );

    let app_state = Arc::new(AppState::new(
        db.clone(),
        &config.auth.jwt_secret,
        config.auth.token_expiry_secs,
        config.auth.cookie_secure,
    ));

    let jwt_state = Arc::new(JwtState::new(&config.auth.jwt_secret));

    let router = create_router(app_state, jwt_state, &config.server);

    let server = TestServer::new(router).expect("Failed to create test server");

    (server, db)
}

/// Helper to register a test user and return the response body.
async fn register_test_user(server: &TestServer, email: &str, password: &str, name: &str) -> Value {
    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "email": email,
            "password": password,
            "name": name
        }))
        .await;

    response.json::<Value>()
}

/// Get the session token from an auth response.
fn get_token(response: &Value) -> String {
    response["data"]["token"].as_str().unwrap().to_string()
}

// ============================================================================
// Registration Tests
// ============================================================================

#[tokio::test]
async fn test_register_success() {
    let (server, _db) = create_test_server().await;

    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "email": "alice@example.com",
            "password": "password123",
            "name": "Alice"
        }))
        .await;

    response.assert_status_ok();

    let body: Value = response.json();
    assert!(body["data"]["token"].is_string());
    assert_eq!(body["data"]["expires_in"], 900);
    assert_eq!(body["data"]["user"]["email"], "alice@example.com");
    assert_eq!(body["data"]["user"]["name"], "Alice");
    assert_eq!(body["data"]["user"]["roles"], json!(["general"]));
}

#[tokio::test]
async fn test_register_sets_auth_cookie() {
    let (server, _db) = create_test_server().await;

    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "email": "alice@example.com",
            "password": "password123",
            "name": "Alice"
        }))
        .await;

    response.assert_status_ok();

    let cookie = response.cookie("jwt");
    assert!(!cookie.value().is_empty());
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.same_site(), Some(SameSite::Strict));

    // The cookie carries the same token as the body
    let body: Value = response.json();
    assert_eq!(cookie.value(), get_token(&body));
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let (server, _db) = create_test_server().await;

    register_test_user(&server, "alice@example.com", "password123", "Alice").await;

    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "email": "alice@example.com",
            "password": "password456",
            "name": "Impostor"
        }))
        .await;

    response.assert_status(axum::http::StatusCode::CONFLICT);

    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_register_duplicate_email_different_case() {
    let (server, _db) = create_test_server().await;

    register_test_user(&server, "alice@example.com", "password123", "Alice").await;

    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "email": "ALICE@EXAMPLE.COM",
            "password": "password456",
            "name": "Impostor"
        }))
        .await;

    response.assert_status(axum::http::StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_short_password() {
    let (server, _db) = create_test_server().await;

    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "email": "alice@example.com",
            "password": "short",
            "name": "Alice"
        }))
        .await;

    response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["details"]["password"].is_array());
}

#[tokio::test]
async fn test_register_invalid_email() {
    let (server, _db) = create_test_server().await;

    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "email": "not-an-email",
            "password": "password123",
            "name": "Alice"
        }))
        .await;

    response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_register_empty_name() {
    let (server, _db) = create_test_server().await;

    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "email": "alice@example.com",
            "password": "password123",
            "name": ""
        }))
        .await;

    response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
}

// ============================================================================
// Login Tests
// ============================================================================

#[tokio::test]
async fn test_login_success() {
    let (server, _db) = create_test_server().await;

    register_test_user(&server, "alice@example.com", "password123", "Alice").await;

    let response = server
        .post("/api/auth/login")
        .json(&json!({
            "email": "alice@example.com",
            "password": "password123"
        }))
        .await;

    response.assert_status_ok();

    let body: Value = response.json();
    assert!(body["data"]["token"].is_string());
    assert_eq!(body["data"]["user"]["email"], "alice@example.com");

    let cookie = response.cookie("jwt");
    assert!(!cookie.value().is_empty());
}

#[tokio::test]
async fn test_login_wrong_password() {
    let (server, _db) = create_test_server().await;

    register_test_user(&server, "alice@example.com", "password123", "Alice").await;

    let response = server
        .post("/api/auth/login")
        .json(&json!({
            "email": "alice@example.com",
            "password": "wrongpassword"
        }))
        .await;

    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);

    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_login_nonexistent_user() {
    let (server, _db) = create_test_server().await;

    let response = server
        .post("/api/auth/login")
        .json(&json!({
            "email": "nobody@example.com",
            "password": "password123"
        }))
        .await;

    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_empty_credentials() {
    let (server, _db) = create_test_server().await;

    let response = server
        .post("/api/auth/login")
        .json(&json!({
            "email": "",
            "password": ""
        }))
        .await;

    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

// ============================================================================
// Me (Current User) Tests
// ============================================================================

#[tokio::test]
async fn test_me_with_bearer_token() {
    let (server, _db) = create_test_server().await;

    let login_response =
        register_test_user(&server, "alice@example.com", "password123", "Alice").await;
    let token = get_token(&login_response);

    let response = server
        .get("/api/auth/me")
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .await;

    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["data"]["email"], "alice@example.com");
    assert_eq!(body["data"]["name"], "Alice");
    assert_eq!(body["data"]["roles"], json!(["general"]));
    assert_eq!(body["data"]["post_count"], 0);
    assert_eq!(body["data"]["follower_count"], 0);
    assert_eq!(body["data"]["following_count"], 0);
}

#[tokio::test]
async fn test_me_with_cookie() {
    let (server, _db) = create_test_server().await;

    let login_response =
        register_test_user(&server, "alice@example.com", "password123", "Alice").await;
    let token = get_token(&login_response);

    let response = server
        .get("/api/auth/me")
        .add_cookie(Cookie::new("jwt", token))
        .await;

    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["data"]["email"], "alice@example.com");
}

#[tokio::test]
async fn test_me_unauthorized() {
    let (server, _db) = create_test_server().await;

    let response = server.get("/api/auth/me").await;

    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_invalid_token() {
    let (server, _db) = create_test_server().await;

    let response = server
        .get("/api/auth/me")
        .add_header(AUTHORIZATION, "Bearer invalid-token")
        .await;

    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cookie_takes_precedence_over_header() {
    let (server, _db) = create_test_server().await;

    let login_response =
        register_test_user(&server, "alice@example.com", "password123", "Alice").await;
    let token = get_token(&login_response);

    // Valid cookie wins over a garbage Authorization header
    let response = server
        .get("/api/auth/me")
        .add_cookie(Cookie::new("jwt", token.clone()))
        .add_header(AUTHORIZATION, "Bearer garbage")
        .await;
    response.assert_status_ok();

    // A garbage cookie is not rescued by a valid header
    let response = server
        .get("/api/auth/me")
        .add_cookie(Cookie::new("jwt", "garbage"))
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .await;
    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Token Verification Tests
// ============================================================================

#[tokio::test]
async fn test_expired_token_rejected() {
    let (server, _db) = create_test_server().await;

    register_test_user(&server, "alice@example.com", "password123", "Alice").await;

    let now = chrono::Utc::now().timestamp();
    let expired = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &json!({
            "sub": 1,
            "name": "Alice",
            "email": "alice@example.com",
            "roles": ["general"],
            "iat": now - 7200,
            "exp": now - 3600,
            "jti": "00000000-0000-0000-0000-000000000000"
        }),
        &jsonwebtoken::EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap();

    let response = server
        .get("/api/auth/me")
        .add_header(AUTHORIZATION, format!("Bearer {}", expired))
        .await;

    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_signed_with_other_secret_rejected() {
    let (server, _db) = create_test_server().await;

    register_test_user(&server, "alice@example.com", "password123", "Alice").await;

    let now = chrono::Utc::now().timestamp();
    let forged = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &json!({
            "sub": 1,
            "name": "Alice",
            "email": "alice@example.com",
            "roles": ["general", "admin"],
            "iat": now,
            "exp": now + 3600,
            "jti": "00000000-0000-0000-0000-000000000000"
        }),
        &jsonwebtoken::EncodingKey::from_secret(b"some-other-secret"),
    )
    .unwrap();

    let response = server
        .get("/api/auth/me")
        .add_header(AUTHORIZATION, format!("Bearer {}", forged))
        .await;

    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_contains_expected_claims() {
    let (server, _db) = create_test_server().await;

    let login_response =
        register_test_user(&server, "alice@example.com", "password123", "Alice").await;
    let token = get_token(&login_response);

    // Decode JWT payload (base64 decode the middle part)
    let parts: Vec<&str> = token.split('.').collect();
    assert_eq!(parts.len(), 3, "JWT should have 3 parts");

    use base64::Engine;
    let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
    let payload = engine.decode(parts[1]).expect("Failed to decode JWT payload");
    let claims: Value = serde_json::from_slice(&payload).expect("Failed to parse claims");

    assert!(claims["sub"].is_number());
    assert_eq!(claims["name"], "Alice");
    assert_eq!(claims["email"], "alice@example.com");
    assert_eq!(claims["roles"], json!(["general"]));
    assert!(claims["iat"].is_number());
    assert!(claims["exp"].is_number());
    assert!(claims["jti"].is_string());
}

#[tokio::test]
async fn test_token_snapshot_is_stateless() {
    let (server, _db) = create_test_server().await;

    let login_response =
        register_test_user(&server, "alice@example.com", "password123", "Alice").await;
    let token = get_token(&login_response);

    // Change the display name after the token was issued
    server
        .put("/api/users/me")
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .json(&json!({ "name": "Alicia" }))
        .await
        .assert_status_ok();

    // The token still carries the issuance-time snapshot
    let parts: Vec<&str> = token.split('.').collect();
    use base64::Engine;
    let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
    let payload = engine.decode(parts[1]).unwrap();
    let claims: Value = serde_json::from_slice(&payload).unwrap();
    assert_eq!(claims["name"], "Alice");

    // The strict /me path re-fetches and reflects the change
    let response = server
        .get("/api/auth/me")
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["name"], "Alicia");
}

#[tokio::test]
async fn test_two_tokens_for_same_user_both_valid() {
    let (server, _db) = create_test_server().await;

    register_test_user(&server, "alice@example.com", "password123", "Alice").await;

    let first = server
        .post("/api/auth/login")
        .json(&json!({ "email": "alice@example.com", "password": "password123" }))
        .await
        .json::<Value>();
    let second = server
        .post("/api/auth/login")
        .json(&json!({ "email": "alice@example.com", "password": "password123" }))
        .await
        .json::<Value>();

    for body in [first, second] {
        let response = server
            .get("/api/auth/me")
            .add_header(AUTHORIZATION, format!("Bearer {}", get_token(&body)))
            .await;
        response.assert_status_ok();
    }
}

// ============================================================================
// Logout Tests
// ============================================================================

#[tokio::test]
async fn test_logout_clears_cookie() {
    let (server, _db) = create_test_server().await;

    register_test_user(&server, "alice@example.com", "password123", "Alice").await;

    let response = server.post("/api/auth/logout").await;
    response.assert_status_ok();

    let cookie = response.cookie("jwt");
    assert_eq!(cookie.value(), "");
    assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
}

// ============================================================================
// Public Route Tests
// ============================================================================

#[tokio::test]
async fn test_public_route_ignores_invalid_token() {
    let (server, _db) = create_test_server().await;

    register_test_user(&server, "alice@example.com", "password123", "Alice").await;

    // Post listing is public: no token, garbage token, both fine
    server.get("/api/posts").await.assert_status_ok();

    server
        .get("/api/posts")
        .add_header(AUTHORIZATION, "Bearer garbage")
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_health_endpoint_is_public() {
    let config = create_test_config();
    let db: SharedDatabase = Arc::new(Database::open_in_memory().await.unwrap());
    let app_state = Arc::new(AppState::new(
        db.clone(),
        &config.auth.jwt_secret,
        config.auth.token_expiry_secs,
        config.auth.cookie_secure,
    ));
    let jwt_state = Arc::new(JwtState::new(&config.auth.jwt_secret));
    let router = create_router(app_state, jwt_state, &config.server)
        .merge(chirp::web::router::create_health_router());
    let server = TestServer::new(router).unwrap();

    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "OK");
}
