use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use aura::config::Config;
use http_body_util::BodyExt;
use sea_orm::{EntityTrait, Set};
use std::sync::Arc;
use tower::ServiceExt;

const BROWSER_UA: &str = "Mozilla/5.0 (X11; Linux x86_64) Firefox/140.0";

async fn spawn_app_with(mutate: impl FnOnce(&mut Config)) -> (Arc<aura::api::AppState>, Router) {
    let db_path =
        std::env::temp_dir().join(format!("aura-filter-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.server.secure_cookies = false;
    mutate(&mut config);

    let state = aura::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    let router = aura::api::router(state.clone());
    (state, router)
}

fn get_status(ip: &str, user_agent: &str) -> Request<Body> {
    Request::builder()
        .uri("/api/system/status")
        .header("User-Agent", user_agent)
        .header("X-Forwarded-For", ip)
        .body(Body::empty())
        .unwrap()
}

fn login_request(ip: &str, email: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("Content-Type", "application/json")
        .header("User-Agent", BROWSER_UA)
        .header("X-Forwarded-For", ip)
        .body(Body::from(
            serde_json::json!({ "email": email, "password": password }).to_string(),
        ))
        .unwrap()
}

#[tokio::test]
async fn test_blocked_ip_gets_fixed_403() {
    let (state, app) = spawn_app_with(|config| {
        config.security.blocked_ips = vec!["203.0.113.66".to_string()];
    })
    .await;

    let response = app
        .clone()
        .oneshot(get_status("203.0.113.66", BROWSER_UA))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "Request blocked for security reasons");

    let events = state
        .store
        .recent_security_events(10, Some("request_blocked"))
        .await
        .unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].severity, "warning");
    assert_eq!(events[0].ip_address, "203.0.113.66");

    // Other addresses are unaffected
    let response = app
        .oneshot(get_status("198.51.100.20", BROWSER_UA))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_suspicious_user_agent_flagged_not_blocked() {
    let (state, app) = spawn_app_with(|_| {}).await;

    let response = app
        .oneshot(get_status("198.51.100.21", "curl/8.5.0"))
        .await
        .unwrap();

    // Flagged requests still complete
    assert_eq!(response.status(), StatusCode::OK);

    let events = state
        .store
        .recent_security_events(10, Some("suspicious_user_agent"))
        .await
        .unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].severity, "warning");
}

#[tokio::test]
async fn test_injection_payload_flagged_not_blocked() {
    let (state, app) = spawn_app_with(|_| {}).await;

    // Payload carries a SQL signature; the request itself is well-formed
    let response = app
        .oneshot(Request::builder()
            .method("POST")
            .uri("/api/auth/password-reset-request")
            .header("Content-Type", "application/json")
            .header("User-Agent", BROWSER_UA)
            .header("X-Forwarded-For", "198.51.100.22")
            .body(Body::from(
                serde_json::json!({ "email": "x union select password_hash from accounts" })
                    .to_string(),
            ))
            .unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let events = state
        .store
        .recent_security_events(10, Some("suspicious_request_pattern"))
        .await
        .unwrap();
    assert_eq!(events.len(), 1);
    assert!(events[0].details.contains("union select"));
}

#[tokio::test]
async fn test_login_throttle_blocks_after_threshold() {
    let (_state, app) = spawn_app_with(|config| {
        config.security.throttle.max_attempts = 5;
        config.security.throttle.window_minutes = 30;
    })
    .await;

    // Five failed attempts fill the window for this address
    for _ in 0..5 {
        let response = app
            .clone()
            .oneshot(login_request("203.0.113.77", "admin@example.com", "wrong"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // The sixth and later attempts are blocked before authentication
    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(login_request("203.0.113.77", "admin@example.com", "wrong"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    // A different source address is not limited
    let response = app
        .oneshot(login_request("198.51.100.23", "admin@example.com", "wrong"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_throttle_applies_only_to_sensitive_endpoints() {
    let (_state, app) = spawn_app_with(|config| {
        config.security.throttle.max_attempts = 2;
    })
    .await;

    for _ in 0..3 {
        let _ = app
            .clone()
            .oneshot(login_request("203.0.113.88", "admin@example.com", "wrong"))
            .await
            .unwrap();
    }

    // Limited for login...
    let response = app
        .clone()
        .oneshot(login_request("203.0.113.88", "admin@example.com", "wrong"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // ...but the status endpoint still answers
    let response = app
        .oneshot(get_status("203.0.113.88", BROWSER_UA))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_window_boundary_attempt_not_counted() {
    let (state, _app) = spawn_app_with(|_| {}).await;

    let boundary = chrono::Utc::now() - chrono::Duration::minutes(30);

    // Row aged exactly at the window boundary
    let attempt = aura::entities::login_attempts::ActiveModel {
        ip_address: Set("203.0.113.99".to_string()),
        user_agent: Set(None),
        email: Set(Some("admin@example.com".to_string())),
        success: Set(false),
        failure_reason: Set(Some("invalid_password".to_string())),
        created_at: Set(boundary.to_rfc3339()),
        ..Default::default()
    };
    aura::entities::login_attempts::Entity::insert(attempt)
        .exec(&state.store.conn)
        .await
        .unwrap();

    // Strictly-greater comparison: the boundary row is outside the window
    let count = state
        .store
        .count_login_attempts_since("203.0.113.99", boundary)
        .await
        .unwrap();
    assert_eq!(count, 0);

    // A slightly older window start picks it up
    let count = state
        .store
        .count_login_attempts_since("203.0.113.99", boundary - chrono::Duration::seconds(1))
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_security_headers_present() {
    let (_state, app) = spawn_app_with(|_| {}).await;

    let response = app
        .oneshot(get_status("198.51.100.24", BROWSER_UA))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
}
