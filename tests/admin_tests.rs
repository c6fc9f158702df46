use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use aura::config::Config;
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

/// Bootstrap admin credentials seeded by the initial migration
/// (must match m20260301_initial.rs)
const ADMIN_EMAIL: &str = "admin@example.com";
const ADMIN_PASSWORD: &str = "ChangeMe!12345";

const BROWSER_UA: &str = "Mozilla/5.0 (X11; Linux x86_64) Firefox/140.0";
const TEST_IP: &str = "198.51.100.40";

async fn spawn_app() -> (Arc<aura::api::AppState>, Router) {
    let db_path = std::env::temp_dir().join(format!("aura-admin-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.server.secure_cookies = false;
    config.security.throttle.max_attempts = 100;

    let state = aura::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    let router = aura::api::router(state.clone());
    (state, router)
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("Content-Type", "application/json")
                .header("User-Agent", BROWSER_UA)
                .header("X-Forwarded-For", TEST_IP)
                .body(Body::from(
                    serde_json::json!({ "email": email, "password": password }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    response
        .headers()
        .get("set-cookie")
        .expect("login should set a session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

async fn register(app: &Router, username: &str, email: &str) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/register")
                .header("Content-Type", "application/json")
                .header("User-Agent", BROWSER_UA)
                .header("X-Forwarded-For", TEST_IP)
                .body(Body::from(
                    serde_json::json!({
                        "username": username,
                        "email": email,
                        "password": "Tr0ub4dor&3XYZ",
                        "confirm_password": "Tr0ub4dor&3XYZ"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

fn admin_request(method: &str, uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("User-Agent", BROWSER_UA)
        .header("X-Forwarded-For", TEST_IP)
        .header("Cookie", cookie)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_admin_routes_require_admin_session() {
    let (_state, app) = spawn_app().await;

    // No session at all
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/admin/accounts")
                .header("User-Agent", BROWSER_UA)
                .header("X-Forwarded-For", TEST_IP)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // A regular user session is rejected too
    register(&app, "bob", "bob@example.com").await;
    let cookie = login(&app, "bob@example.com", "Tr0ub4dor&3XYZ").await;

    let response = app
        .oneshot(admin_request("GET", "/api/admin/accounts", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_lists_accounts() {
    let (_state, app) = spawn_app().await;
    register(&app, "bob", "bob@example.com").await;

    let cookie = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let response = app
        .oneshot(admin_request("GET", "/api/admin/accounts", &cookie))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let accounts = json["data"].as_array().unwrap();
    assert_eq!(accounts.len(), 2);
}

#[tokio::test]
async fn test_toggle_flags_on_another_account() {
    let (state, app) = spawn_app().await;
    register(&app, "bob", "bob@example.com").await;

    let bob = state
        .store
        .get_account_by_email("bob@example.com")
        .await
        .unwrap()
        .unwrap();

    let cookie = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = app
        .clone()
        .oneshot(admin_request(
            "POST",
            &format!("/api/admin/accounts/{}/toggle-active", bob.id),
            &cookie,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["is_active"], false);

    let response = app
        .oneshot(admin_request(
            "POST",
            &format!("/api/admin/accounts/{}/toggle-admin", bob.id),
            &cookie,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["is_admin"], true);

    // Changes were persisted immediately
    let bob = state.store.get_account(bob.id).await.unwrap().unwrap();
    assert!(!bob.is_active);
    assert!(bob.is_admin);

    // Each toggle recorded a security event
    let events = state
        .store
        .recent_security_events(10, Some("account_admin_toggled"))
        .await
        .unwrap();
    assert_eq!(events.len(), 1);
}

#[tokio::test]
async fn test_self_toggle_is_a_silent_noop() {
    let (state, app) = spawn_app().await;

    let admin = state
        .store
        .get_account_by_email(ADMIN_EMAIL)
        .await
        .unwrap()
        .unwrap();

    let cookie = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    for path in ["toggle-active", "toggle-admin"] {
        let response = app
            .clone()
            .oneshot(admin_request(
                "POST",
                &format!("/api/admin/accounts/{}/{path}", admin.id),
                &cookie,
            ))
            .await
            .unwrap();
        // Not an error, just a no-op
        assert_eq!(response.status(), StatusCode::OK);
    }

    let after = state.store.get_account(admin.id).await.unwrap().unwrap();
    assert!(after.is_admin);
    assert!(after.is_active);
}

#[tokio::test]
async fn test_toggle_unknown_account_is_not_found() {
    let (_state, app) = spawn_app().await;
    let cookie = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = app
        .oneshot(admin_request(
            "POST",
            "/api/admin/accounts/9999/toggle-active",
            &cookie,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_security_events_endpoint_is_admin_guarded() {
    let (_state, app) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/admin/security-events")
                .header("User-Agent", BROWSER_UA)
                .header("X-Forwarded-For", TEST_IP)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let cookie = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let response = app
        .oneshot(admin_request("GET", "/api/admin/security-events", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
