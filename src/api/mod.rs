use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::Config;
use crate::db::Store;
use crate::security::{FilterPolicy, ThrottlePolicy};
use crate::services::{
    AdminService, AuditLog, AuthService, SeaOrmAdminService, SeaOrmAuthService,
};

pub mod admin;
pub mod auth;
mod error;
mod filter;
mod observability;
pub mod system;
mod types;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

pub struct AppState {
    pub config: Config,

    pub store: Store,

    pub audit: AuditLog,

    pub auth_service: Arc<dyn AuthService>,

    pub admin_service: Arc<dyn AdminService>,

    pub filter_policy: FilterPolicy,

    pub throttle: ThrottlePolicy,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    let audit = AuditLog::new(store.clone());

    let auth_service: Arc<dyn AuthService> = Arc::new(SeaOrmAuthService::new(
        store.clone(),
        audit.clone(),
        config.security.clone(),
    ));

    let admin_service: Arc<dyn AdminService> =
        Arc::new(SeaOrmAdminService::new(store.clone(), audit.clone()));

    let filter_policy = FilterPolicy::new(config.security.blocked_ips.clone());
    let throttle = ThrottlePolicy::from(&config.security.throttle);

    Ok(Arc::new(AppState {
        config,
        store,
        audit,
        auth_service,
        admin_service,
        filter_policy,
        throttle,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config.server.cors_allowed_origins.clone();
    let secure_cookies = state.config.server.secure_cookies;
    let session_hours = i64::try_from(state.config.security.session_hours).unwrap_or(2);

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(session_hours)));

    let admin_routes = Router::new()
        .route("/admin/accounts", get(admin::list_accounts))
        .route(
            "/admin/accounts/{id}/toggle-active",
            post(admin::toggle_account_active),
        )
        .route(
            "/admin/accounts/{id}/toggle-admin",
            post(admin::toggle_account_admin),
        )
        .route("/admin/security-events", get(system::list_security_events))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin::require_admin,
        ));

    let api_router = Router::new()
        .merge(admin_routes)
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::get_current_account))
        .route(
            "/auth/password-reset-request",
            post(auth::password_reset_request),
        )
        .route("/system/status", get(system::get_status))
        .route("/system/metrics", get(observability::get_metrics))
        .layer(session_layer)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            filter::security_filter,
        ))
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        ))
}
