//! System API endpoints: status for liveness checks and operational
//! visibility into the audit ledgers.

use axum::{Json, extract::Query, extract::State};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub database: bool,
}

/// GET /system/status
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SystemStatus>>, ApiError> {
    let database = state.store.ping().await.is_ok();

    Ok(Json(ApiResponse::success(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        database,
    })))
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub event_type: Option<String>,
}

const fn default_limit() -> u64 {
    50
}

#[derive(Debug, Serialize)]
pub struct SecurityEventDto {
    pub id: i32,
    pub account_id: Option<i32>,
    pub event_type: String,
    pub ip_address: String,
    pub details: String,
    pub severity: String,
    pub created_at: String,
}

/// GET /admin/security-events
/// The durable signal for any monitoring collaborator; admin-guarded.
pub async fn list_security_events(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<ApiResponse<Vec<SecurityEventDto>>>, ApiError> {
    let limit = query.limit.clamp(1, 1000);

    let events = state
        .store
        .recent_security_events(limit, query.event_type.as_deref())
        .await?;

    Ok(Json(ApiResponse::success(
        events
            .into_iter()
            .map(|event| SecurityEventDto {
                id: event.id,
                account_id: event.account_id,
                event_type: event.event_type,
                ip_address: event.ip_address,
                details: event.details,
                severity: event.severity,
                created_at: event.created_at,
            })
            .collect(),
    )))
}
