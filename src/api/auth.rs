use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::{Expiry, Session};

use super::{AccountDto, ApiError, ApiResponse, AppState};
use crate::services::{ClientContext, Registration};

pub const SESSION_ACCOUNT_KEY: &str = "account_id";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember: bool,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/login
/// Authenticate with email and password, establishes a session on success
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Extension(client): Extension<ClientContext>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AccountDto>>, ApiError> {
    if payload.email.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let account = state
        .auth_service
        .login(&client, &payload.email, &payload.password)
        .await?;

    // "remember" only stretches the session lifetime; everything else about
    // the session is identical.
    if payload.remember {
        let days = i64::try_from(state.config.security.remember_session_days).unwrap_or(30);
        session.set_expiry(Some(Expiry::OnInactivity(time::Duration::days(days))));
    }

    session
        .insert(SESSION_ACCOUNT_KEY, account.id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    Ok(Json(ApiResponse::success(AccountDto::from(account))))
}

/// POST /auth/register
/// Create a new account; the caller logs in separately afterwards
pub async fn register(
    State(state): State<Arc<AppState>>,
    Extension(client): Extension<ClientContext>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let registration = Registration {
        username: payload.username,
        email: payload.email,
        password: payload.password,
        confirm_password: payload.confirm_password,
    };

    state.auth_service.register(&client, registration).await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Registration successful! Please login.".to_string(),
    })))
}

/// POST /auth/logout
/// Invalidate the current session
pub async fn logout(session: Session) -> impl IntoResponse {
    let _ = session.flush().await;
    (StatusCode::OK, "Logged out")
}

/// GET /auth/me
/// Get current account information (requires authentication)
pub async fn get_current_account(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<AccountDto>>, ApiError> {
    let account_id = session_account_id(&session).await?;
    let account = state.auth_service.account_info(account_id).await?;

    Ok(Json(ApiResponse::success(AccountDto::from(account))))
}

/// POST /auth/password-reset-request
/// Records the request and answers uniformly; no reset token protocol is
/// implemented, and the response never confirms whether the account exists.
pub async fn password_reset_request(
    State(state): State<Arc<AppState>>,
    Extension(client): Extension<ClientContext>,
    Json(payload): Json<PasswordResetRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if payload.email.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }

    state
        .audit
        .security_event(
            &client,
            None,
            "password_reset_requested",
            format!("Password reset requested for {}", payload.email),
            "info",
        )
        .await;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "If an account with that email exists, you'll receive a reset link.".to_string(),
    })))
}

// ============================================================================
// Helpers
// ============================================================================

/// Get the account id from the session, returns error if not authenticated
pub async fn session_account_id(session: &Session) -> Result<i32, ApiError> {
    session
        .get::<i32>(SESSION_ACCOUNT_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))
}
