//! Administrative endpoints.
//!
//! Route access is gated by [`require_admin`], a guard middleware on the
//! admin sub-router: session → account → `is_admin && is_active`. Handlers
//! can then assume a verified administrator in the request extensions.

use axum::{
    Extension, Json,
    extract::{Path, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tower_sessions::Session;

use super::{AccountDto, ApiError, ApiResponse, AppState};
use crate::api::auth::session_account_id;
use crate::db::Account;
use crate::services::ClientContext;

/// The administrator attached to the request by [`require_admin`].
#[derive(Clone)]
pub struct CurrentAdmin(pub Account);

pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let Ok(account_id) = session_account_id(&session).await else {
        return Ok(forbidden());
    };

    let account = state
        .store
        .get_account(account_id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to load account: {e}")))?;

    match account {
        Some(account) if account.is_admin && account.is_active => {
            request.extensions_mut().insert(CurrentAdmin(account));
            Ok(next.run(request).await)
        }
        _ => Ok(forbidden()),
    }
}

fn forbidden() -> Response {
    ApiError::Forbidden("Admin access required.".to_string()).into_response()
}

/// GET /admin/accounts
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<AccountDto>>>, ApiError> {
    let accounts = state.admin_service.list_accounts().await?;

    Ok(Json(ApiResponse::success(
        accounts.into_iter().map(AccountDto::from).collect(),
    )))
}

/// POST /admin/accounts/{id}/toggle-active
pub async fn toggle_account_active(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Extension(admin): Extension<CurrentAdmin>,
    Extension(client): Extension<ClientContext>,
) -> Result<Json<ApiResponse<AccountDto>>, ApiError> {
    let account = state
        .admin_service
        .toggle_active(&client, &admin.0, id)
        .await?;

    Ok(Json(ApiResponse::success(AccountDto::from(account))))
}

/// POST /admin/accounts/{id}/toggle-admin
pub async fn toggle_account_admin(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Extension(admin): Extension<CurrentAdmin>,
    Extension(client): Extension<ClientContext>,
) -> Result<Json<ApiResponse<AccountDto>>, ApiError> {
    let account = state
        .admin_service
        .toggle_admin(&client, &admin.0, id)
        .await?;

    Ok(Json(ApiResponse::success(AccountDto::from(account))))
}
