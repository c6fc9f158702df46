//! Domain service for administrative account management.

use thiserror::Error;

use crate::db::Account;
use crate::services::audit::ClientContext;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Account not found")]
    AccountNotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AdminError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AdminError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Administrative flag toggles. Callers are already verified as active
/// administrators by the route guard; the services only enforce the
/// self-toggle invariant.
#[async_trait::async_trait]
pub trait AdminService: Send + Sync {
    async fn list_accounts(&self) -> Result<Vec<Account>, AdminError>;

    /// Flips `is_active` on the target. An administrator toggling their own
    /// account is a silent no-op: the unchanged account is returned.
    async fn toggle_active(
        &self,
        client: &ClientContext,
        actor: &Account,
        target_id: i32,
    ) -> Result<Account, AdminError>;

    /// Flips `is_admin` on the target, with the same self-toggle no-op rule.
    async fn toggle_admin(
        &self,
        client: &ClientContext,
        actor: &Account,
        target_id: i32,
    ) -> Result<Account, AdminError>;
}
