//! `SeaORM` implementation of the `AdminService` trait.

use async_trait::async_trait;

use crate::db::{Account, Store};
use crate::services::admin_service::{AdminError, AdminService};
use crate::services::audit::{AuditLog, ClientContext};

pub struct SeaOrmAdminService {
    store: Store,
    audit: AuditLog,
}

impl SeaOrmAdminService {
    #[must_use]
    pub const fn new(store: Store, audit: AuditLog) -> Self {
        Self { store, audit }
    }
}

#[async_trait]
impl AdminService for SeaOrmAdminService {
    async fn list_accounts(&self) -> Result<Vec<Account>, AdminError> {
        Ok(self.store.list_accounts().await?)
    }

    async fn toggle_active(
        &self,
        client: &ClientContext,
        actor: &Account,
        target_id: i32,
    ) -> Result<Account, AdminError> {
        // Self-deactivation is a no-op, not an error.
        if actor.id == target_id {
            return Ok(actor.clone());
        }

        let account = self
            .store
            .toggle_account_active(target_id)
            .await?
            .ok_or(AdminError::AccountNotFound)?;

        self.audit
            .security_event(
                client,
                Some(actor.id),
                "account_status_toggled",
                format!(
                    "Account '{}' set to {}",
                    account.username,
                    if account.is_active { "active" } else { "suspended" }
                ),
                "info",
            )
            .await;

        Ok(account)
    }

    async fn toggle_admin(
        &self,
        client: &ClientContext,
        actor: &Account,
        target_id: i32,
    ) -> Result<Account, AdminError> {
        // Self-demotion is a no-op, not an error.
        if actor.id == target_id {
            return Ok(actor.clone());
        }

        let account = self
            .store
            .toggle_account_admin(target_id)
            .await?
            .ok_or(AdminError::AccountNotFound)?;

        self.audit
            .security_event(
                client,
                Some(actor.id),
                "account_admin_toggled",
                format!(
                    "Account '{}' admin privileges {}",
                    account.username,
                    if account.is_admin { "granted" } else { "revoked" }
                ),
                "info",
            )
            .await;

        Ok(account)
    }
}
