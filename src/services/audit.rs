//! Best-effort audit ledgers.
//!
//! Both ledgers are a monitoring signal, not part of request correctness:
//! a failed write is reported to the operational log and swallowed, so a
//! successful login stands even if its audit row never lands.

use crate::db::{NewLoginAttempt, NewSecurityEvent, Store};

/// Who is on the other end of the connection, as resolved by the filter
/// middleware. Threaded through every ledger write.
#[derive(Debug, Clone)]
pub struct ClientContext {
    pub ip_address: String,
    pub user_agent: Option<String>,
}

impl ClientContext {
    #[must_use]
    pub const fn new(ip_address: String, user_agent: Option<String>) -> Self {
        Self {
            ip_address,
            user_agent,
        }
    }
}

#[derive(Clone)]
pub struct AuditLog {
    store: Store,
}

impl AuditLog {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn login_attempt(
        &self,
        client: &ClientContext,
        email: Option<&str>,
        success: bool,
        failure_reason: Option<&str>,
    ) {
        let attempt = NewLoginAttempt {
            ip_address: client.ip_address.clone(),
            user_agent: client.user_agent.clone(),
            email: email.map(str::to_string),
            success,
            failure_reason: failure_reason.map(str::to_string),
        };

        if let Err(e) = self.store.add_login_attempt(attempt).await {
            tracing::error!("Failed to log login attempt: {e:#}");
        }
    }

    pub async fn security_event(
        &self,
        client: &ClientContext,
        account_id: Option<i32>,
        event_type: &str,
        details: String,
        severity: &str,
    ) {
        let event = NewSecurityEvent {
            account_id,
            event_type: event_type.to_string(),
            ip_address: client.ip_address.clone(),
            user_agent: client.user_agent.clone(),
            details,
            severity: severity.to_string(),
        };

        if let Err(e) = self.store.add_security_event(event).await {
            tracing::error!("Failed to log security event: {e:#}");
        }
    }
}
