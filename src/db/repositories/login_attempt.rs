use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::{login_attempts, prelude::*};

/// One attempt to record, before timestamps are assigned.
#[derive(Debug, Clone)]
pub struct NewLoginAttempt {
    pub ip_address: String,
    pub user_agent: Option<String>,
    pub email: Option<String>,
    pub success: bool,
    pub failure_reason: Option<String>,
}

pub struct LoginAttemptRepository {
    conn: DatabaseConnection,
}

impl LoginAttemptRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Append one attempt to the ledger. Rows are never updated afterwards.
    pub async fn add(&self, attempt: NewLoginAttempt) -> Result<()> {
        let active = login_attempts::ActiveModel {
            ip_address: Set(attempt.ip_address),
            user_agent: Set(attempt.user_agent),
            email: Set(attempt.email),
            success: Set(attempt.success),
            failure_reason: Set(attempt.failure_reason),
            created_at: Set(Utc::now().to_rfc3339()),
            ..Default::default()
        };

        LoginAttempts::insert(active)
            .exec(&self.conn)
            .await
            .context("Failed to insert login attempt")?;

        Ok(())
    }

    /// Count attempts from one source address strictly newer than
    /// `window_start`. The strict comparison keeps the window half-open:
    /// a row exactly at the boundary age is not counted.
    pub async fn count_since(&self, ip_address: &str, window_start: DateTime<Utc>) -> Result<u64> {
        let count = LoginAttempts::find()
            .filter(login_attempts::Column::IpAddress.eq(ip_address))
            .filter(login_attempts::Column::CreatedAt.gt(window_start.to_rfc3339()))
            .count(&self.conn)
            .await
            .context("Failed to count login attempts")?;

        Ok(count)
    }

    /// Most recent attempts, newest first. Used by the operational surface.
    pub async fn recent(&self, limit: u64) -> Result<Vec<login_attempts::Model>> {
        let attempts = LoginAttempts::find()
            .order_by_desc(login_attempts::Column::CreatedAt)
            .paginate(&self.conn, limit)
            .fetch_page(0)
            .await
            .context("Failed to fetch recent login attempts")?;

        Ok(attempts)
    }
}
