use anyhow::{Context, Result};
use chrono::Utc;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::{prelude::*, security_events};

#[derive(Debug, Clone)]
pub struct NewSecurityEvent {
    pub account_id: Option<i32>,
    pub event_type: String,
    pub ip_address: String,
    pub user_agent: Option<String>,
    pub details: String,
    pub severity: String,
}

pub struct SecurityEventRepository {
    conn: DatabaseConnection,
}

impl SecurityEventRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn add(&self, event: NewSecurityEvent) -> Result<()> {
        let active = security_events::ActiveModel {
            account_id: Set(event.account_id),
            event_type: Set(event.event_type),
            ip_address: Set(event.ip_address),
            user_agent: Set(event.user_agent),
            details: Set(event.details),
            severity: Set(event.severity),
            created_at: Set(Utc::now().to_rfc3339()),
            ..Default::default()
        };

        SecurityEvents::insert(active)
            .exec(&self.conn)
            .await
            .context("Failed to insert security event")?;

        Ok(())
    }

    /// Newest events first, optionally restricted to one category.
    pub async fn recent(
        &self,
        limit: u64,
        event_type: Option<&str>,
    ) -> Result<Vec<security_events::Model>> {
        let mut query = SecurityEvents::find().order_by_desc(security_events::Column::CreatedAt);

        if let Some(event_type) = event_type {
            query = query.filter(security_events::Column::EventType.eq(event_type));
        }

        let events = query
            .paginate(&self.conn, limit)
            .fetch_page(0)
            .await
            .context("Failed to fetch recent security events")?;

        Ok(events)
    }
}
