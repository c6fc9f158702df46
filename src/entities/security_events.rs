use sea_orm::entity::prelude::*;

/// Append-only record of flagged/blocked requests and security-relevant
/// administrative actions.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "security_events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub account_id: Option<i32>,

    /// Free-form tag, e.g. "suspicious_user_agent", "request_blocked".
    pub event_type: String,

    pub ip_address: String,

    pub user_agent: Option<String>,

    pub details: String,

    /// "info" | "warning" | "critical"
    pub severity: String,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
