use sea_orm::entity::prelude::*;

/// One authentication attempt, successful or not. Rows are append-only and
/// never updated; the lockout policy only counts them.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "login_attempts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub ip_address: String,

    pub user_agent: Option<String>,

    pub email: Option<String>,

    pub success: bool,

    /// Internal reason, never surfaced to the caller.
    pub failure_reason: Option<String>,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
