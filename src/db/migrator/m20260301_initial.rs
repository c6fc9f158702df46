use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Bootstrap administrator credentials. The password is expected to be
/// rotated immediately after first login.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";
pub const DEFAULT_ADMIN_PASSWORD: &str = "ChangeMe!12345";

/// Hash the default password using Argon2id
fn hash_default_password() -> String {
    use argon2::{
        Argon2,
        password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
    };

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(DEFAULT_ADMIN_PASSWORD.as_bytes(), &salt)
        .expect("Failed to hash default password")
        .to_string()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Accounts)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(LoginAttempts)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(SecurityEvents)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Windowed throttle counting filters on (ip_address, created_at)
        manager
            .create_index(
                Index::create()
                    .name("idx_login_attempts_ip_created_at")
                    .table(LoginAttempts)
                    .col(crate::entities::login_attempts::Column::IpAddress)
                    .col(crate::entities::login_attempts::Column::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_security_events_created_at")
                    .table(SecurityEvents)
                    .col(crate::entities::security_events::Column::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Seed bootstrap administrator
        let now = chrono::Utc::now().to_rfc3339();
        let password_hash = hash_default_password();

        let insert = sea_orm_migration::sea_query::Query::insert()
            .into_table(Accounts)
            .columns([
                crate::entities::accounts::Column::Username,
                crate::entities::accounts::Column::Email,
                crate::entities::accounts::Column::PasswordHash,
                crate::entities::accounts::Column::IsAdmin,
                crate::entities::accounts::Column::IsActive,
                crate::entities::accounts::Column::CreatedAt,
            ])
            .values_panic([
                DEFAULT_ADMIN_USERNAME.into(),
                DEFAULT_ADMIN_EMAIL.into(),
                password_hash.into(),
                true.into(),
                true.into(),
                now.into(),
            ])
            .to_owned();

        manager.exec_stmt(insert).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SecurityEvents).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(LoginAttempts).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Accounts).to_owned())
            .await?;

        Ok(())
    }
}
