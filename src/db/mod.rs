use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;

pub mod migrator;
pub mod repositories;

pub use repositories::account::{Account, CredentialOutcome, hash_password};
pub use repositories::login_attempt::NewLoginAttempt;
pub use repositories::security_event::NewSecurityEvent;

pub use crate::entities::login_attempts::Model as LoginAttempt;
pub use crate::entities::security_events::Model as SecurityEvent;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.starts_with(":memory:") && !db_url.contains("::memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn account_repo(&self) -> repositories::account::AccountRepository {
        repositories::account::AccountRepository::new(self.conn.clone())
    }

    fn login_attempt_repo(&self) -> repositories::login_attempt::LoginAttemptRepository {
        repositories::login_attempt::LoginAttemptRepository::new(self.conn.clone())
    }

    fn security_event_repo(&self) -> repositories::security_event::SecurityEventRepository {
        repositories::security_event::SecurityEventRepository::new(self.conn.clone())
    }

    // ------------------------------------------------------------------
    // Accounts
    // ------------------------------------------------------------------

    pub async fn get_account(&self, id: i32) -> Result<Option<Account>> {
        self.account_repo().get_by_id(id).await
    }

    pub async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        self.account_repo().get_by_email(email).await
    }

    pub async fn account_username_exists(&self, username: &str) -> Result<bool> {
        self.account_repo().username_exists(username).await
    }

    pub async fn list_accounts(&self) -> Result<Vec<Account>> {
        self.account_repo().list_all().await
    }

    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<CredentialOutcome> {
        self.account_repo().verify_credentials(email, password).await
    }

    pub async fn create_account(
        &self,
        username: &str,
        email: &str,
        password: &str,
        security: &SecurityConfig,
    ) -> Result<Account> {
        let password = password.to_string();
        let security = security.clone();

        // Argon2 hashing is CPU-bound; keep it off the async runtime.
        let password_hash =
            tokio::task::spawn_blocking(move || hash_password(&password, Some(&security)))
                .await
                .map_err(|_| anyhow::anyhow!("Password hashing task panicked"))??;

        self.account_repo().create(username, email, password_hash).await
    }

    pub async fn toggle_account_active(&self, id: i32) -> Result<Option<Account>> {
        self.account_repo().toggle_active(id).await
    }

    pub async fn toggle_account_admin(&self, id: i32) -> Result<Option<Account>> {
        self.account_repo().toggle_admin(id).await
    }

    // ------------------------------------------------------------------
    // Ledgers
    // ------------------------------------------------------------------

    pub async fn add_login_attempt(&self, attempt: NewLoginAttempt) -> Result<()> {
        self.login_attempt_repo().add(attempt).await
    }

    pub async fn count_login_attempts_since(
        &self,
        ip_address: &str,
        window_start: DateTime<Utc>,
    ) -> Result<u64> {
        self.login_attempt_repo()
            .count_since(ip_address, window_start)
            .await
    }

    pub async fn recent_login_attempts(&self, limit: u64) -> Result<Vec<LoginAttempt>> {
        self.login_attempt_repo().recent(limit).await
    }

    pub async fn add_security_event(&self, event: NewSecurityEvent) -> Result<()> {
        self.security_event_repo().add(event).await
    }

    pub async fn recent_security_events(
        &self,
        limit: u64,
        event_type: Option<&str>,
    ) -> Result<Vec<SecurityEvent>> {
        self.security_event_repo().recent(limit, event_type).await
    }
}
