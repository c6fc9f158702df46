use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tokio::task;

use crate::config::SecurityConfig;
use crate::entities::accounts;

/// Account data returned from the repository (without the password hash)
#[derive(Debug, Clone)]
pub struct Account {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub is_active: bool,
    pub created_at: String,
}

impl From<accounts::Model> for Account {
    fn from(model: accounts::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            is_admin: model.is_admin,
            is_active: model.is_active,
            created_at: model.created_at,
        }
    }
}

/// Outcome of a credential check. The distinction between the failure
/// variants feeds the attempt ledger only; callers surface a single
/// generic message.
#[derive(Debug, Clone)]
pub enum CredentialOutcome {
    Verified(Account),
    UnknownEmail,
    InvalidPassword,
}

pub struct AccountRepository {
    conn: DatabaseConnection,
}

impl AccountRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<Account>> {
        let account = accounts::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query account by ID")?;

        Ok(account.map(Account::from))
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<Account>> {
        let account = accounts::Entity::find()
            .filter(accounts::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query account by email")?;

        Ok(account.map(Account::from))
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        let account = accounts::Entity::find()
            .filter(accounts::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query account by username")?;

        Ok(account.is_some())
    }

    pub async fn list_all(&self) -> Result<Vec<Account>> {
        let accounts = accounts::Entity::find()
            .all(&self.conn)
            .await
            .context("Failed to list accounts")?;

        Ok(accounts.into_iter().map(Account::from).collect())
    }

    /// Look up by email and verify the password against the stored hash.
    /// Note: This uses `spawn_blocking` because Argon2 verification is
    /// CPU-intensive and would block the async runtime if run directly.
    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<CredentialOutcome> {
        let account = accounts::Entity::find()
            .filter(accounts::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query account for credential verification")?;

        let Some(account) = account else {
            return Ok(CredentialOutcome::UnknownEmail);
        };

        let password_hash = account.password_hash.clone();
        let password = password.to_string();

        let is_valid = task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash)
                .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

            let argon2 = Argon2::default();
            Ok::<bool, anyhow::Error>(
                argon2
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
            )
        })
        .await
        .context("Password verification task panicked")??;

        if is_valid {
            Ok(CredentialOutcome::Verified(Account::from(account)))
        } else {
            Ok(CredentialOutcome::InvalidPassword)
        }
    }

    /// Create an account from a pre-hashed password. New accounts are
    /// regular active users; role escalation goes through the admin toggles.
    pub async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: String,
    ) -> Result<Account> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = accounts::ActiveModel {
            username: Set(username.to_string()),
            email: Set(email.to_string()),
            password_hash: Set(password_hash),
            is_admin: Set(false),
            is_active: Set(true),
            created_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert account")?;

        Ok(Account::from(model))
    }

    /// Flip the active flag, returning the updated account.
    pub async fn toggle_active(&self, id: i32) -> Result<Option<Account>> {
        let Some(account) = accounts::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query account for status toggle")?
        else {
            return Ok(None);
        };

        let new_state = !account.is_active;
        let mut active: accounts::ActiveModel = account.into();
        active.is_active = Set(new_state);
        let model = active.update(&self.conn).await?;

        Ok(Some(Account::from(model)))
    }

    /// Flip the admin flag, returning the updated account.
    pub async fn toggle_admin(&self, id: i32) -> Result<Option<Account>> {
        let Some(account) = accounts::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query account for admin toggle")?
        else {
            return Ok(None);
        };

        let new_state = !account.is_admin;
        let mut active: accounts::ActiveModel = account.into();
        active.is_admin = Set(new_state);
        let model = active.update(&self.conn).await?;

        Ok(Some(Account::from(model)))
    }
}

/// Hash a password using Argon2id with optional custom params.
/// If config is None, uses default params.
pub fn hash_password(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = config {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None, // output length (use default)
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}
