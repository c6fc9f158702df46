//! Domain service for authentication and registration.
//!
//! Handles credential verification, account creation, and attempt
//! bookkeeping. Session issuance stays in the API layer.

use thiserror::Error;

use crate::db::Account;
use crate::security::PasswordViolation;
use crate::services::audit::ClientContext;

/// Errors specific to authentication operations.
///
/// `InvalidCredentials` deliberately carries no detail; whether the email
/// was unknown, the password wrong, or the account suspended is recorded in
/// the attempt ledger and never surfaced to the caller.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Username is already taken. Please choose a different one.")]
    UsernameTaken,

    #[error("Email is already registered. Please use a different email or try logging in.")]
    EmailTaken,

    #[error("{0}")]
    PasswordPolicy(#[from] PasswordViolation),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Account not found")]
    AccountNotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A registration submission, before any validation.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials and returns the account. Exactly one ledger row
    /// is recorded per call, success or failure.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] on any authentication
    /// failure, without distinguishing the cause.
    async fn login(
        &self,
        client: &ClientContext,
        email: &str,
        password: &str,
    ) -> Result<Account, AuthError>;

    /// Validates and creates a new account with default flags
    /// (`is_admin=false`, `is_active=true`).
    ///
    /// # Errors
    ///
    /// Returns a field-level error for collisions, confirmation mismatch,
    /// markup-laced fields, or password-policy violations.
    async fn register(
        &self,
        client: &ClientContext,
        registration: Registration,
    ) -> Result<Account, AuthError>;

    /// Gets information for an authenticated account.
    async fn account_info(&self, id: i32) -> Result<Account, AuthError>;
}
