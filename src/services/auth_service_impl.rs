//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;

use crate::config::SecurityConfig;
use crate::db::{Account, CredentialOutcome, Store};
use crate::security::filter::match_markup_signature;
use crate::security::password::PasswordPolicy;
use crate::services::audit::{AuditLog, ClientContext};
use crate::services::auth_service::{AuthError, AuthService, Registration};

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 30;
const EMAIL_MAX: usize = 120;

pub struct SeaOrmAuthService {
    store: Store,
    audit: AuditLog,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub fn new(store: Store, audit: AuditLog, security: SecurityConfig) -> Self {
        Self {
            store,
            audit,
            security,
        }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(
        &self,
        client: &ClientContext,
        email: &str,
        password: &str,
    ) -> Result<Account, AuthError> {
        // Field-level scan, same signature set as the request filter.
        // Rejections here are validation errors, not security events.
        if match_markup_signature(email).is_some() {
            return Err(AuthError::Validation(
                "Invalid email format detected".to_string(),
            ));
        }

        let outcome = self.store.verify_credentials(email, password).await?;

        let failure_reason = match outcome {
            CredentialOutcome::Verified(account) if account.is_active => {
                self.audit
                    .login_attempt(client, Some(email), true, None)
                    .await;
                return Ok(account);
            }
            // A suspended account fails exactly like a bad password.
            CredentialOutcome::Verified(_) => "account_disabled",
            CredentialOutcome::UnknownEmail => "unknown_email",
            CredentialOutcome::InvalidPassword => "invalid_password",
        };

        self.audit
            .login_attempt(client, Some(email), false, Some(failure_reason))
            .await;

        Err(AuthError::InvalidCredentials)
    }

    async fn register(
        &self,
        client: &ClientContext,
        registration: Registration,
    ) -> Result<Account, AuthError> {
        let username = registration.username.trim().to_string();
        let email = normalize_email(&registration.email);

        validate_username(&username)?;
        validate_email(&email)?;

        if match_markup_signature(&registration.password).is_some() {
            return Err(AuthError::Validation("Invalid input detected".to_string()));
        }

        if registration.password != registration.confirm_password {
            return Err(AuthError::Validation("Passwords must match".to_string()));
        }

        if self.store.account_username_exists(&username).await? {
            return Err(AuthError::UsernameTaken);
        }

        if self.store.get_account_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        PasswordPolicy.check(&registration.password)?;

        let account = self
            .store
            .create_account(&username, &email, &registration.password, &self.security)
            .await?;

        self.audit
            .security_event(
                client,
                Some(account.id),
                "account_registered",
                format!("Account '{username}' registered"),
                "info",
            )
            .await;

        Ok(account)
    }

    async fn account_info(&self, id: i32) -> Result<Account, AuthError> {
        self.store
            .get_account(id)
            .await?
            .ok_or(AuthError::AccountNotFound)
    }
}

/// Lowercase the email; uniqueness is enforced on this form.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_username(username: &str) -> Result<(), AuthError> {
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&username.chars().count()) {
        return Err(AuthError::Validation(format!(
            "Username must be between {USERNAME_MIN} and {USERNAME_MAX} characters"
        )));
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(AuthError::Validation(
            "Username can only contain letters, numbers, underscores, and hyphens".to_string(),
        ));
    }

    Ok(())
}

fn validate_email(email: &str) -> Result<(), AuthError> {
    if email.is_empty() || email.len() > EMAIL_MAX {
        return Err(AuthError::Validation(
            "Please enter a valid email address".to_string(),
        ));
    }

    // Shape check only; deliverability is not this service's concern.
    let Some((local, domain)) = email.split_once('@') else {
        return Err(AuthError::Validation(
            "Please enter a valid email address".to_string(),
        ));
    };

    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(AuthError::Validation(
            "Please enter a valid email address".to_string(),
        ));
    }

    if match_markup_signature(email).is_some() {
        return Err(AuthError::Validation(
            "Invalid email format detected".to_string(),
        ));
    }

    Ok(())
}
