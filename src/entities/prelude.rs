pub use super::accounts::Entity as Accounts;
pub use super::login_attempts::Entity as LoginAttempts;
pub use super::security_events::Entity as SecurityEvents;
