pub mod prelude;

pub mod accounts;
pub mod login_attempts;
pub mod security_events;
