pub mod account;
pub mod login_attempt;
pub mod security_event;
