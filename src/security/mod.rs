//! Pure security-policy logic: request filtering heuristics, the password
//! policy, and windowed throttle arithmetic.
//!
//! Everything in this module is deterministic and side-effect-free; the
//! database-facing pieces (ledger writes, attempt counting) live in the
//! repositories and services.

pub mod filter;
pub mod password;
pub mod policy;

pub use filter::{FilterPolicy, Flag, RequestDescriptor, Verdict};
pub use password::{PasswordPolicy, PasswordViolation};
pub use policy::ThrottlePolicy;
