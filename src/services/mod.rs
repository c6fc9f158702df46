pub mod admin_service;
pub mod admin_service_impl;
pub mod audit;
pub mod auth_service;
pub mod auth_service_impl;

pub use admin_service::{AdminError, AdminService};
pub use admin_service_impl::SeaOrmAdminService;
pub use audit::{AuditLog, ClientContext};
pub use auth_service::{AuthError, AuthService, Registration};
pub use auth_service_impl::SeaOrmAuthService;
