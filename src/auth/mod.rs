//! Authentication Module
//! Mission: Account registration, JWT login, and role-gated route access

pub mod account_store;
pub mod api;
pub mod jwt;
pub mod middleware;
pub mod models;

pub use account_store::AccountStore;
pub use jwt::JwtHandler;
pub use middleware::{access_guard, AccessGuard};
pub use models::{Claims, Role};
