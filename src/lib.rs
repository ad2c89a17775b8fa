//! Assignment Portal Backend Library
//!
//! Users upload tasks to named admins; admins accept or reject the tasks
//! addressed to them. Exposes every module so the binary and the
//! integration tests share one router.

pub mod app;
pub mod assignments;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;

pub use app::{router, AppState};
pub use config::Config;
pub use error::ApiError;
