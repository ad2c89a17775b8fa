//! Application state and HTTP routing
//!
//! # Endpoints
//!
//! Users, under `/api/users`:
//! - `POST /register`, `POST /login`
//! - `POST /upload` - upload an assignment (user token)
//! - `GET /admins` - admin names for the upload form (user token)
//!
//! Admins, under `/api/admins`:
//! - `POST /register`, `POST /login`
//! - `GET /assignments` - assignments addressed to the caller (admin token)
//! - `POST /assignments/:id/accept` (admin token)
//! - `POST /assignments/:id/reject` (admin token)

use crate::assignments::{api as assignment_api, AssignmentStore};
use crate::auth::{access_guard, api as auth_api, AccessGuard, AccountStore, JwtHandler, Role};
use crate::config::Config;
use crate::db::Database;
use crate::middleware::request_logging;
use anyhow::Result;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use chrono::Duration;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountStore>,
    pub assignments: Arc<AssignmentStore>,
    pub jwt_handler: Arc<JwtHandler>,
}

impl AppState {
    pub fn new(db: Database, jwt_handler: JwtHandler, bcrypt_cost: u32) -> Self {
        Self {
            accounts: Arc::new(AccountStore::new(db.clone(), bcrypt_cost)),
            assignments: Arc::new(AssignmentStore::new(db)),
            jwt_handler: Arc::new(jwt_handler),
        }
    }

    /// Open the configured database and build the state around it
    pub fn from_config(config: &Config) -> Result<Self> {
        let db = Database::open(config.resolved_db_path())?;
        let jwt_handler = JwtHandler::with_expiration(
            config.jwt_secret.clone(),
            Duration::hours(config.token_ttl_hours),
        );
        Ok(Self::new(db, jwt_handler, config.bcrypt_cost))
    }
}

/// Build the full router
pub fn router(state: AppState) -> Router {
    let user_routes = Router::new()
        .route("/upload", post(assignment_api::upload_assignment))
        .route("/admins", get(assignment_api::list_admins))
        .route_layer(middleware::from_fn_with_state(
            AccessGuard::require(state.jwt_handler.clone(), Role::User),
            access_guard,
        ))
        .merge(account_routes());

    let admin_routes = Router::new()
        .route("/assignments", get(assignment_api::view_assignments))
        .route(
            "/assignments/:id/accept",
            post(assignment_api::accept_assignment),
        )
        .route(
            "/assignments/:id/reject",
            post(assignment_api::reject_assignment),
        )
        .route_layer(middleware::from_fn_with_state(
            AccessGuard::require(state.jwt_handler.clone(), Role::Admin),
            access_guard,
        ))
        .merge(account_routes());

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/users", user_routes)
        .nest("/api/admins", admin_routes)
        .layer(middleware::from_fn(request_logging))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Public registration and login, mounted in both groups
fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth_api::register))
        .route("/login", post(auth_api::login))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
