//! Authentication API Endpoints
//! Mission: Provide registration and login for users and admins

use crate::app::AppState;
use crate::auth::models::{LoginRequest, LoginResponse, NewAccount, RegisterRequest, Role};
use crate::error::{internal, ApiError};
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::{info, warn};

const REGISTER_FIELDS: &str = "Name, email, password, and role are required.";
const LOGIN_FIELDS: &str = "Email, password, and role are required.";
const INVALID_ROLE: &str = "Role must be either 'user' or 'admin'.";
const REGISTER_ERROR: &str = "Server error during registration";
const LOGIN_ERROR: &str = "Server error";

/// Register endpoint - POST /register
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(payload) =
        payload.map_err(|rejection| ApiError::from_json_rejection(rejection, REGISTER_FIELDS))?;

    let (Some(name), Some(email), Some(password), Some(role)) = (
        required(payload.name),
        required(payload.email),
        required(payload.password),
        required(payload.role),
    ) else {
        return Err(ApiError::Validation(REGISTER_FIELDS));
    };
    let role = parse_role(&role)?;

    // bcrypt is CPU-bound; keep it off the async workers
    let accounts = state.accounts.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        accounts.create_account(&name, &email, &password, role)
    })
    .await
    .map_err(internal(REGISTER_ERROR))?
    .map_err(internal(REGISTER_ERROR))?;

    match outcome {
        NewAccount::Created(account) => {
            info!("📝 Registered {} {} ({})", account.role, account.name, account.id);
            Ok((
                StatusCode::CREATED,
                Json(json!({ "message": "Registration successful" })),
            ))
        }
        NewAccount::EmailTaken(existing) => {
            warn!("❌ Registration rejected, email already held by {}", existing);
            Err(ApiError::DuplicateEmail(existing))
        }
    }
}

/// Login endpoint - POST /login
///
/// The account is looked up only among accounts of the role the caller
/// names, so a correct password under the wrong role is rejected the same
/// way as an unknown email.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(payload) =
        payload.map_err(|rejection| ApiError::from_json_rejection(rejection, LOGIN_FIELDS))?;

    let (Some(email), Some(password), Some(role)) = (
        required(payload.email),
        required(payload.password),
        required(payload.role),
    ) else {
        return Err(ApiError::Validation(LOGIN_FIELDS));
    };
    let role = parse_role(&role)?;

    info!("🔐 Login attempt: {} ({})", email, role);

    let accounts = state.accounts.clone();
    let lookup_email = email.clone();
    let account = tokio::task::spawn_blocking(move || {
        accounts.verify_password(&lookup_email, &password, role)
    })
    .await
    .map_err(internal(LOGIN_ERROR))?
    .map_err(internal(LOGIN_ERROR))?;

    let Some(account) = account else {
        warn!("❌ Failed login attempt: {} ({})", email, role);
        return Err(ApiError::InvalidCredentials);
    };

    let token = state
        .jwt_handler
        .generate_token(&account)
        .map_err(internal(LOGIN_ERROR))?;

    info!("✅ Login successful: {} ({})", account.name, account.role);

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
    }))
}

/// Treat absent and blank fields alike.
fn required(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.trim().is_empty())
}

fn parse_role(raw: &str) -> Result<Role, ApiError> {
    Role::from_str(raw.trim()).ok_or(ApiError::Validation(INVALID_ROLE))
}
