//! API error taxonomy
//!
//! Every handler returns `Result<_, ApiError>`. Each variant maps to one
//! status code and a `{"message": ...}` body; internal details are logged
//! and never sent to the client.

use crate::auth::models::Role;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt::Display;
use tracing::{debug, error};

#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed input
    Validation(&'static str),
    /// Email already registered; carries the role that holds it
    DuplicateEmail(Role),
    /// Unknown email, wrong password or wrong role: indistinguishable
    InvalidCredentials,
    /// Missing, invalid or expired bearer token
    Unauthenticated(&'static str),
    /// Valid token, wrong role
    Forbidden,
    NotFound(&'static str),
    /// Assignment missing or owned by another admin
    NotFoundOrUnauthorized,
    /// Store or other internal fault, with the client-facing message
    Internal(&'static str),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::DuplicateEmail(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials | ApiError::Unauthenticated(_) => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) | ApiError::NotFoundOrUnauthorized => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ApiError::Validation(msg)
            | ApiError::Unauthenticated(msg)
            | ApiError::NotFound(msg)
            | ApiError::Internal(msg) => *msg,
            ApiError::DuplicateEmail(Role::User) => "Email is already registered as a user.",
            ApiError::DuplicateEmail(Role::Admin) => "Email is already registered as an admin.",
            ApiError::InvalidCredentials => "Invalid credentials",
            ApiError::Forbidden => "Access denied",
            ApiError::NotFoundOrUnauthorized => "Assignment not found or not authorized",
        }
    }

    /// Map a JSON extractor rejection to a validation error.
    pub fn from_json_rejection(rejection: JsonRejection, message: &'static str) -> Self {
        debug!("Rejected request body: {}", rejection.body_text());
        ApiError::Validation(message)
    }
}

/// Build a `map_err` adapter that logs the underlying fault and reports
/// `message` to the client as a 500.
pub fn internal<E: Display>(message: &'static str) -> impl FnOnce(E) -> ApiError {
    move |err| {
        error!("{}: {:#}", message, err);
        ApiError::Internal(message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "message": self.message() }))).into_response()
    }
}
