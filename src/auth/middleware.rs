//! Authentication Middleware
//! Mission: Protect routes with JWT validation and role gating

use crate::auth::{
    jwt::JwtHandler,
    models::{Claims, Role},
};
use crate::error::ApiError;
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use std::sync::Arc;
use tracing::debug;

const MISSING_TOKEN: &str = "No token, authorization denied";
const INVALID_TOKEN: &str = "Invalid token";

/// Guard configuration: the token verifier plus the role a route requires
#[derive(Clone)]
pub struct AccessGuard {
    jwt_handler: Arc<JwtHandler>,
    required_role: Role,
}

impl AccessGuard {
    /// Guard that requires a valid token whose role equals `role`
    pub fn require(jwt_handler: Arc<JwtHandler>, role: Role) -> Self {
        Self {
            jwt_handler,
            required_role: role,
        }
    }

    /// Validate a bearer token against this guard. Never touches storage.
    pub fn check(&self, token: Option<&str>) -> Result<Claims, ApiError> {
        let token = token.ok_or(ApiError::Unauthenticated(MISSING_TOKEN))?;

        let claims = self
            .jwt_handler
            .validate_token(token)
            .map_err(|e| {
                debug!("Rejected bearer token: {:#}", e);
                ApiError::Unauthenticated(INVALID_TOKEN)
            })?;

        if claims.role != self.required_role {
            debug!(
                "Role {} denied on {}-only route for {}",
                claims.role, self.required_role, claims.sub
            );
            return Err(ApiError::Forbidden);
        }

        Ok(claims)
    }
}

/// Auth middleware that validates the bearer token and enforces the
/// guard's role. Use with `middleware::from_fn_with_state`.
pub async fn access_guard(
    State(guard): State<AccessGuard>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = match bearer.as_ref() {
        Some(TypedHeader(auth)) => Some(auth.token()),
        None => credential_word(req.headers()),
    };
    let claims = guard.check(token)?;

    // Add claims to request extensions so handlers can access them
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Second word of a non-bearer `Authorization` header. It is still handed
/// to verification, so `Token xyz` reads as an invalid token rather than a
/// missing one.
fn credential_word(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .split(' ')
        .nth(1)
        .filter(|word| !word.is_empty())
}

/// Claims attached by `access_guard`, usable as a handler argument.
#[async_trait]
impl<S> FromRequestParts<S> for Claims
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .ok_or(ApiError::Unauthenticated(MISSING_TOKEN))
    }
}
