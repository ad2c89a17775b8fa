//! JWT Token Handler
//! Mission: Generate and validate JWT tokens securely

use crate::auth::models::{Account, Claims};
use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

/// JWT Handler for token operations
pub struct JwtHandler {
    secret: String,
    expiration: Duration,
}

impl JwtHandler {
    /// Create a new JWT handler with secret key
    pub fn new(secret: String) -> Self {
        Self::with_expiration(secret, Duration::days(1))
    }

    /// Create a JWT handler with a custom token lifetime
    pub fn with_expiration(secret: String, expiration: Duration) -> Self {
        Self { secret, expiration }
    }

    /// Generate a JWT token for an account
    pub fn generate_token(&self, account: &Account) -> Result<String> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(self.expiration)
            .context("Invalid timestamp")?
            .timestamp()
            .max(0) as usize;

        let claims = Claims {
            sub: account.id.to_string(),
            role: account.role,
            iat: now.timestamp() as usize,
            exp: expiration,
        };

        debug!(
            "Generating JWT for {} {}, expires in {}h",
            account.role,
            account.id,
            self.expiration.num_hours()
        );

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to generate JWT")
    }

    /// Validate a JWT token and extract claims
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .context("Invalid or expired token")?;

        debug!("Validated JWT for {} {}", decoded.claims.role, decoded.claims.sub);

        Ok(decoded.claims)
    }
}
