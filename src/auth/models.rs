//! Authentication Models
//! Mission: Define account, role and token data structures

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account record. The role discriminator selects the variant.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub role: Role,
    pub created_at: String,
}

/// Account roles gating route access
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Role {
    #[serde(rename = "user")]
    User, // Uploads assignments
    #[serde(rename = "admin")]
    Admin, // Reviews assignments addressed to them
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT Claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // subject (account id)
    pub role: Role,
    pub iat: usize,
    pub exp: usize, // expiration timestamp
}

impl Claims {
    /// Account id carried in `sub`, if it is a well-formed UUID.
    pub fn account_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

/// Register request body. Fields are optional so missing ones surface as
/// validation errors instead of extractor rejections.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

/// Login request body
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
}

/// Result of a registration attempt against the account store
#[derive(Debug)]
pub enum NewAccount {
    Created(Account),
    /// The email is already held by an account of this role.
    EmailTaken(Role),
}
