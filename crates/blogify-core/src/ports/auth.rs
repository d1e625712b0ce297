//! Authentication and authorization ports.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Account, Role};

/// Identity carried inside a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub account_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub profile_image_url: String,
    pub role: Role,
}

impl From<&Account> for SessionIdentity {
    fn from(account: &Account) -> Self {
        Self {
            account_id: account.id,
            full_name: account.full_name.clone(),
            email: account.email.clone(),
            profile_image_url: account.profile_image_url.clone(),
            role: account.role,
        }
    }
}

/// Claims decoded from a valid session token.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub identity: SessionIdentity,
    pub exp: i64,
}

/// Token service trait for JWT operations.
pub trait TokenService: Send + Sync {
    /// Generate a session token for an identity.
    fn generate_token(&self, identity: &SessionIdentity) -> Result<String, AuthError>;

    /// Validate and decode a token.
    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Token lifetime, used for the cookie's max-age.
    fn expiration_seconds(&self) -> i64;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing session")]
    MissingAuth,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Hashing error: {0}")]
    HashingError(String),
}
