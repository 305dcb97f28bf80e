//! Account error types.

use thiserror::Error;

use crate::errors::{ErrorKind, RosterError};

/// Account and authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Password hashing failed
    #[error("Password hashing failed")]
    Hashing,

    /// Email or password did not match
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Account not found
    #[error("Account not found")]
    AccountNotFound,

    /// Email already exists
    #[error("Email already exists")]
    EmailTaken,

    /// Invalid email format
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Password too weak
    #[error("Password too weak: {0}")]
    WeakPassword(String),

    /// JWT token error
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// Storage or provisioning failure below the account layer
    #[error(transparent)]
    Roster(RosterError),
}

impl AuthError {
    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Database and JWT errors are sanitized to prevent information disclosure
    /// about the internal system structure.
    pub fn client_message(&self) -> String {
        match self {
            AuthError::Database(_) | AuthError::Hashing => "Internal server error".to_string(),
            AuthError::Jwt(_) => "Authentication failed".to_string(),
            AuthError::Roster(err) => err.client_message(),
            _ => self.to_string(),
        }
    }

    /// Category of this error, in the same terms as roster errors
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidCredentials
            | AuthError::InvalidEmail(_)
            | AuthError::WeakPassword(_)
            | AuthError::EmailTaken => ErrorKind::Validation,
            AuthError::AccountNotFound => ErrorKind::NotFound,
            AuthError::Roster(err) => err.kind(),
            AuthError::Database(_) | AuthError::Hashing | AuthError::Jwt(_) => ErrorKind::Internal,
        }
    }
}

impl From<RosterError> for AuthError {
    fn from(err: RosterError) -> Self {
        match err {
            RosterError::Database(e) => AuthError::Database(e),
            other => AuthError::Roster(other),
        }
    }
}

/// Result type for account operations
pub type AuthResult<T> = Result<T, AuthError>;
