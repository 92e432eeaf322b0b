//! Authentication error types.

use thiserror::Error;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email or password did not match.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Hashing a password failed.
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    /// Session lifetime does not fit the date range.
    #[error("Session lifetime out of range")]
    SessionTtlOutOfRange,

    /// Session storage failed.
    #[error("Session storage error: {0}")]
    Storage(String),
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for AuthError {
    fn from(e: sqlx::Error) -> Self {
        AuthError::Storage(e.to_string())
    }
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;
