//! Server error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use entities::ValidationErrors;
use serde_json::json;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Input failed validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Authentication required.
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Missing or mismatched CSRF token.
    #[error("Invalid authenticity token")]
    InvalidCsrfToken,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] todo_store::StoreError),

    /// Authentication error.
    #[error("Auth error: {0}")]
    Auth(#[from] auth::AuthError),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Creates the not found error for a todo.
    pub fn todo_not_found() -> Self {
        Self::NotFound("Todo not found".to_string())
    }

    /// Creates a validation error with a single message.
    pub fn invalid(message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add_base(message);
        Self::Validation(errors)
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ServerError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "errors": errors }),
            ),
            ServerError::NotFound(message) => {
                (StatusCode::NOT_FOUND, json!({ "error": message }))
            }
            ServerError::AuthenticationRequired => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Authentication required" }),
            ),
            ServerError::InvalidCsrfToken => (
                StatusCode::FORBIDDEN,
                json!({ "error": "Invalid authenticity token" }),
            ),
            ServerError::Auth(auth::AuthError::InvalidCredentials) => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Invalid email or password" }),
            ),
            other => {
                tracing::error!(error = %other, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
