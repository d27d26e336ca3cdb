//! Application-wide error types.

use serde_json::{Value, json};
use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// Domain crates keep their own error enums; this one covers the failures
/// that cut across them and gives every error the same response envelope.
#[derive(Debug, Error)]
pub enum AppError {
    /// Caller lacks the required role.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the client-facing message.
    ///
    /// Server-side failures never leak their detail.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Forbidden(m) | Self::NotFound(m) | Self::Validation(m) => m.clone(),
            Self::Database(_) => "internal server error".to_string(),
        }
    }

    /// Builds the `{ok: false, error, msg}` response envelope.
    #[must_use]
    pub fn body(&self) -> Value {
        error_body(self.error_code(), &self.public_message())
    }
}

/// Builds the `{ok: false, error, msg}` envelope used by every failing endpoint.
#[must_use]
pub fn error_body(code: &str, msg: &str) -> Value {
    json!({
        "ok": false,
        "error": code,
        "msg": msg,
    })
}
