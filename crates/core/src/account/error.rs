//! Account error types.

use thiserror::Error;
use uuid::Uuid;

use super::password::PasswordError;

/// Errors raised by account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Account not found.
    #[error("Account {0} not found")]
    NotFound(Uuid),

    /// One of the password fields is empty.
    #[error("Both password fields are required")]
    PasswordRequired,

    /// The two entries differ.
    #[error("Passwords do not match")]
    PasswordMismatch,

    /// Password shorter than the policy allows.
    #[error("Password must be at least {min} characters")]
    PasswordTooShort {
        /// Minimum accepted length.
        min: usize,
    },

    /// The default password cannot be chosen again.
    #[error("Choose a password other than the default one")]
    DefaultPasswordReused,

    /// Only plain employees can have their password reset.
    #[error("Password reset is only allowed for employee accounts")]
    ResetNotAllowed,

    /// Password hashing failed.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl AccountError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::PasswordRequired
            | Self::PasswordMismatch
            | Self::PasswordTooShort { .. }
            | Self::DefaultPasswordReused => 400,
            Self::ResetNotAllowed => 403,
            Self::NotFound(_) => 404,
            Self::Password(_) | Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::PasswordRequired => "PASSWORD_REQUIRED",
            Self::PasswordMismatch => "PASSWORD_MISMATCH",
            Self::PasswordTooShort { .. } => "PASSWORD_TOO_SHORT",
            Self::DefaultPasswordReused => "DEFAULT_PASSWORD_REUSED",
            Self::ResetNotAllowed => "RESET_NOT_ALLOWED",
            Self::Password(_) => "PASSWORD_HASH_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}
