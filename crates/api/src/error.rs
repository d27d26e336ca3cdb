//! Error responses.
//!
//! Every failing endpoint answers with `{ok: false, error, msg}`. Client
//! errors carry the domain message; server errors are logged and replaced
//! by a generic one.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use payroll_core::account::AccountError;
use payroll_core::advance::AdvanceError;
use payroll_core::import::ImportError;
use payroll_core::loan::LoanError;
use payroll_shared::AppError;
use payroll_shared::error::error_body;
use thiserror::Error;
use tracing::error;

/// Any error a handler can return.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Cross-cutting failure.
    #[error(transparent)]
    App(#[from] AppError),

    /// Account failure.
    #[error(transparent)]
    Account(#[from] AccountError),

    /// Advance workflow failure.
    #[error(transparent)]
    Advance(#[from] AdvanceError),

    /// Salary import failure.
    #[error(transparent)]
    Import(#[from] ImportError),

    /// Loan ledger failure.
    #[error(transparent)]
    Loan(#[from] LoanError),

    /// The account still uses the default password.
    #[error("Change your password before continuing")]
    PasswordChangeRequired,
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Shorthand for a 400 with a message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::App(AppError::Validation(msg.into()))
    }

    /// Shorthand for a 403 with a message.
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::App(AppError::Forbidden(msg.into()))
    }

    /// Shorthand for a 404 with a message.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::App(AppError::NotFound(msg.into()))
    }

    /// Returns the HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        let code = match self {
            Self::App(e) => e.status_code(),
            Self::Account(e) => e.status_code(),
            Self::Advance(e) => e.status_code(),
            Self::Import(e) => e.status_code(),
            Self::Loan(e) => e.status_code(),
            Self::PasswordChangeRequired => 403,
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Returns the machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::App(e) => e.error_code(),
            Self::Account(e) => e.error_code(),
            Self::Advance(e) => e.error_code(),
            Self::Import(e) => e.error_code(),
            Self::Loan(e) => e.error_code(),
            Self::PasswordChangeRequired => "PASSWORD_CHANGE_REQUIRED",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();
        let msg = if status.is_server_error() {
            error!(error = %self, code, "request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(error_body(code, &msg))).into_response()
    }
}
