//! Import error types.

use thiserror::Error;
use uuid::Uuid;

use crate::storage::StorageError;

/// Errors that can occur while importing a salary spreadsheet.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Extension is not a supported spreadsheet format.
    #[error("Unsupported file type: {file_name}")]
    UnsupportedFormat {
        /// Uploaded file name.
        file_name: String,
    },

    /// The file could not be parsed.
    #[error("Could not read spreadsheet: {0}")]
    Unreadable(String),

    /// A required header is absent.
    #[error("Missing column in file: {0}")]
    MissingColumn(String),

    /// A non-blank row without an employee id.
    #[error("Row {row}: employee id is empty")]
    MissingEmployeeId {
        /// Spreadsheet row number (header is row 1).
        row: usize,
    },

    /// A line-item cell is not a number.
    #[error("Row {row}, column {column}: '{value}' is not a number")]
    InvalidValue {
        /// Spreadsheet row number (header is row 1).
        row: usize,
        /// Column header.
        column: String,
        /// Raw cell text.
        value: String,
    },

    /// The job was cancelled before it finished.
    #[error("import cancelled")]
    Cancelled,

    /// The worker panicked.
    #[error("import worker stopped unexpectedly")]
    WorkerPanicked,

    /// No running job with this id.
    #[error("Import job {0} is not running")]
    JobNotRunning(Uuid),

    /// Staging error.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Hashing the default password failed.
    #[error("Password hashing failed: {0}")]
    Password(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl ImportError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::UnsupportedFormat { .. }
            | Self::Unreadable(_)
            | Self::MissingColumn(_)
            | Self::MissingEmployeeId { .. }
            | Self::InvalidValue { .. } => 400,

            Self::JobNotRunning(_) => 404,

            Self::Cancelled => 409,

            Self::Storage(e) => e.status_code(),

            Self::WorkerPanicked | Self::Password(_) | Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            Self::Unreadable(_) => "UNREADABLE_FILE",
            Self::MissingColumn(_) => "MISSING_COLUMN",
            Self::MissingEmployeeId { .. } => "MISSING_EMPLOYEE_ID",
            Self::InvalidValue { .. } => "INVALID_VALUE",
            Self::Cancelled => "IMPORT_CANCELLED",
            Self::WorkerPanicked => "WORKER_PANICKED",
            Self::JobNotRunning(_) => "JOB_NOT_RUNNING",
            Self::Storage(StorageError::FileTooLarge { .. }) => "FILE_TOO_LARGE",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Password(_) => "PASSWORD_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}
