//! Advance error types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use super::types::AdvanceType;

/// Errors that can occur during advance operations.
#[derive(Debug, Error)]
pub enum AdvanceError {
    /// No open period for the requested type.
    #[error("The {advance_type} advance period is not open now")]
    PeriodClosed {
        /// Requested type.
        advance_type: AdvanceType,
    },

    /// The employee has no positive base salary on record.
    #[error("Advances are not allowed without a recorded base salary")]
    NoBaseSalary,

    /// A request already exists for this type and period.
    #[error("A {advance_type} advance request already exists for the current period")]
    AlreadyRequested {
        /// Requested type.
        advance_type: AdvanceType,
    },

    /// Amount under the minimum.
    #[error("Advance amount {amount} is below the minimum of {min}")]
    AmountBelowMinimum {
        /// Requested amount.
        amount: Decimal,
        /// Minimum allowed.
        min: Decimal,
    },

    /// Amount over a quarter of the base salary.
    #[error("Advance amount {amount} exceeds the maximum of {max}")]
    AmountAboveMaximum {
        /// Requested amount.
        amount: Decimal,
        /// Maximum allowed.
        max: Decimal,
    },

    /// The employee can no longer touch the request.
    #[error("This request cannot be changed now")]
    NotAllowedNow,

    /// The request was finalized and is read-only.
    #[error("Request {0} has been finalized and cannot be changed")]
    RequestLocked(Uuid),

    /// Finalization refused while requests have no decision.
    #[error("Cannot finalize: {count} request(s) under review have no decision")]
    UndecidedRequests {
        /// Number of undecided requests.
        count: usize,
    },

    /// Period ends before it starts.
    #[error("Period end {end} is before its start {start}")]
    InvalidPeriodRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// Request not found.
    #[error("Advance request {0} not found")]
    RequestNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl AdvanceError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::PeriodClosed { .. }
            | Self::NoBaseSalary
            | Self::AmountBelowMinimum { .. }
            | Self::AmountAboveMaximum { .. }
            | Self::InvalidPeriodRange { .. } => 400,

            Self::NotAllowedNow => 403,

            Self::RequestNotFound(_) => 404,

            Self::AlreadyRequested { .. }
            | Self::RequestLocked(_)
            | Self::UndecidedRequests { .. } => 409,

            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::PeriodClosed { .. } => "PERIOD_CLOSED",
            Self::NoBaseSalary => "NO_BASE_SALARY",
            Self::AlreadyRequested { .. } => "ALREADY_REQUESTED",
            Self::AmountBelowMinimum { .. } => "AMOUNT_BELOW_MINIMUM",
            Self::AmountAboveMaximum { .. } => "AMOUNT_ABOVE_MAXIMUM",
            Self::NotAllowedNow => "NOT_ALLOWED_NOW",
            Self::RequestLocked(_) => "REQUEST_LOCKED",
            Self::UndecidedRequests { .. } => "UNDECIDED_REQUESTS",
            Self::InvalidPeriodRange { .. } => "INVALID_PERIOD_RANGE",
            Self::RequestNotFound(_) => "REQUEST_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_not_allowed_now_is_forbidden() {
        let err = AdvanceError::NotAllowedNow;
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.error_code(), "NOT_ALLOWED_NOW");
    }

    #[test]
    fn test_amount_errors_are_validation() {
        let err = AdvanceError::AmountAboveMaximum {
            amount: dec!(900),
            max: dec!(250),
        };
        assert_eq!(err.status_code(), 400);
        assert!(err.to_string().contains("250"));
    }

    #[test]
    fn test_undecided_requests() {
        let err = AdvanceError::UndecidedRequests { count: 3 };
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "UNDECIDED_REQUESTS");
        assert!(err.to_string().contains('3'));
    }

    #[test]
    fn test_period_closed_names_type() {
        let err = AdvanceError::PeriodClosed {
            advance_type: AdvanceType::Second,
        };
        assert!(err.to_string().contains("SECOND"));
    }
}
