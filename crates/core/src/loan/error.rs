//! Loan ledger error types.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during loan ledger operations.
#[derive(Debug, Error)]
pub enum LoanError {
    /// National id is not 14 digits.
    #[error("National id must be exactly 14 digits")]
    InvalidNationalId,

    /// Phone is not 11 digits.
    #[error("Phone number must be exactly 11 digits")]
    InvalidPhone,

    /// A new borrower needs a name.
    #[error("Full name is required for a new borrower")]
    FullNameRequired,

    /// Loan amount below zero.
    #[error("Loan amount cannot be negative")]
    NegativeAmount,

    /// Monthly loan without installment.
    #[error("Monthly installment is required for monthly repayment")]
    InstallmentRequired,

    /// One-off loan without maturity date.
    #[error("Maturity date is required for one-off repayment")]
    MaturityDateRequired,

    /// Collection of zero or less.
    #[error("Collected amount must be greater than zero")]
    CollectionNotPositive,

    /// Collection larger than what is owed.
    #[error("Collected amount {amount} exceeds the remaining {remaining}")]
    CollectionExceedsRemaining {
        /// Collected amount.
        amount: Decimal,
        /// Remaining balance.
        remaining: Decimal,
    },

    /// Collection larger than the principal.
    #[error("Collected amount {amount} exceeds the loan total {total}")]
    CollectionExceedsTotal {
        /// Collected amount.
        amount: Decimal,
        /// Loan principal.
        total: Decimal,
    },

    /// Loan not found by number.
    #[error("Loan {0} not found")]
    LoanNotFound(String),

    /// Collection not found.
    #[error("Collection {0} not found")]
    CollectionNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl LoanError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::LoanNotFound(_) | Self::CollectionNotFound(_) => 404,
            Self::Database(_) => 500,
            _ => 400,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidNationalId => "INVALID_NATIONAL_ID",
            Self::InvalidPhone => "INVALID_PHONE",
            Self::FullNameRequired => "FULL_NAME_REQUIRED",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::InstallmentRequired => "INSTALLMENT_REQUIRED",
            Self::MaturityDateRequired => "MATURITY_DATE_REQUIRED",
            Self::CollectionNotPositive => "COLLECTION_NOT_POSITIVE",
            Self::CollectionExceedsRemaining { .. } => "COLLECTION_EXCEEDS_REMAINING",
            Self::CollectionExceedsTotal { .. } => "COLLECTION_EXCEEDS_TOTAL",
            Self::LoanNotFound(_) => "LOAN_NOT_FOUND",
            Self::CollectionNotFound(_) => "COLLECTION_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_codes() {
        assert_eq!(LoanError::InvalidNationalId.status_code(), 400);
        assert_eq!(LoanError::LoanNotFound("LOAN-1".into()).status_code(), 404);
        assert_eq!(LoanError::Database(String::new()).status_code(), 500);
    }

    #[test]
    fn test_exceeds_remaining_message() {
        let err = LoanError::CollectionExceedsRemaining {
            amount: dec!(500),
            remaining: dec!(120.50),
        };
        assert_eq!(err.error_code(), "COLLECTION_EXCEEDS_REMAINING");
        assert!(err.to_string().contains("120.50"));
    }
}
