//! Informal loan ledger.
//!
//! Borrowers take loans that are repaid through collections. Loan and
//! borrower totals are denormalized and recomputed explicitly after every
//! collection write.
//!
//! # Modules
//!
//! - `types` - Borrowers, loans, collections, filters and activity actions
//! - `ledger` - Validation, loan numbering and total recomputation
//! - `error` - Loan-specific error types

pub mod error;
pub mod ledger;
pub mod types;

#[cfg(test)]
mod ledger_props;

pub use error::LoanError;
pub use ledger::{
    BorrowerTotals, InquirySummary, LoanTotals, loan_number_prefix, next_loan_number, recompute_loan,
    validate_collection, validate_national_id, validate_new_loan, validate_phone,
};
pub use types::{
    ActivityAction, Borrower, BorrowerDetails, BorrowerType, Collection, Loan, LoanFilter,
    LoanStatus, NewLoan, RepaymentType,
};
