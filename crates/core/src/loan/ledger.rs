//! Loan ledger rules.
//!
//! Everything here is pure: repositories load the current rows, call these
//! functions, and write the results back inside one transaction.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::error::LoanError;
use super::types::{Loan, LoanStatus, NewLoan, RepaymentType};

const NATIONAL_ID_LEN: usize = 14;
const PHONE_LEN: usize = 11;

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_digit())
}

/// Checks that a national id is exactly 14 ASCII digits.
///
/// # Errors
///
/// Returns `LoanError::InvalidNationalId` otherwise.
pub fn validate_national_id(national_id: &str) -> Result<(), LoanError> {
    if is_digits(national_id, NATIONAL_ID_LEN) {
        Ok(())
    } else {
        Err(LoanError::InvalidNationalId)
    }
}

/// Checks that a phone number is empty or exactly 11 ASCII digits.
///
/// # Errors
///
/// Returns `LoanError::InvalidPhone` otherwise.
pub fn validate_phone(phone: &str) -> Result<(), LoanError> {
    if phone.is_empty() || is_digits(phone, PHONE_LEN) {
        Ok(())
    } else {
        Err(LoanError::InvalidPhone)
    }
}

/// Validates a new loan.
///
/// # Errors
///
/// Returns the first failing rule: national id, phone, amount, then the
/// field the repayment type requires.
pub fn validate_new_loan(loan: &NewLoan) -> Result<(), LoanError> {
    validate_national_id(loan.national_id.trim())?;
    validate_phone(loan.borrower.phone.trim())?;

    if loan.amount.is_sign_negative() {
        return Err(LoanError::NegativeAmount);
    }

    match loan.repayment_type {
        RepaymentType::Monthly if loan.monthly_installment.is_none() => {
            Err(LoanError::InstallmentRequired)
        }
        RepaymentType::Oneoff if loan.maturity_date.is_none() => {
            Err(LoanError::MaturityDateRequired)
        }
        _ => Ok(()),
    }
}

/// Returns the number for the next loan issued on `date`.
///
/// `existing` are the loan numbers already issued with the same day
/// prefix; the sequence continues after the highest one.
#[must_use]
pub fn next_loan_number<I, S>(date: NaiveDate, existing: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let prefix = loan_number_prefix(date);
    let highest = existing
        .into_iter()
        .filter_map(|n| n.as_ref().strip_prefix(&prefix)?.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("{prefix}{:04}", highest + 1)
}

/// Returns the `LOAN-YYYYMMDD-` prefix for a date.
#[must_use]
pub fn loan_number_prefix(date: NaiveDate) -> String {
    format!("LOAN-{}-", date.format("%Y%m%d"))
}

/// Validates a collection against the loan it repays.
///
/// # Errors
///
/// The amount must be positive and may exceed neither the remaining
/// balance nor the principal.
pub fn validate_collection(amount: Decimal, loan: &Loan) -> Result<(), LoanError> {
    if amount <= Decimal::ZERO {
        return Err(LoanError::CollectionNotPositive);
    }
    if amount > loan.total_remaining {
        return Err(LoanError::CollectionExceedsRemaining {
            amount,
            remaining: loan.total_remaining,
        });
    }
    if amount > loan.amount {
        return Err(LoanError::CollectionExceedsTotal {
            amount,
            total: loan.amount,
        });
    }
    Ok(())
}

/// Repayment totals of one loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanTotals {
    /// Sum of collections.
    pub total_paid: Decimal,
    /// Remaining balance, never negative.
    pub total_remaining: Decimal,
    /// Resulting status.
    pub status: LoanStatus,
}

/// Recomputes a loan's totals from its collections.
///
/// Bad debts keep their status; other loans close when nothing remains
/// and reopen otherwise.
#[must_use]
pub fn recompute_loan(amount: Decimal, status: LoanStatus, collections: &[Decimal]) -> LoanTotals {
    let total_paid: Decimal = collections.iter().copied().sum();
    let total_remaining = (amount - total_paid).max(Decimal::ZERO);
    let status = match status {
        LoanStatus::BadDebt => LoanStatus::BadDebt,
        _ if total_remaining.is_zero() => LoanStatus::Closed,
        _ => LoanStatus::Active,
    };
    LoanTotals {
        total_paid,
        total_remaining,
        status,
    }
}

/// Denormalized totals of a borrower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BorrowerTotals {
    /// Number of loans.
    pub loans_count: i32,
    /// Sum of principals.
    pub loans_total: Decimal,
    /// Sum of amounts paid.
    pub loans_total_paid: Decimal,
    /// Sum of amounts remaining.
    pub loans_total_remaining: Decimal,
}

impl BorrowerTotals {
    /// Sums the borrower's loans.
    #[must_use]
    pub fn from_loans(loans: &[Loan]) -> Self {
        loans.iter().fold(Self::default(), |acc, loan| Self {
            loans_count: acc.loans_count.saturating_add(1),
            loans_total: acc.loans_total + loan.amount,
            loans_total_paid: acc.loans_total_paid + loan.total_paid,
            loans_total_remaining: acc.loans_total_remaining + loan.total_remaining,
        })
    }
}

/// Aggregates shown by the national-id inquiry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct InquirySummary {
    /// Number of loans.
    pub count: usize,
    /// Sum of principals.
    pub total: Decimal,
    /// Sum paid.
    pub paid: Decimal,
    /// Sum remaining.
    pub remaining: Decimal,
    /// Latest collection over all loans.
    pub latest_collection_at: Option<DateTime<Utc>>,
}

impl InquirySummary {
    /// Summarizes a borrower's loans.
    #[must_use]
    pub fn from_loans(loans: &[Loan]) -> Self {
        Self {
            count: loans.len(),
            total: loans.iter().map(|l| l.amount).sum(),
            paid: loans.iter().map(|l| l.total_paid).sum(),
            remaining: loans.iter().map(|l| l.total_remaining).sum(),
            latest_collection_at: loans.iter().filter_map(|l| l.last_collection_at).max(),
        }
    }
}
