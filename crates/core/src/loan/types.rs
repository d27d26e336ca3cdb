//! Loan ledger domain types.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether the borrower is on the payroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorrowerType {
    /// Company employee.
    #[default]
    Employee,
    /// Anyone else.
    External,
}

impl BorrowerType {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::External => "external",
        }
    }

    /// Parses a borrower type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "employee" => Some(Self::Employee),
            "external" => Some(Self::External),
            _ => None,
        }
    }
}

/// Loan status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    /// Money still owed.
    #[default]
    Active,
    /// Fully repaid.
    Closed,
    /// Written off by hand; never changed by recomputation.
    BadDebt,
}

impl LoanStatus {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Closed => "closed",
            Self::BadDebt => "bad_debt",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "closed" => Some(Self::Closed),
            "bad_debt" => Some(Self::BadDebt),
            _ => None,
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a loan is repaid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepaymentType {
    /// Monthly installments.
    #[default]
    Monthly,
    /// A single payment on the maturity date.
    Oneoff,
}

impl RepaymentType {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Oneoff => "oneoff",
        }
    }

    /// Parses a repayment type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "monthly" => Some(Self::Monthly),
            "oneoff" => Some(Self::Oneoff),
            _ => None,
        }
    }
}

/// Borrower with denormalized loan totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Borrower {
    /// Borrower ID.
    pub id: Uuid,
    /// 14-digit national id.
    pub national_id: String,
    /// Full name.
    pub full_name: String,
    /// 11-digit phone, or empty.
    pub phone: String,
    /// Postal address.
    pub address: String,
    /// Employee or external.
    pub borrower_type: BorrowerType,
    /// Number of loans.
    pub loans_count: i32,
    /// Sum of loan amounts.
    pub loans_total: Decimal,
    /// Sum of amounts paid.
    pub loans_total_paid: Decimal,
    /// Sum of amounts remaining.
    pub loans_total_remaining: Decimal,
}

/// Loan with denormalized repayment totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    /// Loan ID.
    pub id: Uuid,
    /// Human-readable number, `LOAN-YYYYMMDD-NNNN`.
    pub loan_number: String,
    /// Borrower.
    pub borrower_id: Uuid,
    /// Principal.
    pub amount: Decimal,
    /// Status.
    pub status: LoanStatus,
    /// Repayment type.
    pub repayment_type: RepaymentType,
    /// Installment, for monthly loans.
    pub monthly_installment: Option<Decimal>,
    /// When the money was handed over.
    pub received_at: DateTime<Utc>,
    /// Due date, for one-off loans.
    pub maturity_date: Option<NaiveDate>,
    /// Sum of collections.
    pub total_paid: Decimal,
    /// `max(amount - total_paid, 0)`.
    pub total_remaining: Decimal,
    /// Time of the latest collection.
    pub last_collection_at: Option<DateTime<Utc>>,
    /// Amount of the latest collection.
    pub last_collect_amount: Decimal,
}

/// One repayment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// Collection ID.
    pub id: Uuid,
    /// Loan repaid.
    pub loan_id: Uuid,
    /// Amount collected.
    pub amount: Decimal,
    /// When.
    pub collected_at: DateTime<Utc>,
    /// Free-text note.
    pub note: String,
}

/// Borrower fields supplied with a new loan; blanks keep stored values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowerDetails {
    /// Full name.
    #[serde(default)]
    pub full_name: String,
    /// Phone.
    #[serde(default)]
    pub phone: String,
    /// Address.
    #[serde(default)]
    pub address: String,
    /// Borrower type.
    #[serde(default)]
    pub borrower_type: Option<BorrowerType>,
}

/// Input for a new loan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLoan {
    /// Borrower national id; creates the borrower when unknown.
    pub national_id: String,
    /// Borrower fields.
    #[serde(flatten)]
    pub borrower: BorrowerDetails,
    /// Principal.
    pub amount: Decimal,
    /// Repayment type.
    #[serde(default)]
    pub repayment_type: RepaymentType,
    /// Installment, required for monthly loans.
    #[serde(default)]
    pub monthly_installment: Option<Decimal>,
    /// Due date, required for one-off loans.
    #[serde(default)]
    pub maturity_date: Option<NaiveDate>,
}

/// Loan list filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoanFilter {
    /// Only this status; `None` lists every status.
    pub status: Option<LoanStatus>,
    /// Only this repayment type.
    pub repayment_type: Option<RepaymentType>,
    /// Only borrowers of this type.
    pub borrower_type: Option<BorrowerType>,
    /// National id substring.
    pub national_id: Option<String>,
}

/// Action recorded in the activity log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityAction {
    /// Loan created.
    AddLoan,
    /// Collection recorded.
    Collect,
    /// Collection removed.
    DeleteCollection,
    /// Status changed by hand.
    UpdateStatus,
}

impl ActivityAction {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddLoan => "ADD_LOAN",
            Self::Collect => "COLLECT",
            Self::DeleteCollection => "DELETE_COLLECTION",
            Self::UpdateStatus => "UPDATE_STATUS",
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        assert_eq!(LoanStatus::parse("bad_debt"), Some(LoanStatus::BadDebt));
        assert_eq!(LoanStatus::parse("ACTIVE"), Some(LoanStatus::Active));
        assert_eq!(LoanStatus::parse("paid"), None);
    }

    #[test]
    fn test_enum_strings_match_serde() {
        assert_eq!(
            serde_json::to_string(&LoanStatus::BadDebt).unwrap(),
            format!("\"{}\"", LoanStatus::BadDebt.as_str())
        );
        assert_eq!(
            serde_json::to_string(&RepaymentType::Oneoff).unwrap(),
            format!("\"{}\"", RepaymentType::Oneoff.as_str())
        );
        assert_eq!(
            serde_json::to_string(&ActivityAction::DeleteCollection).unwrap(),
            "\"DELETE_COLLECTION\""
        );
    }

    #[test]
    fn test_new_loan_deserializes_flat_borrower_fields() {
        let json = r#"{
            "national_id": "29801011234567",
            "full_name": "Hany Samir",
            "borrower_type": "external",
            "amount": "1500.00",
            "repayment_type": "oneoff",
            "maturity_date": "2025-12-31"
        }"#;
        let loan: NewLoan = serde_json::from_str(json).unwrap();
        assert_eq!(loan.borrower.full_name, "Hany Samir");
        assert_eq!(loan.borrower.borrower_type, Some(BorrowerType::External));
        assert_eq!(loan.repayment_type, RepaymentType::Oneoff);
        assert!(loan.monthly_installment.is_none());
    }
}
