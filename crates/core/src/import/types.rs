//! Salary statement and upload types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::account::ProfileFields;

/// Monthly pay line items, in spreadsheet column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryLineItems {
    /// Base salary.
    pub base_salary: Decimal,
    /// Variable salary.
    pub changed_salary: Decimal,
    /// Exceptional raise.
    pub special_bonus: Decimal,
    /// Overtime.
    pub extra: Decimal,
    /// Rest-day allowance.
    pub rest_allowance: Decimal,
    /// Free text grade, not an amount.
    pub performance_evaluation: Option<String>,
    /// Exceptional incentive.
    pub special_incentive: Decimal,
    /// Meal allowance.
    pub meal_allowance: Decimal,
    /// Transport allowance.
    pub transport_allowance: Decimal,
    /// Total entitlements.
    pub total_entitlements: Decimal,
    /// Advances deducted.
    pub loan: Decimal,
    /// Social insurance.
    pub insurance: Decimal,
    /// Absence deduction.
    pub absence: Decimal,
    /// Penalties.
    pub penalties: Decimal,
    /// Quality deduction in cash.
    pub quality_deduction_cash: Decimal,
    /// Quality deduction in days.
    pub quality_deduction_days: Decimal,
    /// Installments.
    pub installments: Decimal,
    /// Monthly receipts.
    pub monthly_receipts: Decimal,
    /// Total deductions.
    pub total_deductions: Decimal,
    /// Net pay.
    pub net_salary: Decimal,
}

/// One parsed spreadsheet row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalaryRow {
    /// Employee id as written in the sheet.
    pub employee_id: String,
    /// Full name as written in the sheet.
    pub full_name: String,
    /// Profile values the row carries.
    pub profile: ProfileFields,
    /// Statement amounts.
    pub line_items: SalaryLineItems,
    /// Free text notes.
    pub notes: String,
}

/// Statement to create for an employee and month.
#[derive(Debug, Clone)]
pub struct NewSalaryStatement {
    /// Owning employee.
    pub user_id: Uuid,
    /// First day of the month.
    pub month: NaiveDate,
    /// Amounts.
    pub line_items: SalaryLineItems,
    /// Notes.
    pub notes: String,
}

/// A stored monthly salary statement.
#[derive(Debug, Clone, Serialize)]
pub struct SalaryStatement {
    /// Record ID.
    pub id: Uuid,
    /// Owning employee.
    pub user_id: Uuid,
    /// First day of the month.
    pub month: NaiveDate,
    /// Amounts.
    #[serde(flatten)]
    pub line_items: SalaryLineItems,
    /// Notes.
    pub notes: String,
    /// Last account to edit the notes.
    pub updated_by: Option<Uuid>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// Statement list row with the employee it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct StatementListItem {
    /// The statement.
    #[serde(flatten)]
    pub statement: SalaryStatement,
    /// Employee id of the owner.
    pub employee_id: Option<String>,
    /// Full name of the owner.
    pub employee_name: String,
}

/// Upload log entry written once per completed import.
#[derive(Debug, Clone)]
pub struct NewUploadLog {
    /// Account that uploaded the file.
    pub uploader_id: Uuid,
    /// Original file name.
    pub file_name: String,
    /// Worksheet that was read.
    pub sheet_name: String,
    /// First day of the month.
    pub month: NaiveDate,
}

/// A recorded upload.
#[derive(Debug, Clone, Serialize)]
pub struct UploadLog {
    /// Record ID.
    pub id: Uuid,
    /// Account that uploaded the file.
    pub uploader_id: Option<Uuid>,
    /// Original file name.
    pub file_name: String,
    /// Worksheet that was read.
    pub sheet_name: String,
    /// First day of the month.
    pub month: NaiveDate,
    /// Upload time.
    pub uploaded_at: DateTime<Utc>,
}

/// A staged upload waiting for its worker.
#[derive(Debug, Clone)]
pub struct ImportJob {
    /// Record ID.
    pub id: Uuid,
    /// Key of the staged file.
    pub staged_key: String,
    /// Original file name, used for format detection and the upload log.
    pub file_name: String,
    /// Account that uploaded the file.
    pub uploader_id: Uuid,
}

/// Result of a completed import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    /// Rows imported.
    pub processed: u64,
    /// Accounts created for unknown employee ids.
    pub created_accounts: u64,
    /// Statements removed before the import.
    pub replaced_statements: u64,
    /// Month the statements were filed under.
    pub month: NaiveDate,
}
