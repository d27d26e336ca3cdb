//! Spreadsheet column contract.
//!
//! Headers are matched exactly (after trimming surrounding whitespace).
//! Optional profile columns accept several spellings; the first present,
//! non-blank one wins.

use rust_decimal::Decimal;

use super::error::ImportError;
use super::normalize::{normalize_bank_account, parse_amount, parse_base_salary};
use super::types::{SalaryLineItems, SalaryRow};
use crate::account::ProfileFields;

/// Employee id header.
pub const EMPLOYEE_ID: &str = "رقم تعريفى";
/// Full name header.
pub const FULL_NAME: &str = "الاسم";
/// Notes header (optional).
pub const NOTES: &str = "ملاحظات";
/// Branch headers, in preference order.
pub const BRANCH: [&str; 2] = ["اسم الفرع", "الفرع"];
/// Bank account headers, in preference order.
pub const BANK_ACCOUNT: [&str; 2] = ["رقم الحساب البنكي", "رقم الحساب"];
/// Profile base salary headers, in preference order.
pub const PROFILE_BASE_SALARY: [&str; 7] = [
    "المرتب الاساسي",
    "الراتب الأساسي",
    "الراتب الاساسي",
    "الراتب الاساسى",
    "basic_salary",
    "base_salary",
    "base salary",
];

/// Performance evaluation header; the only text line item.
pub const PERFORMANCE_EVALUATION: &str = "تقييم أداء";

/// Required line-item headers, in statement field order.
pub const LINE_ITEMS: [&str; 20] = [
    "المرتب الاساسي",
    "المرتب المتغير",
    "علاوة استثنائية",
    "الاضافى",
    "بدل الراحة",
    PERFORMANCE_EVALUATION,
    "حافز استثنائى",
    "بدل وجبة",
    "بدل انتقال",
    "اجمالي الاستحقاقات",
    "السلف",
    "تأمينات",
    "الغياب",
    "الجزاءات",
    "خصم الجودة نقدى",
    "خصم الجودة أيام",
    "الأقساط",
    "الايصالات الشهرية",
    "اجمالي الاستقطاعات",
    "صافي المرتبات",
];

const PERFORMANCE_INDEX: usize = 5;

/// Column positions resolved from a header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    employee_id: usize,
    full_name: usize,
    branch: Vec<usize>,
    bank_account: Vec<usize>,
    profile_base_salary: Vec<usize>,
    line_items: [usize; LINE_ITEMS.len()],
    notes: Option<usize>,
}

fn position(headers: &[String], name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}

fn required(headers: &[String], name: &str) -> Result<usize, ImportError> {
    position(headers, name).ok_or_else(|| ImportError::MissingColumn(name.to_string()))
}

fn optional(headers: &[String], names: &[&str]) -> Vec<usize> {
    names.iter().filter_map(|n| position(headers, n)).collect()
}

fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map_or("", |c| c.trim())
}

fn first_filled<'a>(row: &'a [String], indices: &[usize]) -> &'a str {
    indices
        .iter()
        .map(|&i| cell(row, i))
        .find(|v| !v.is_empty())
        .unwrap_or("")
}

impl ColumnLayout {
    /// Resolves every column from the header row.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::MissingColumn` naming the first required header
    /// that is absent.
    pub fn resolve(headers: &[String]) -> Result<Self, ImportError> {
        let employee_id = required(headers, EMPLOYEE_ID)?;
        let full_name = required(headers, FULL_NAME)?;

        let mut line_items = [0; LINE_ITEMS.len()];
        for (slot, name) in line_items.iter_mut().zip(LINE_ITEMS) {
            *slot = required(headers, name)?;
        }

        Ok(Self {
            employee_id,
            full_name,
            branch: optional(headers, &BRANCH),
            bank_account: optional(headers, &BANK_ACCOUNT),
            profile_base_salary: optional(headers, &PROFILE_BASE_SALARY),
            line_items,
            notes: position(headers, NOTES),
        })
    }

    /// Extracts one data row.
    ///
    /// `row_number` is the 1-based spreadsheet row, used in error messages.
    ///
    /// # Errors
    ///
    /// - `ImportError::MissingEmployeeId` when the id cell is blank
    /// - `ImportError::InvalidValue` when a line item is not a number
    pub fn extract(&self, row_number: usize, row: &[String]) -> Result<SalaryRow, ImportError> {
        let employee_id = cell(row, self.employee_id);
        if employee_id.is_empty() {
            return Err(ImportError::MissingEmployeeId { row: row_number });
        }

        let mut amounts = [Decimal::ZERO; LINE_ITEMS.len()];
        for (i, (&column, header)) in self.line_items.iter().zip(LINE_ITEMS).enumerate() {
            if i == PERFORMANCE_INDEX {
                continue;
            }
            let raw = cell(row, column);
            amounts[i] = parse_amount(raw).ok_or_else(|| ImportError::InvalidValue {
                row: row_number,
                column: header.to_string(),
                value: raw.to_string(),
            })?;
        }

        let performance = cell(row, self.line_items[PERFORMANCE_INDEX]);
        let [
            base_salary,
            changed_salary,
            special_bonus,
            extra,
            rest_allowance,
            _,
            special_incentive,
            meal_allowance,
            transport_allowance,
            total_entitlements,
            loan,
            insurance,
            absence,
            penalties,
            quality_deduction_cash,
            quality_deduction_days,
            installments,
            monthly_receipts,
            total_deductions,
            net_salary,
        ] = amounts;

        Ok(SalaryRow {
            employee_id: employee_id.to_string(),
            full_name: cell(row, self.full_name).to_string(),
            profile: ProfileFields {
                branch_name: first_filled(row, &self.branch).to_string(),
                bank_account_number: normalize_bank_account(first_filled(
                    row,
                    &self.bank_account,
                )),
                base_salary: parse_base_salary(first_filled(row, &self.profile_base_salary)),
            },
            line_items: SalaryLineItems {
                base_salary,
                changed_salary,
                special_bonus,
                extra,
                rest_allowance,
                performance_evaluation: (!performance.is_empty()).then(|| performance.to_string()),
                special_incentive,
                meal_allowance,
                transport_allowance,
                total_entitlements,
                loan,
                insurance,
                absence,
                penalties,
                quality_deduction_cash,
                quality_deduction_days,
                installments,
                monthly_receipts,
                total_deductions,
                net_salary,
            },
            notes: self
                .notes
                .map(|i| cell(row, i).to_string())
                .unwrap_or_default(),
        })
    }
}
