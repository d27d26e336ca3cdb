//! Account domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System administrator: advance approvals and everything HR can do.
    Admin,
    /// Payroll staff: salary uploads, statements of all employees.
    Hr,
    /// Regular employee.
    User,
}

impl Role {
    /// Returns the string representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Hr => "hr",
            Self::User => "user",
        }
    }

    /// Parses a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "hr" => Some(Self::Hr),
            "user" => Some(Self::User),
            _ => None,
        }
    }

    /// Returns true if this role may upload salaries and see every statement.
    #[must_use]
    pub const fn can_manage_payroll(&self) -> bool {
        matches!(self, Self::Admin | Self::Hr)
    }

    /// Returns true if this role may decide on advance requests and manage loans.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot of an employee account as the domain sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeAccount {
    /// Account ID.
    pub id: Uuid,
    /// Login name.
    pub username: String,
    /// HR employee number; the import key.
    pub employee_id: Option<String>,
    /// Given name.
    pub first_name: String,
    /// Family name (may hold several words).
    pub last_name: String,
    /// Role.
    pub role: Role,
    /// Branch the employee belongs to.
    pub branch_name: String,
    /// Normalized bank account number.
    pub bank_account_number: String,
    /// Monthly base salary, used for advance eligibility.
    pub base_salary: Option<Decimal>,
    /// True while the account still uses the default password.
    pub must_change_password: bool,
    /// Inactive accounts are hidden from payroll listings.
    pub is_active: bool,
}

impl EmployeeAccount {
    /// Returns "first last", or the username when both are blank.
    #[must_use]
    pub fn full_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.username.clone()
        } else {
            name.to_string()
        }
    }
}

/// Fields for an account created on first sight of an employee id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmployee {
    /// HR employee number, also used as the username.
    pub employee_id: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
}

impl NewEmployee {
    /// Builds the account fields from an employee id and a full display name.
    #[must_use]
    pub fn from_sheet(employee_id: &str, full_name: &str) -> Self {
        let (first_name, last_name) = split_name(full_name);
        Self {
            employee_id: employee_id.to_string(),
            first_name,
            last_name,
        }
    }
}

/// Splits a display name into the first word and the rest.
#[must_use]
pub fn split_name(full_name: &str) -> (String, String) {
    let mut words = full_name.split_whitespace();
    let first = words.next().unwrap_or_default().to_string();
    let rest = words.collect::<Vec<_>>().join(" ");
    (first, rest)
}

/// Profile values carried by an import row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileFields {
    /// Branch name (blank when the sheet has none).
    pub branch_name: String,
    /// Normalized bank account number (blank when absent).
    pub bank_account_number: String,
    /// Base salary, when the row carries a usable one.
    pub base_salary: Option<Decimal>,
}

/// Changes to apply to an existing account; `None` means "leave alone".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// New branch name.
    pub branch_name: Option<String>,
    /// New bank account number.
    pub bank_account_number: Option<String>,
    /// New base salary.
    pub base_salary: Option<Decimal>,
}

impl ProfileUpdate {
    /// Computes the update that brings `current` in line with `incoming`.
    ///
    /// Blank or absent incoming values never overwrite stored ones.
    #[must_use]
    pub fn diff(current: &EmployeeAccount, incoming: &ProfileFields) -> Self {
        let branch_name = Some(incoming.branch_name.trim())
            .filter(|b| !b.is_empty() && *b != current.branch_name)
            .map(str::to_string);
        let bank_account_number = Some(incoming.bank_account_number.as_str())
            .filter(|b| !b.is_empty() && *b != current.bank_account_number)
            .map(str::to_string);
        let base_salary = incoming
            .base_salary
            .filter(|b| current.base_salary != Some(*b));

        Self {
            branch_name,
            bank_account_number,
            base_salary,
        }
    }

    /// Returns true if nothing would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.branch_name.is_none() && self.bank_account_number.is_none() && self.base_salary.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn account() -> EmployeeAccount {
        EmployeeAccount {
            id: Uuid::nil(),
            username: "1001".to_string(),
            employee_id: Some("1001".to_string()),
            first_name: "Mona".to_string(),
            last_name: "Adel".to_string(),
            role: Role::User,
            branch_name: "Giza".to_string(),
            bank_account_number: "123".to_string(),
            base_salary: Some(dec!(4000)),
            must_change_password: false,
            is_active: true,
        }
    }

    #[test]
    fn test_role_permissions() {
        assert!(Role::Admin.can_manage_payroll());
        assert!(Role::Hr.can_manage_payroll());
        assert!(!Role::User.can_manage_payroll());

        assert!(Role::Admin.is_admin());
        assert!(!Role::Hr.is_admin());
    }

    #[test]
    fn test_role_parse_round_trip() {
        for role in [Role::Admin, Role::Hr, Role::User] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("HR"), Some(Role::Hr));
        assert_eq!(Role::parse("owner"), None);
    }

    #[test]
    fn test_split_name() {
        assert_eq!(
            split_name("  Ahmed  Mohamed Ali "),
            ("Ahmed".to_string(), "Mohamed Ali".to_string())
        );
        assert_eq!(split_name("Ahmed"), ("Ahmed".to_string(), String::new()));
        assert_eq!(split_name(""), (String::new(), String::new()));
    }

    #[test]
    fn test_full_name_falls_back_to_username() {
        let mut acc = account();
        assert_eq!(acc.full_name(), "Mona Adel");
        acc.first_name.clear();
        acc.last_name.clear();
        assert_eq!(acc.full_name(), "1001");
    }

    #[test]
    fn test_diff_ignores_blank_and_equal_values() {
        let incoming = ProfileFields {
            branch_name: "Giza".to_string(),
            bank_account_number: String::new(),
            base_salary: Some(dec!(4000.00)),
        };
        assert!(ProfileUpdate::diff(&account(), &incoming).is_empty());
    }

    #[test]
    fn test_diff_picks_up_changes() {
        let incoming = ProfileFields {
            branch_name: "Alexandria".to_string(),
            bank_account_number: "999".to_string(),
            base_salary: Some(dec!(4500)),
        };
        let update = ProfileUpdate::diff(&account(), &incoming);
        assert_eq!(update.branch_name.as_deref(), Some("Alexandria"));
        assert_eq!(update.bank_account_number.as_deref(), Some("999"));
        assert_eq!(update.base_salary, Some(dec!(4500)));
    }

    #[test]
    fn test_diff_absent_salary_keeps_stored() {
        let incoming = ProfileFields {
            base_salary: None,
            ..ProfileFields::default()
        };
        assert_eq!(ProfileUpdate::diff(&account(), &incoming).base_salary, None);
    }
}
