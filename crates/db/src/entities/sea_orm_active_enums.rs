//! String-backed enums stored in the database, with conversions to the
//! core domain enums.

use payroll_core::account::Role;
use payroll_core::advance::{AdminDecision as CoreDecision, AdvanceStatus as CoreStatus, AdvanceType as CoreType};
use payroll_core::loan::{BorrowerType as CoreBorrowerType, LoanStatus as CoreLoanStatus, RepaymentType as CoreRepayment};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum UserRole {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "hr")]
    Hr,
    #[sea_orm(string_value = "user")]
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum AdvanceType {
    #[sea_orm(string_value = "FIRST")]
    First,
    #[sea_orm(string_value = "SECOND")]
    Second,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum AdvanceStatus {
    #[sea_orm(string_value = "UNDER_REVIEW")]
    UnderReview,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum AdminDecision {
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum BorrowerType {
    #[sea_orm(string_value = "employee")]
    Employee,
    #[sea_orm(string_value = "external")]
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum LoanStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "closed")]
    Closed,
    #[sea_orm(string_value = "bad_debt")]
    BadDebt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum RepaymentType {
    #[sea_orm(string_value = "monthly")]
    Monthly,
    #[sea_orm(string_value = "oneoff")]
    Oneoff,
}

/// Generates `From` impls both ways between a db enum and its core twin.
macro_rules! mirror_enum {
    ($db:ident, $core:ident, [$($variant:ident),+ $(,)?]) => {
        impl From<$db> for $core {
            fn from(value: $db) -> Self {
                match value {
                    $($db::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$core> for $db {
            fn from(value: $core) -> Self {
                match value {
                    $($core::$variant => Self::$variant,)+
                }
            }
        }
    };
}

mirror_enum!(UserRole, Role, [Admin, Hr, User]);
mirror_enum!(AdvanceType, CoreType, [First, Second]);
mirror_enum!(AdvanceStatus, CoreStatus, [UnderReview, Approved, Rejected]);
mirror_enum!(AdminDecision, CoreDecision, [Approved, Rejected]);
mirror_enum!(BorrowerType, CoreBorrowerType, [Employee, External]);
mirror_enum!(LoanStatus, CoreLoanStatus, [Active, Closed, BadDebt]);
mirror_enum!(RepaymentType, CoreRepayment, [Monthly, Oneoff]);

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn test_round_trip_through_core() {
        for status in LoanStatus::iter() {
            assert_eq!(LoanStatus::from(CoreLoanStatus::from(status)), status);
        }
        for role in UserRole::iter() {
            assert_eq!(UserRole::from(Role::from(role)), role);
        }
    }

    #[test]
    fn test_stored_values_match_core_strings() {
        assert_eq!(AdvanceStatus::UnderReview.to_value(), CoreStatus::UnderReview.as_str());
        assert_eq!(LoanStatus::BadDebt.to_value(), CoreLoanStatus::BadDebt.as_str());
        assert_eq!(UserRole::Hr.to_value(), Role::Hr.as_str());
    }
}
