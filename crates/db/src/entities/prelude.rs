//! Entity re-exports.

pub use super::activity_logs::Entity as ActivityLogs;
pub use super::advance_periods::Entity as AdvancePeriods;
pub use super::advance_requests::Entity as AdvanceRequests;
pub use super::borrowers::Entity as Borrowers;
pub use super::collections::Entity as Collections;
pub use super::loans::Entity as Loans;
pub use super::salary_statements::Entity as SalaryStatements;
pub use super::upload_logs::Entity as UploadLogs;
pub use super::users::Entity as Users;
