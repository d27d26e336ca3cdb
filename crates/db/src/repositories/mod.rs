//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod account;
pub mod advance;
pub mod loan;
pub mod salary_import;
pub mod statement;

pub use account::{AccountRepository, CreateAccountInput};
pub use advance::{AdminRequestView, AdvanceRepository, EligibilityView, ResetSummary};
pub use loan::{ActivityEntry, Inquiry, LoanDetail, LoanListItem, LoanRepository};
pub use salary_import::SalaryImportRepository;
pub use statement::{StatementRepository, StatementScope};

use sea_orm::ColumnTrait;
use sea_orm::sea_query::{Expr, Func, SimpleExpr};

/// Case-insensitive substring match on a column.
pub(crate) fn lower_contains<C: ColumnTrait>(column: C, needle: &str) -> SimpleExpr {
    let pattern = format!("%{}%", needle.to_lowercase());
    Expr::expr(Func::lower(Expr::col((column.entity_name(), column)))).like(pattern)
}
