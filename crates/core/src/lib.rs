//! Core payroll business logic.
//!
//! This crate holds the domain types and rules with no web or database
//! dependencies. Persistence is reached through repository traits that the
//! db crate implements.
//!
//! # Modules
//!
//! - `account` - Employee accounts, roles and password rules
//! - `advance` - Salary advance eligibility and the two-phase approval workflow
//! - `import` - Bulk salary spreadsheet import with polled progress
//! - `loan` - Loan ledger: loans, collections and borrower totals
//! - `storage` - Staging area for uploaded files

pub mod account;
pub mod advance;
pub mod import;
pub mod loan;
pub mod storage;
