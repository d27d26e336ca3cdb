//! `SeaORM` entity definitions.

pub mod prelude;

pub mod activity_logs;
pub mod advance_periods;
pub mod advance_requests;
pub mod borrowers;
pub mod collections;
pub mod loans;
pub mod salary_statements;
pub mod sea_orm_active_enums;
pub mod upload_logs;
pub mod users;
