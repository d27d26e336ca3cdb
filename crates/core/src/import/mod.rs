//! Bulk salary import.
//!
//! An upload is staged, then a background worker parses its first
//! worksheet, replaces the current month's statements row by row and
//! publishes progress that clients poll by job id.

pub mod columns;
pub mod error;
pub mod jobs;
pub mod normalize;
pub mod progress;
pub mod service;
pub mod sheet;
pub mod types;


pub use columns::ColumnLayout;
pub use error::ImportError;
pub use jobs::ImportJobs;
pub use progress::{ImportProgress, ImportStatus, MokaProgressStore, ProgressStore, percent_of};
pub use service::{ImportRunner, PROGRESS_EVERY, PayrollRepository};
pub use sheet::{Sheet, SheetFormat, SheetRow, parse_sheet};
pub use types::{
    ImportJob, ImportSummary, NewSalaryStatement, NewUploadLog, SalaryLineItems, SalaryRow,
    SalaryStatement, StatementListItem, UploadLog,
};
