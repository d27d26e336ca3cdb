//! Staging area for uploaded spreadsheets using Apache OpenDAL.
//!
//! An upload is written here before its import job starts and removed once
//! the job ends, whatever the outcome. Production stages on the local
//! filesystem; tests use the in-memory service.

mod error;
mod service;

pub use error::StorageError;
pub use service::{StagingBackend, StagingStore, sanitize_filename};
