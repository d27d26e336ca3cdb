//! Shared types, errors, and configuration for the payroll backend.
//!
//! This crate provides common types used across all other crates:
//! - Pagination types for list endpoints
//! - Application-wide error types
//! - Configuration management
//! - JWT claims and token validation
//! - The business-time-zone clock

pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use clock::BusinessClock;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
