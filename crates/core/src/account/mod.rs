//! Employee accounts, roles, and password handling.
//!
//! This module provides:
//! - The role model (`admin`, `hr`, `user`)
//! - The account snapshot shared by imports, advances, and statements
//! - Password hashing with Argon2id and the change/reset policy

mod error;
mod password;
mod types;

pub use error::AccountError;
pub use password::{
    DEFAULT_PASSWORD, MIN_PASSWORD_LEN, PasswordError, hash_password, validate_new_password,
    verify_password,
};
pub use types::{EmployeeAccount, NewEmployee, ProfileFields, ProfileUpdate, Role, split_name};
