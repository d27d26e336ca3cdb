//! Password hashing with Argon2id and the password policy.

use argon2::{
    Argon2, PasswordHash,
    password_hash::{PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

use super::error::AccountError;

/// Password given to imported accounts and to accounts reset by HR.
pub const DEFAULT_PASSWORD: &str = "0000";

/// Minimum length of a chosen password.
pub const MIN_PASSWORD_LEN: usize = 4;

/// Errors that can occur during password operations.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// Failed to hash password.
    #[error("failed to hash password: {0}")]
    HashError(String),

    /// Failed to verify password.
    #[error("failed to verify password: {0}")]
    VerifyError(String),

    /// Invalid password hash format.
    #[error("invalid password hash format")]
    InvalidHash,
}

/// Hashes a password using Argon2id.
///
/// # Errors
///
/// Returns `PasswordError::HashError` if hashing fails.
///
/// # Example
///
/// ```
/// use payroll_core::account::hash_password;
///
/// let hash = hash_password("0000").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashError(e.to_string()))
}

/// Verifies a password against a stored PHC hash.
///
/// # Errors
///
/// Returns `PasswordError::InvalidHash` if the hash format is invalid.
/// Returns `PasswordError::VerifyError` if verification fails unexpectedly.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHash)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(e.to_string())),
    }
}

/// Checks a password change request.
///
/// Both entries are required and must match, the password needs at least
/// `MIN_PASSWORD_LEN` characters, and the default password is refused.
///
/// # Errors
///
/// Returns the first `AccountError` rule that fails.
pub fn validate_new_password(new_password: &str, confirmation: &str) -> Result<(), AccountError> {
    if new_password.is_empty() || confirmation.is_empty() {
        return Err(AccountError::PasswordRequired);
    }
    if new_password != confirmation {
        return Err(AccountError::PasswordMismatch);
    }
    if new_password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AccountError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    if new_password == DEFAULT_PASSWORD {
        return Err(AccountError::DefaultPasswordReused);
    }
    Ok(())
}
