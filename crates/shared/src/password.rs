//! Password hashing utilities using Argon2id.
//!
//! Event access passwords are stored only as PHC strings produced here.
//! Verification never treats a missing or malformed stored hash as a match.

use std::sync::OnceLock;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use thiserror::Error;

/// Error type for password operations.
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashError(String),

    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

/// Argon2id parameters following OWASP recommendations (2024).
/// - Memory: 19456 KiB (19 MiB)
/// - Iterations: 2
/// - Parallelism: 1
const MEMORY_COST: u32 = 19456;
const TIME_COST: u32 = 2;
const PARALLELISM: u32 = 1;
const OUTPUT_LEN: usize = 32;

/// Plaintext of the hash verified when an event has no stored password.
const DUMMY_PASSWORD: &str = "no-password-configured-for-this-event";

static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

fn create_argon2() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(MEMORY_COST, TIME_COST, PARALLELISM, Some(OUTPUT_LEN))
        .map_err(|e| PasswordError::HashError(format!("Failed to create Argon2 params: {}", e)))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a password using Argon2id.
///
/// Returns a self-describing PHC string (algorithm, parameters, salt, hash).
///
/// # Example
/// ```
/// use shared::password::hash_password;
///
/// let hash = hash_password("abc123").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = create_argon2()?;

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashError(e.to_string()))
}

/// Verifies a password against a stored PHC hash in constant time.
///
/// # Example
/// ```
/// use shared::password::{hash_password, verify_password};
///
/// let hash = hash_password("abc123").unwrap();
/// assert!(verify_password("abc123", &hash).unwrap());
/// assert!(!verify_password("wrong", &hash).unwrap());
/// ```
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    // Parameters are read from the PHC string itself
    let argon2 = Argon2::default();

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(e.to_string())),
    }
}

/// Verifies a password against an optional stored hash.
///
/// `None`, empty, and malformed hashes all yield `false`. When there is no
/// usable hash a verification against a fixed dummy hash still runs, so the
/// "no password set" path does the same amount of work as a wrong password.
pub fn verify_password_or_false(password: &str, stored_hash: Option<&str>) -> bool {
    match stored_hash.filter(|h| !h.is_empty()) {
        Some(hash) => match verify_password(password, hash) {
            Ok(matched) => matched,
            Err(_) => {
                burn_dummy_verification(password);
                false
            }
        },
        None => {
            burn_dummy_verification(password);
            false
        }
    }
}

fn burn_dummy_verification(password: &str) {
    let dummy = DUMMY_HASH.get_or_init(|| hash_password(DUMMY_PASSWORD).ok());
    if let Some(hash) = dummy {
        let _ = verify_password(password, hash);
    }
}
