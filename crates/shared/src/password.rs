//! Password hashing with Argon2id.
//!
//! Hashes are stored as PHC strings, so the parameters travel with each
//! hash and verification never depends on the current constants.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use std::sync::OnceLock;
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

/// OWASP Argon2id parameters: 19 MiB memory, 2 iterations, 1 lane.
const MEMORY_COST: u32 = 19456;
const TIME_COST: u32 = 2;
const PARALLELISM: u32 = 1;
const OUTPUT_LEN: usize = 32;

fn create_argon2() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(MEMORY_COST, TIME_COST, PARALLELISM, Some(OUTPUT_LEN))
        .map_err(|e| PasswordError::HashError(format!("Failed to create Argon2 params: {}", e)))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a password and returns the PHC-formatted string.
///
/// A fresh random salt is drawn for every call, so hashing the same
/// password twice yields different strings.
///
/// # Arguments
/// * `password` - The plaintext password
///
/// # Returns
/// * `Ok(String)` - PHC string carrying algorithm, parameters, salt and hash
/// * `Err(PasswordError::HashError)` - If the Argon2 context cannot be built
///
/// # Example
/// ```
/// use shared::password::hash_password;
///
/// let hash = hash_password("s3cret-pass").unwrap();
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

/// Verifies a password against a stored PHC hash.
///
/// The parameters are read from the hash itself.
///
/// # Arguments
/// * `password` - The plaintext password supplied at login
/// * `hash` - The PHC string stored for the account
///
/// # Returns
/// * `Ok(true)` - Password matches
/// * `Ok(false)` - Password does not match
/// * `Err(PasswordError::InvalidHashFormat)` - The stored hash is not a PHC string
///
/// # Example
/// ```
/// use shared::password::{hash_password, verify_password};
///
/// let hash = hash_password("pallet-jack-42").unwrap();
/// assert!(verify_password("pallet-jack-42", &hash).unwrap());
/// assert!(!verify_password("forklift", &hash).unwrap());
/// ```
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(e.to_string())),
    }
}

/// Runs a full verification against a throwaway hash and always returns `false`.
///
/// Used when the username is unknown so that the response time of a failed
/// login does not reveal whether the account exists.
pub fn verify_against_dummy(password: &str) -> bool {
    static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

    let dummy = DUMMY_HASH.get_or_init(|| hash_password("inventory-dummy-password").ok());
    if let Some(hash) = dummy {
        let _ = verify_password(password, hash);
    }
    false
}
