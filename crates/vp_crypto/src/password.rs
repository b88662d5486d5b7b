//! Credential hashing and verification
//!
//! Argon2id with a fresh random salt per hash; the output is a
//! self-describing PHC string (`$argon2id$v=19$m=...,t=...,p=...$salt$digest`)
//! so parameters can be raised later without breaking stored hashes.
//!
//! A wrong password and a tampered stored hash both verify to `false` — the
//! caller learns nothing about *why* verification failed.

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
};

use crate::error::CryptoError;

pub const ARGON2_TIME_COST: u32 = 3;
pub const ARGON2_MEMORY_COST: u32 = 64 * 1024; // KiB (64 MiB)
pub const ARGON2_PARALLELISM: u32 = 1;
pub const ARGON2_OUTPUT_LEN: usize = 32;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Passwords rejected outright regardless of length. Checked lowercased.
const COMMON_PASSWORDS: &[&str] = &[
    "password", "password1", "passw0rd", "123456", "12345678", "123456789",
    "1234567890", "qwerty", "qwerty123", "qwertyuiop", "11111111", "iloveyou",
    "letmein", "letmein1", "admin123", "welcome1", "sunshine", "trustno1",
    "football", "baseball", "superman", "princess", "master123", "abc123",
];

/// Argon2id instance with interactive-desktop parameters.
fn argon2() -> Argon2<'static> {
    let params = Params::new(
        ARGON2_MEMORY_COST,
        ARGON2_TIME_COST,
        ARGON2_PARALLELISM,
        Some(ARGON2_OUTPUT_LEN),
    )
    .expect("Static Argon2 params are always valid");
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
}

/// Hash a password for storage. Salted per call: hashing the same password
/// twice yields two different encoded strings.
pub fn hash_password(password: &str) -> Result<String, CryptoError> {
    if password.is_empty() {
        return Err(CryptoError::InvalidInput("password must not be empty".into()));
    }
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CryptoError::HashFailed(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC string in constant time.
///
/// Returns `Ok(false)` for a wrong password AND for an unparseable or
/// truncated stored hash. Only structurally invalid arguments (empty
/// password, empty hash) are errors.
pub fn verify_password(password: &str, encoded: &str) -> Result<bool, CryptoError> {
    if password.is_empty() {
        return Err(CryptoError::InvalidInput("password must not be empty".into()));
    }
    if encoded.is_empty() {
        return Err(CryptoError::InvalidInput("stored hash must not be empty".into()));
    }
    let Ok(parsed) = PasswordHash::new(encoded) else {
        // Tampered encoding is indistinguishable from a mismatch.
        return Ok(false);
    };
    Ok(argon2().verify_password(password.as_bytes(), &parsed).is_ok())
}

/// Outcome of a strength check. `errors` lists every violated rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrengthReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Check password strength: minimum length and a common-password blocklist.
/// No upper/lower/digit/symbol composition rules.
pub fn validate_password_strength(password: &str) -> StrengthReport {
    let mut errors = Vec::new();
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(format!("must be at least {MIN_PASSWORD_LEN} characters long"));
    }
    if COMMON_PASSWORDS.contains(&password.to_lowercase().as_str()) {
        errors.push("is too common".to_string());
    }
    StrengthReport {
        valid: errors.is_empty(),
        errors,
    }
}
