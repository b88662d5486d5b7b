//! Vault key derivation
//!
//! `derive_encryption_key` — PBKDF2-HMAC-SHA256, turns the master passphrase
//! + per-account salt into the 32-byte AES key used by `aead`. The key lives
//! only for the duration of an unlock; it is zeroized on drop and is never
//! serialized or logged.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use std::fmt;
use zeroize::ZeroizeOnDrop;

use crate::error::CryptoError;

pub const PBKDF2_ITERATIONS: u32 = 100_000;
pub const DERIVED_KEY_LEN: usize = 32;
pub const MIN_SALT_LEN: usize = 16;

/// 32-byte symmetric key derived from the master passphrase.
/// Zeroized on drop; deliberately implements neither `Clone` nor `Serialize`.
#[derive(ZeroizeOnDrop)]
pub struct EncryptionKey([u8; DERIVED_KEY_LEN]);

impl EncryptionKey {
    pub fn as_bytes(&self) -> &[u8; DERIVED_KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptionKey(..)")
    }
}

/// Derive the vault encryption key from the master passphrase and the
/// account's stored derivation salt. The salt is not secret but must carry
/// at least 128 bits.
pub fn derive_encryption_key(
    master_password: &str,
    salt: &[u8],
) -> Result<EncryptionKey, CryptoError> {
    if master_password.is_empty() {
        return Err(CryptoError::InvalidInput(
            "master password must not be empty".into(),
        ));
    }
    if salt.len() < MIN_SALT_LEN {
        return Err(CryptoError::InvalidSalt {
            min: MIN_SALT_LEN,
            got: salt.len(),
        });
    }
    let mut key = [0u8; DERIVED_KEY_LEN];
    pbkdf2_hmac::<Sha256>(master_password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key);
    Ok(EncryptionKey(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic_per_salt() {
        let salt = [7u8; 32];
        let a = derive_encryption_key("master pass", &salt).unwrap();
        let b = derive_encryption_key("master pass", &salt).unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());

        let other_salt = [8u8; 32];
        let c = derive_encryption_key("master pass", &other_salt).unwrap();
        assert_ne!(a.as_bytes(), c.as_bytes());

        let d = derive_encryption_key("other pass", &salt).unwrap();
        assert_ne!(a.as_bytes(), d.as_bytes());
    }

    #[test]
    fn short_salt_rejected() {
        let err = derive_encryption_key("master pass", &[0u8; 15]).unwrap_err();
        assert!(matches!(err, CryptoError::InvalidSalt { min: 16, got: 15 }));
    }

    #[test]
    fn empty_password_rejected() {
        assert!(matches!(
            derive_encryption_key("", &[0u8; 32]),
            Err(CryptoError::InvalidInput(_))
        ));
    }

    #[test]
    fn debug_never_prints_key_bytes() {
        let key = derive_encryption_key("master pass", &[7u8; 32]).unwrap();
        assert_eq!(format!("{key:?}"), "EncryptionKey(..)");
    }
}
