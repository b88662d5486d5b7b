//! Authenticated encryption
//!
//! AES-256-GCM. Key: 32 bytes. IV: 12 bytes (random per call). Tag: 16 bytes,
//! appended to the ciphertext by the cipher. Flipping any bit of ciphertext,
//! IV, or tag makes decryption fail — it can never "succeed" with garbage.
//!
//! `EncryptedBlob` is the storable form: ciphertext, IV, and a fresh salt,
//! each base64-encoded and each independently random per call even when the
//! same plaintext is encrypted twice under the same key.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::CryptoError;
use crate::kdf::EncryptionKey;
use crate::random;

/// Ciphertext + IV + salt, base64-encoded, ready for the key/value store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedBlob {
    pub ciphertext: String,
    pub iv: String,
    pub salt: String,
}

/// Encrypt `plaintext` under `key` with a fresh random IV and salt.
pub fn encrypt_data(plaintext: &[u8], key: &EncryptionKey) -> Result<EncryptedBlob, CryptoError> {
    let cipher =
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| CryptoError::EncryptFailed)?;
    let iv = random::generate_iv();
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext)
        .map_err(|_| CryptoError::EncryptFailed)?;
    Ok(EncryptedBlob {
        ciphertext: general_purpose::STANDARD.encode(ciphertext),
        iv: general_purpose::STANDARD.encode(iv),
        salt: general_purpose::STANDARD.encode(random::generate_salt()),
    })
}

/// Decrypt a blob produced by [`encrypt_data`].
///
/// Authentication failure (wrong key, tampered ciphertext/IV/tag) is
/// `DecryptFailed`; a structurally malformed blob (bad base64, wrong IV
/// length) is `InvalidInput`.
pub fn decrypt_data(blob: &EncryptedBlob, key: &EncryptionKey) -> Result<Vec<u8>, CryptoError> {
    let iv = general_purpose::STANDARD
        .decode(&blob.iv)
        .map_err(|_| CryptoError::InvalidInput("iv is not valid base64".into()))?;
    if iv.len() != random::IV_LEN {
        return Err(CryptoError::InvalidInput(format!(
            "iv must be {} bytes, got {}",
            random::IV_LEN,
            iv.len()
        )));
    }
    let ciphertext = general_purpose::STANDARD
        .decode(&blob.ciphertext)
        .map_err(|_| CryptoError::InvalidInput("ciphertext is not valid base64".into()))?;

    let cipher =
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| CryptoError::DecryptFailed)?;
    cipher
        .decrypt(Nonce::from_slice(&iv), ciphertext.as_slice())
        .map_err(|_| CryptoError::DecryptFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kdf::derive_encryption_key;

    fn test_key() -> EncryptionKey {
        derive_encryption_key("master pass", &[7u8; 32]).unwrap()
    }

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let key = test_key();
        let blob = encrypt_data(b"vault payload", &key).unwrap();
        assert_eq!(decrypt_data(&blob, &key).unwrap(), b"vault payload");
    }

    #[test]
    fn same_plaintext_same_key_yields_fresh_blob() {
        let key = test_key();
        let a = encrypt_data(b"vault payload", &key).unwrap();
        let b = encrypt_data(b"vault payload", &key).unwrap();
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn flipped_ciphertext_bit_fails_authentication() {
        let key = test_key();
        let blob = encrypt_data(b"vault payload", &key).unwrap();
        let mut raw = general_purpose::STANDARD.decode(&blob.ciphertext).unwrap();
        // Flip one bit in every position in turn; none may decrypt.
        for i in 0..raw.len() {
            raw[i] ^= 0x01;
            let tampered = EncryptedBlob {
                ciphertext: general_purpose::STANDARD.encode(&raw),
                ..blob.clone()
            };
            assert!(matches!(
                decrypt_data(&tampered, &key),
                Err(CryptoError::DecryptFailed)
            ));
            raw[i] ^= 0x01;
        }
    }

    #[test]
    fn flipped_iv_bit_fails_authentication() {
        let key = test_key();
        let blob = encrypt_data(b"vault payload", &key).unwrap();
        let mut iv = general_purpose::STANDARD.decode(&blob.iv).unwrap();
        iv[0] ^= 0x80;
        let tampered = EncryptedBlob {
            iv: general_purpose::STANDARD.encode(&iv),
            ..blob
        };
        assert!(matches!(
            decrypt_data(&tampered, &key),
            Err(CryptoError::DecryptFailed)
        ));
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let blob = encrypt_data(b"vault payload", &test_key()).unwrap();
        let other = derive_encryption_key("other pass", &[7u8; 32]).unwrap();
        assert!(matches!(
            decrypt_data(&blob, &other),
            Err(CryptoError::DecryptFailed)
        ));
    }

    #[test]
    fn malformed_blob_is_invalid_input_not_decrypt_failure() {
        let key = test_key();
        let blob = encrypt_data(b"vault payload", &key).unwrap();

        let bad_b64 = EncryptedBlob {
            ciphertext: "%%%not-base64%%%".into(),
            ..blob.clone()
        };
        assert!(matches!(
            decrypt_data(&bad_b64, &key),
            Err(CryptoError::InvalidInput(_))
        ));

        let short_iv = EncryptedBlob {
            iv: general_purpose::STANDARD.encode([0u8; 4]),
            ..blob
        };
        assert!(matches!(
            decrypt_data(&short_iv, &key),
            Err(CryptoError::InvalidInput(_))
        ));
    }
}
