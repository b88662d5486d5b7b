//! One-time codes
//!
//! RFC 6238 TOTP: SHA-1, 6 digits, 30-second period, ±1 period of clock
//! drift. Secrets are 160-bit, base32-encoded. QR rendering is the UI's
//! job — this module only builds the `otpauth://` provisioning URI.
//!
//! Backup codes are the offline fallback: 10 single-use 8-character codes
//! drawn from an alphabet without visually ambiguous characters. Only their
//! SHA-256 digests are ever stored.

use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;
use totp_rs::{Algorithm, Secret, TOTP};

use crate::error::CryptoError;

pub const TOTP_DIGITS: usize = 6;
pub const TOTP_PERIOD: u64 = 30;
pub const TOTP_SKEW: u8 = 1;

pub const BACKUP_CODE_COUNT: usize = 10;
pub const BACKUP_CODE_LEN: usize = 8;

/// Alphanumeric minus `0`, `O`, `I`, `l`.
const BACKUP_CODE_ALPHABET: &[u8] =
    b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz123456789";

/// Generate a fresh 160-bit shared secret, base32-encoded.
pub fn generate_secret() -> Result<String, CryptoError> {
    let Secret::Encoded(b32) = Secret::generate_secret().to_encoded() else {
        return Err(CryptoError::Totp("secret encoding failed".into()));
    };
    Ok(b32)
}

/// Build the `otpauth://totp/...` provisioning URI for an authenticator app.
pub fn provisioning_uri(
    secret: &str,
    label: &str,
    issuer: Option<&str>,
) -> Result<String, CryptoError> {
    let totp = build_totp(secret, issuer.unwrap_or("Veilpass"), label)?;
    Ok(totp.get_url())
}

/// Validate a 6-digit code against the shared secret at the current time.
/// Anything that is not exactly 6 ASCII digits is rejected without touching
/// the clock or the secret.
pub fn validate_token(code: &str, secret: &str) -> Result<bool, CryptoError> {
    validate_token_at(code, secret, unix_now()?)
}

/// Validate a code at an explicit Unix timestamp. Accepts the current
/// 30-second period and one period on either side.
pub fn validate_token_at(code: &str, secret: &str, time: u64) -> Result<bool, CryptoError> {
    if code.len() != TOTP_DIGITS || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(false);
    }
    let totp = build_totp(secret, "Veilpass", "account")?;
    Ok(totp.check(code, time))
}

/// Generate a batch of mutually-unique single-use backup codes.
pub fn generate_backup_codes() -> Vec<String> {
    use rand::{rngs::OsRng, RngCore};
    let mut codes: Vec<String> = Vec::with_capacity(BACKUP_CODE_COUNT);
    while codes.len() < BACKUP_CODE_COUNT {
        let code: String = (0..BACKUP_CODE_LEN)
            .map(|_| {
                let idx = OsRng.next_u32() as usize % BACKUP_CODE_ALPHABET.len();
                BACKUP_CODE_ALPHABET[idx] as char
            })
            .collect();
        if !codes.contains(&code) {
            codes.push(code);
        }
    }
    codes
}

/// One-way digest of a backup code (case-sensitive), hex-encoded.
/// Deterministic so a presented code can be matched against stored digests.
pub fn hash_backup_code(code: &str) -> String {
    hex::encode(Sha256::digest(code.as_bytes()))
}

/// Compare a presented code against a stored digest in constant time.
/// A malformed stored digest simply never matches.
pub fn validate_backup_code(code: &str, digest_hex: &str) -> bool {
    let Ok(stored) = hex::decode(digest_hex) else {
        return false;
    };
    let computed = Sha256::digest(code.as_bytes());
    bool::from(computed.as_slice().ct_eq(&stored))
}

fn build_totp(secret: &str, issuer: &str, label: &str) -> Result<TOTP, CryptoError> {
    let secret_bytes = Secret::Encoded(secret.to_string())
        .to_bytes()
        .map_err(|e| CryptoError::Totp(format!("undecodable secret: {e:?}")))?;
    TOTP::new(
        Algorithm::SHA1,
        TOTP_DIGITS,
        TOTP_SKEW,
        TOTP_PERIOD,
        secret_bytes,
        Some(issuer.to_string()),
        label.to_string(),
    )
    .map_err(|e| CryptoError::Totp(format!("totp setup failed: {e:?}")))
}

fn unix_now() -> Result<u64, CryptoError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| CryptoError::Totp(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: u64 = 1_700_000_000; // arbitrary fixed reference time

    #[test]
    fn secret_is_base32_with_160_bits() {
        let secret = generate_secret().unwrap();
        let bytes = Secret::Encoded(secret).to_bytes().unwrap();
        assert!(bytes.len() * 8 >= 160);
    }

    #[test]
    fn current_code_validates() {
        let secret = generate_secret().unwrap();
        let code = build_totp(&secret, "Veilpass", "account")
            .unwrap()
            .generate(unix_now().unwrap());
        assert!(validate_token(&code, &secret).unwrap());
    }

    #[test]
    fn drift_window_is_one_period_each_way() {
        let secret = generate_secret().unwrap();
        let totp = build_totp(&secret, "Veilpass", "account").unwrap();
        for offset in [-30i64, 0, 30] {
            let code = totp.generate((T as i64 + offset) as u64);
            assert!(
                validate_token_at(&code, &secret, T).unwrap(),
                "code at {offset}s drift must validate"
            );
        }
        for offset in [-90i64, -60, 60, 90] {
            let code = totp.generate((T as i64 + offset) as u64);
            assert!(
                !validate_token_at(&code, &secret, T).unwrap(),
                "code at {offset}s drift must be rejected"
            );
        }
    }

    #[test]
    fn malformed_codes_rejected_without_computation() {
        let secret = generate_secret().unwrap();
        for bad in ["", "12345", "1234567", "abcdef", "12a456", "１２３４５６"] {
            assert!(!validate_token_at(bad, &secret, T).unwrap());
        }
    }

    #[test]
    fn provisioning_uri_carries_label_and_issuer() {
        let secret = generate_secret().unwrap();
        let uri = provisioning_uri(&secret, "alice", Some("Veilpass")).unwrap();
        assert!(uri.starts_with("otpauth://totp/"));
        assert!(uri.contains("alice"));
        assert!(uri.contains("issuer=Veilpass"));
    }

    #[test]
    fn backup_codes_unique_and_unambiguous() {
        let codes = generate_backup_codes();
        assert_eq!(codes.len(), BACKUP_CODE_COUNT);
        for code in &codes {
            assert_eq!(code.len(), BACKUP_CODE_LEN);
            assert!(code.chars().all(|c| !"0OIl".contains(c) && c.is_ascii_alphanumeric()));
        }
        let mut deduped = codes.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), codes.len());
    }

    #[test]
    fn backup_code_digest_roundtrip_is_case_sensitive() {
        let digest = hash_backup_code("Abcd2345");
        assert!(validate_backup_code("Abcd2345", &digest));
        assert!(!validate_backup_code("abcd2345", &digest));
        assert!(!validate_backup_code("Abcd2346", &digest));
        assert!(!validate_backup_code("Abcd2345", "zz-not-hex"));
        // Deterministic: hashing again yields the same digest.
        assert_eq!(digest, hash_backup_code("Abcd2345"));
    }
}
