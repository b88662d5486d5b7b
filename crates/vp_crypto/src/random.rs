//! CSPRNG helpers
//!
//! All randomness comes from the operating system generator. Output lengths
//! are fixed: 32-byte salts, 12-byte AES-GCM IVs, 32-byte session tokens
//! (hex-encoded), version-4 UUIDs.

use rand::{rngs::OsRng, RngCore};
use uuid::Uuid;

pub const SALT_LEN: usize = 32;
pub const IV_LEN: usize = 12;
pub const TOKEN_LEN: usize = 32;

/// Fresh 32-byte salt (key derivation, blob headers).
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Fresh 96-bit AES-GCM IV. Never reuse one under the same key.
pub fn generate_iv() -> [u8; IV_LEN] {
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);
    iv
}

/// Opaque session token: 32 random bytes, hex-encoded.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_LEN];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Random version-4 UUID (RFC 4122 variant).
pub fn generate_uuid() -> Uuid {
    Uuid::new_v4()
}
