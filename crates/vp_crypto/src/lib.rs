//! vp_crypto — Veilpass cryptographic primitives
//!
//! # Design principles
//! - NO custom crypto; all primitives come from audited Rust crates.
//! - Zeroize derived key material on drop.
//! - Mismatches surface as booleans, not errors, so callers cannot turn the
//!   verifier into an oracle. Errors are reserved for structurally invalid
//!   input and genuine primitive failures.
//!
//! # Module layout
//! - `password` — Argon2id credential hashing/verification + strength check
//! - `kdf`      — PBKDF2-HMAC-SHA256 vault key derivation
//! - `aead`     — AES-256-GCM encrypt/decrypt with tamper detection
//! - `random`   — CSPRNG salts, IVs, tokens, UUIDs
//! - `totp`     — RFC 6238 one-time codes + single-use backup codes
//! - `error`    — unified error type

pub mod aead;
pub mod error;
pub mod kdf;
pub mod password;
pub mod random;
pub mod totp;

pub use aead::EncryptedBlob;
pub use error::CryptoError;
pub use kdf::EncryptionKey;
