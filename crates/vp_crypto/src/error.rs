use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Password hashing failed: {0}")]
    HashFailed(String),

    #[error("Salt too short: need at least {min} bytes, got {got}")]
    InvalidSalt { min: usize, got: usize },

    #[error("Encryption failed")]
    EncryptFailed,

    #[error("Decryption failed (authentication tag mismatch — possible tampering)")]
    DecryptFailed,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("One-time code error: {0}")]
    Totp(String),
}
