use thiserror::Error;
use uuid::Uuid;
use vp_crypto::CryptoError;

/// Failures raised by a storage or audit-log collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Deliberately generic: never reveals whether the handle exists or
    /// which part of the credential was wrong.
    #[error("Invalid handle or password")]
    InvalidCredentials,

    #[error("Account locked — try again in {minutes} minute(s)")]
    AccountLocked { minutes: i64 },

    #[error("Second factor code required")]
    SecondFactorRequired,

    #[error("Invalid second factor code")]
    SecondFactorInvalid,

    #[error("{field} {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Session expired")]
    SessionExpired,

    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("No account is signed in")]
    NotAuthenticated,

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthError {
    /// Machine-readable code for the failures a caller must branch on
    /// (re-prompt for a second factor, show lockout countdown). Generic
    /// credential failures intentionally carry no code.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            AuthError::AccountLocked { .. } => Some("ACCOUNT_LOCKED"),
            AuthError::SecondFactorRequired => Some("2FA_REQUIRED"),
            AuthError::SecondFactorInvalid => Some("2FA_INVALID"),
            _ => None,
        }
    }

    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        AuthError::Validation {
            field,
            reason: reason.into(),
        }
    }
}

pub type AuthResult<T> = Result<T, AuthError>;
