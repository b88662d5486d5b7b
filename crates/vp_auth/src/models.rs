//! Persisted record shapes
//!
//! SECURITY: `Account.credential_hash` never leaves the engine — accounts
//! returned to callers go through [`Account::redacted`] first. Plaintext
//! backup codes are never stored; only their digests appear here.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user of the vault.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    /// Stored trimmed and lowercased; unique across the store.
    pub handle: String,
    /// PHC-encoded Argon2id hash. Empty in redacted copies.
    pub credential_hash: String,
    /// Base64 salt for deriving the vault encryption key. Not secret.
    pub derivation_salt: String,
    /// Base32 TOTP secret; `Some` iff a second factor is enrolled.
    pub second_factor_secret: Option<String>,
    /// SHA-256 digests of the backup-code batch, in issue order.
    pub backup_code_hashes: Vec<String>,
    /// Indices into `backup_code_hashes` that have been consumed.
    pub consumed_backup_indices: Vec<usize>,
    pub failed_attempts: u32,
    pub second_factor_failures: u32,
    pub lockout_until: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(handle: String, credential_hash: String, derivation_salt: String) -> Self {
        Self {
            id: vp_crypto::random::generate_uuid(),
            handle,
            credential_hash,
            derivation_salt,
            second_factor_secret: None,
            backup_code_hashes: Vec::new(),
            consumed_backup_indices: Vec::new(),
            failed_attempts: 0,
            second_factor_failures: 0,
            lockout_until: None,
            last_login: None,
            created_at: Utc::now(),
        }
    }

    pub fn second_factor_enrolled(&self) -> bool {
        self.second_factor_secret.is_some()
    }

    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.lockout_until.is_some_and(|until| until > now)
    }

    /// Minutes until the lockout lifts, rounded up. Zero when not locked.
    pub fn remaining_lockout_minutes(&self, now: DateTime<Utc>) -> i64 {
        match self.lockout_until {
            Some(until) if until > now => {
                let secs = (until - now).num_seconds();
                (secs + 59) / 60
            }
            _ => 0,
        }
    }

    pub fn remaining_backup_codes(&self) -> usize {
        self.backup_code_hashes
            .len()
            .saturating_sub(self.consumed_backup_indices.len())
    }

    pub fn backup_codes_exhausted(&self) -> bool {
        self.remaining_backup_codes() == 0
    }

    /// Copy safe to hand back to callers: the credential hash is stripped.
    pub fn redacted(&self) -> Account {
        let mut account = self.clone();
        account.credential_hash.clear();
        account
    }
}

/// An authenticated session. Expiry is a pure function of time — there is
/// no stored "expired" flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub account_id: Uuid,
    /// Opaque random bearer token (32 bytes, hex).
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    /// `created_at` + absolute timeout; never extended by activity.
    pub absolute_expiry: DateTime<Utc>,
    /// Free-form device/context descriptor ("cli", "desktop", ...).
    pub device: String,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>, idle_timeout: Duration) -> bool {
        now >= self.absolute_expiry || now - self.last_activity >= idle_timeout
    }
}

/// Audit record kinds emitted by the engine. Wire names are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "registration")]
    Registration,
    #[serde(rename = "login_success")]
    LoginSuccess,
    #[serde(rename = "login_failed")]
    LoginFailed,
    #[serde(rename = "logout")]
    Logout,
    #[serde(rename = "2fa_enabled")]
    SecondFactorEnabled,
    #[serde(rename = "2fa_disabled")]
    SecondFactorDisabled,
    #[serde(rename = "2fa_failed")]
    SecondFactorFailed,
    #[serde(rename = "account_deleted")]
    AccountDeleted,
}

/// Append-only audit record. The engine only ever writes these; it never
/// reads them back to make decisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityEvent {
    pub account_id: Uuid,
    pub kind: EventKind,
    pub at: DateTime<Utc>,
    pub detail: String,
}

impl SecurityEvent {
    pub fn new(account_id: Uuid, kind: EventKind, detail: impl Into<String>) -> Self {
        Self {
            account_id,
            kind,
            at: Utc::now(),
            detail: detail.into(),
        }
    }
}
