//! Authentication orchestration
//!
//! Ties the crypto primitives, the stores, and the session manager together
//! into the account lifecycle: register, login (with lockout and an optional
//! second factor), logout, 2FA enrollment, and account deletion.
//!
//! SECURITY: login failures are deliberately uninformative. An unknown
//! handle and a wrong password both surface as `InvalidCredentials`, and the
//! audit trail, not the error, records which it was.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use vp_crypto::{password, random, totp};

use crate::error::{AuthError, AuthResult};
use crate::models::{Account, EventKind, SecurityEvent, Session};
use crate::policy::LockoutPolicy;
use crate::session::SessionManager;
use crate::store::{AuditLog, VaultStore};

/// Issuer written into provisioning URIs.
pub const ISSUER: &str = "Veilpass";

/// Everything the user needs to finish 2FA enrollment. The plaintext backup
/// codes exist only in this value; the store keeps digests.
#[derive(Debug, Clone)]
pub struct SecondFactorEnrollment {
    pub secret: String,
    pub provisioning_uri: String,
    pub backup_codes: Vec<String>,
}

#[derive(Clone)]
struct CurrentAuth {
    account: Account,
    session: Session,
}

pub struct AuthOrchestrator {
    store: Arc<dyn VaultStore>,
    audit: Arc<dyn AuditLog>,
    sessions: Arc<SessionManager>,
    policy: LockoutPolicy,
    /// Device descriptor stamped onto sessions this engine creates.
    device: String,
    current: Mutex<Option<CurrentAuth>>,
}

impl AuthOrchestrator {
    pub fn new(
        store: Arc<dyn VaultStore>,
        audit: Arc<dyn AuditLog>,
        sessions: Arc<SessionManager>,
        policy: LockoutPolicy,
        device: impl Into<String>,
    ) -> Self {
        Self {
            store,
            audit,
            sessions,
            policy,
            device: device.into(),
            current: Mutex::new(None),
        }
    }

    /// Redacted copy of the signed-in account, if any.
    pub fn current_account(&self) -> Option<Account> {
        self.current.lock().as_ref().map(|c| c.account.redacted())
    }

    pub fn current_session(&self) -> Option<Session> {
        self.current.lock().as_ref().map(|c| c.session.clone())
    }

    // ── registration ────────────────────────────────────────────────────

    /// Register a new account. Returns a redacted copy of the record.
    pub async fn register(&self, handle: &str, password_input: &str) -> AuthResult<Account> {
        let handle = normalize_handle(handle);
        if handle.is_empty() {
            return Err(AuthError::validation("handle", "must not be empty"));
        }
        if password_input.is_empty() {
            return Err(AuthError::validation("password", "must not be empty"));
        }
        let report = password::validate_password_strength(password_input);
        if !report.valid {
            return Err(AuthError::validation("password", report.errors.join("; ")));
        }
        if self.store.account_by_handle(&handle).await?.is_some() {
            return Err(AuthError::validation("handle", "is already taken"));
        }

        let credential_hash = password::hash_password(password_input)?;
        let derivation_salt = BASE64.encode(random::generate_salt());
        let account = Account::new(handle, credential_hash, derivation_salt);
        self.store.save_account(&account).await?;
        self.log(account.id, EventKind::Registration, "account registered")
            .await;
        info!(account_id = %account.id, handle = %account.handle, "account registered");
        Ok(account.redacted())
    }

    // ── login / logout ──────────────────────────────────────────────────

    /// Authenticate and open a session. `second_factor` is a TOTP code or a
    /// backup code; it is only consulted when the account has 2FA enrolled.
    pub async fn login(
        &self,
        handle: &str,
        password_input: &str,
        second_factor: Option<&str>,
    ) -> AuthResult<Session> {
        if handle.trim().is_empty() {
            return Err(AuthError::validation("handle", "must not be empty"));
        }
        if password_input.is_empty() {
            return Err(AuthError::validation("password", "must not be empty"));
        }
        let handle = normalize_handle(handle);

        let Some(mut account) = self.store.account_by_handle(&handle).await? else {
            // Audit under the nil id: there is no account to attribute to,
            // but the attempt itself is still worth recording.
            self.log(
                Uuid::nil(),
                EventKind::LoginFailed,
                format!("unknown handle '{handle}'"),
            )
            .await;
            return Err(AuthError::InvalidCredentials);
        };

        let now = Utc::now();
        if account.is_locked(now) {
            return Err(AuthError::AccountLocked {
                minutes: account.remaining_lockout_minutes(now),
            });
        }

        if !password::verify_password(password_input, &account.credential_hash)? {
            return self.fail_password_attempt(account).await;
        }

        if account.second_factor_enrolled() {
            let Some(code) = second_factor else {
                return Err(AuthError::SecondFactorRequired);
            };
            if !self.check_second_factor(&mut account, code).await? {
                return self.fail_second_factor_attempt(account).await;
            }
        }

        account.failed_attempts = 0;
        account.second_factor_failures = 0;
        account.lockout_until = None;
        account.last_login = Some(Utc::now());
        self.store.update_account(&account).await?;

        let session = self
            .sessions
            .create_session(account.id, &self.device)
            .await?;
        *self.current.lock() = Some(CurrentAuth {
            account: account.clone(),
            session: session.clone(),
        });
        self.log(account.id, EventKind::LoginSuccess, "login succeeded")
            .await;
        info!(account_id = %account.id, session_id = %session.id, "login succeeded");
        Ok(session)
    }

    /// Sign out. Safe to call when nobody is signed in.
    pub async fn logout(&self) -> AuthResult<()> {
        let Some(current) = self.current.lock().take() else {
            return Ok(());
        };
        self.sessions.invalidate_session(current.session.id).await?;
        self.log(current.account.id, EventKind::Logout, "signed out")
            .await;
        info!(account_id = %current.account.id, "signed out");
        Ok(())
    }

    // ── second factor ───────────────────────────────────────────────────

    /// Enroll a TOTP second factor for the signed-in account. Returns the
    /// secret, the provisioning URI, and the plaintext backup codes — the
    /// one and only time the codes are visible.
    pub async fn enroll_second_factor(&self) -> AuthResult<SecondFactorEnrollment> {
        let mut account = self.require_current()?;

        let secret = totp::generate_secret()?;
        let provisioning_uri = totp::provisioning_uri(&secret, &account.handle, Some(ISSUER))?;
        let backup_codes = totp::generate_backup_codes();

        account.second_factor_secret = Some(secret.clone());
        account.backup_code_hashes = backup_codes
            .iter()
            .map(|c| totp::hash_backup_code(c))
            .collect();
        account.consumed_backup_indices.clear();
        self.store.update_account(&account).await?;
        self.sync_current(&account);

        self.log(
            account.id,
            EventKind::SecondFactorEnabled,
            "second factor enrolled",
        )
        .await;
        info!(account_id = %account.id, "second factor enrolled");
        Ok(SecondFactorEnrollment {
            secret,
            provisioning_uri,
            backup_codes,
        })
    }

    /// Turn the second factor off. Requires the account password again.
    pub async fn disable_second_factor(&self, password_input: &str) -> AuthResult<()> {
        let mut account = self.require_current()?;
        self.reverify(&account, password_input)?;

        account.second_factor_secret = None;
        account.backup_code_hashes.clear();
        account.consumed_backup_indices.clear();
        self.store.update_account(&account).await?;
        self.sync_current(&account);

        self.log(
            account.id,
            EventKind::SecondFactorDisabled,
            "second factor disabled",
        )
        .await;
        info!(account_id = %account.id, "second factor disabled");
        Ok(())
    }

    /// Issue a fresh batch of backup codes, invalidating the old batch.
    /// Requires the account password again.
    pub async fn regenerate_backup_codes(&self, password_input: &str) -> AuthResult<Vec<String>> {
        let mut account = self.require_current()?;
        self.reverify(&account, password_input)?;
        if !account.second_factor_enrolled() {
            return Err(AuthError::validation("second_factor", "is not enrolled"));
        }

        let backup_codes = totp::generate_backup_codes();
        account.backup_code_hashes = backup_codes
            .iter()
            .map(|c| totp::hash_backup_code(c))
            .collect();
        account.consumed_backup_indices.clear();
        self.store.update_account(&account).await?;
        self.sync_current(&account);

        info!(account_id = %account.id, "backup codes regenerated");
        Ok(backup_codes)
    }

    // ── deletion ────────────────────────────────────────────────────────

    /// Permanently delete the signed-in account and everything attached to
    /// it: vault payload, sessions, audit history, then the record itself.
    pub async fn delete_account(&self, password_input: &str) -> AuthResult<()> {
        let account = self.require_current()?;
        self.reverify(&account, password_input)?;

        // Logged first so the event exists even if a later step fails; the
        // history purge below removes it again on full success.
        self.log(account.id, EventKind::AccountDeleted, "account deleted")
            .await;
        self.store.delete_vault(account.id).await?;
        self.sessions
            .invalidate_all_account_sessions(account.id)
            .await?;
        self.audit.clear_account_events(account.id).await?;
        self.store.delete_account(account.id).await?;
        *self.current.lock() = None;
        info!(account_id = %account.id, "account deleted");
        Ok(())
    }

    // ── internals ───────────────────────────────────────────────────────

    fn require_current(&self) -> AuthResult<Account> {
        self.current
            .lock()
            .as_ref()
            .map(|c| c.account.clone())
            .ok_or(AuthError::NotAuthenticated)
    }

    /// Keep the signed-in context's account copy in step with the store.
    fn sync_current(&self, account: &Account) {
        if let Some(current) = self.current.lock().as_mut() {
            if current.account.id == account.id {
                current.account = account.clone();
            }
        }
    }

    fn reverify(&self, account: &Account, password_input: &str) -> AuthResult<()> {
        if password_input.is_empty()
            || !password::verify_password(password_input, &account.credential_hash)?
        {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(())
    }

    /// TOTP first, then the unused backup codes in issue order; a matching
    /// backup code is consumed immediately.
    async fn check_second_factor(&self, account: &mut Account, code: &str) -> AuthResult<bool> {
        let Some(secret) = account.second_factor_secret.clone() else {
            return Ok(false);
        };
        if totp::validate_token(code, &secret)? {
            return Ok(true);
        }
        for (index, digest) in account.backup_code_hashes.iter().enumerate() {
            if account.consumed_backup_indices.contains(&index) {
                continue;
            }
            if totp::validate_backup_code(code, digest) {
                account.consumed_backup_indices.push(index);
                self.store.update_account(account).await?;
                info!(
                    account_id = %account.id,
                    remaining = account.remaining_backup_codes(),
                    "backup code consumed"
                );
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn fail_password_attempt<T>(&self, mut account: Account) -> AuthResult<T> {
        account.failed_attempts += 1;
        let locked = account.failed_attempts >= self.policy.max_password_attempts;
        if locked {
            account.lockout_until = Some(Utc::now() + self.policy.lockout_duration);
            warn!(
                account_id = %account.id,
                attempts = account.failed_attempts,
                "account locked after repeated password failures"
            );
        }
        self.store.update_account(&account).await?;
        self.log(
            account.id,
            EventKind::LoginFailed,
            format!("wrong password (attempt {})", account.failed_attempts),
        )
        .await;
        if locked {
            Err(AuthError::AccountLocked {
                minutes: account.remaining_lockout_minutes(Utc::now()),
            })
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    async fn fail_second_factor_attempt<T>(&self, mut account: Account) -> AuthResult<T> {
        account.second_factor_failures += 1;
        let locked = account.second_factor_failures >= self.policy.max_second_factor_attempts;
        if locked {
            account.lockout_until = Some(Utc::now() + self.policy.lockout_duration);
            warn!(
                account_id = %account.id,
                attempts = account.second_factor_failures,
                "account locked after repeated second factor failures"
            );
        }
        self.store.update_account(&account).await?;
        self.log(
            account.id,
            EventKind::SecondFactorFailed,
            format!(
                "wrong second factor (attempt {})",
                account.second_factor_failures
            ),
        )
        .await;
        if locked {
            Err(AuthError::AccountLocked {
                minutes: account.remaining_lockout_minutes(Utc::now()),
            })
        } else {
            Err(AuthError::SecondFactorInvalid)
        }
    }

    /// Audit writes are best-effort: a dead audit backend must not block
    /// authentication itself.
    async fn log(&self, account_id: Uuid, kind: EventKind, detail: impl Into<String>) {
        let event = SecurityEvent::new(account_id, kind, detail);
        if let Err(err) = self.audit.log_event(event).await {
            warn!(error = %err, account_id = %account_id, "audit write failed");
        }
    }
}

/// Handles are compared trimmed and lowercased.
fn normalize_handle(handle: &str) -> String {
    handle.trim().to_lowercase()
}
