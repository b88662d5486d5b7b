//! Session lifecycle
//!
//! A session is Active until time expires it (idle or absolute timeout) or
//! something invalidates it (logout, account deletion, sweep). Expiry is
//! computed, never stored: the sweep merely deletes sessions the computation
//! already considers dead, so a stopped sweep never *extends* a session.

use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;
use vp_crypto::random;

use crate::error::{AuthError, AuthResult, StoreError};
use crate::models::Session;
use crate::policy::SessionPolicy;
use crate::store::VaultStore;

pub struct SessionManager {
    store: Arc<dyn VaultStore>,
    policy: SessionPolicy,
    sweeper: Mutex<Option<SweeperHandle>>,
}

struct SweeperHandle {
    shutdown_tx: watch::Sender<bool>,
    task: tokio::task::JoinHandle<()>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn VaultStore>, policy: SessionPolicy) -> Self {
        Self {
            store,
            policy,
            sweeper: Mutex::new(None),
        }
    }

    pub fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    /// Create and persist a session for `account_id`.
    pub async fn create_session(
        &self,
        account_id: Uuid,
        device: &str,
    ) -> Result<Session, StoreError> {
        let now = Utc::now();
        let session = Session {
            id: random::generate_uuid(),
            account_id,
            token: random::generate_token(),
            created_at: now,
            last_activity: now,
            absolute_expiry: now + self.policy.absolute_timeout,
            device: device.to_string(),
        };
        self.store.save_session(&session).await?;
        debug!(session_id = %session.id, account_id = %account_id, "session created");
        Ok(session)
    }

    pub async fn session(&self, id: Uuid) -> Result<Option<Session>, StoreError> {
        self.store.session(id).await
    }

    /// Record activity. Pushes the idle window forward; the absolute expiry
    /// is never extended.
    pub async fn update_activity(&self, id: Uuid) -> AuthResult<()> {
        let Some(mut session) = self.store.session(id).await? else {
            return Err(AuthError::SessionNotFound(id));
        };
        session.last_activity = Utc::now();
        self.store.save_session(&session).await?;
        Ok(())
    }

    pub fn is_session_expired(&self, session: &Session) -> bool {
        session.is_expired(Utc::now(), self.policy.idle_timeout)
    }

    /// Fetch a session and require it to be live. An expired session is
    /// deleted on sight and reported as `SessionExpired`.
    pub async fn validate_session(&self, id: Uuid) -> AuthResult<Session> {
        let Some(session) = self.store.session(id).await? else {
            return Err(AuthError::SessionNotFound(id));
        };
        if self.is_session_expired(&session) {
            self.store.delete_session(id).await?;
            return Err(AuthError::SessionExpired);
        }
        Ok(session)
    }

    pub async fn invalidate_session(&self, id: Uuid) -> Result<(), StoreError> {
        self.store.delete_session(id).await
    }

    pub async fn invalidate_all_account_sessions(
        &self,
        account_id: Uuid,
    ) -> Result<(), StoreError> {
        self.store.delete_all_account_sessions(account_id).await
    }

    /// Delete every expired session. Returns how many were removed.
    pub async fn sweep_expired(&self) -> Result<usize, StoreError> {
        Self::sweep(&self.store, &self.policy).await
    }

    async fn sweep(
        store: &Arc<dyn VaultStore>,
        policy: &SessionPolicy,
    ) -> Result<usize, StoreError> {
        let now = Utc::now();
        let mut removed = 0;
        for session in store.sessions().await? {
            if session.is_expired(now, policy.idle_timeout) {
                store.delete_session(session.id).await?;
                removed += 1;
            }
        }
        if removed > 0 {
            debug!(removed, "expired sessions swept");
        }
        Ok(removed)
    }

    /// Start the periodic expiry sweep. Idempotent: calling it while a sweep
    /// task is already running does nothing.
    pub fn start_expiration_check(&self) {
        let mut guard = self.sweeper.lock();
        if guard.is_some() {
            return;
        }
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let store = Arc::clone(&self.store);
        let policy = self.policy;
        let interval = self.policy.cleanup_interval;
        let task = tokio::spawn(async move {
            info!(interval_secs = interval.as_secs(), "session sweep started");
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            info!("session sweep shutting down");
                            return;
                        }
                    }
                }
                // A failed pass must not kill the loop; the next tick retries.
                if let Err(err) = Self::sweep(&store, &policy).await {
                    warn!(error = %err, "session sweep pass failed");
                }
            }
        });
        *guard = Some(SweeperHandle { shutdown_tx, task });
    }

    /// Stop the periodic sweep. Idempotent.
    pub fn stop_expiration_check(&self) {
        if let Some(handle) = self.sweeper.lock().take() {
            let _ = handle.shutdown_tx.send(true);
            handle.task.abort();
        }
    }

    #[cfg(test)]
    fn expiration_check_running(&self) -> bool {
        self.sweeper.lock().is_some()
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.stop_expiration_check();
    }
}
