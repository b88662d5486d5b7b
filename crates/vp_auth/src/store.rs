//! Storage and audit collaborators
//!
//! The engine is storage-agnostic: persistence is an opaque key/value
//! collaborator behind [`VaultStore`], and the audit trail behind
//! [`AuditLog`]. Implementations may be a file, an embedded database, or
//! the in-memory store in [`crate::memory`].
//!
//! Neither trait offers transactions. Read-modify-write sequences (failure
//! counters during login) are therefore not atomic across concurrent calls;
//! the engine accepts that race rather than inventing locking the backing
//! store cannot honor.

use async_trait::async_trait;
use uuid::Uuid;
use vp_crypto::EncryptedBlob;

use crate::error::StoreError;
use crate::models::{Account, SecurityEvent, Session};

/// Key/value persistence for accounts, sessions, and the encrypted vault.
#[async_trait]
pub trait VaultStore: Send + Sync {
    /// Persist a new account record.
    async fn save_account(&self, account: &Account) -> Result<(), StoreError>;

    /// Fetch an account by id.
    async fn account(&self, id: Uuid) -> Result<Option<Account>, StoreError>;

    /// Fetch an account by its normalized handle.
    async fn account_by_handle(&self, handle: &str) -> Result<Option<Account>, StoreError>;

    /// Overwrite an existing account record. `NotFound` if it was deleted.
    async fn update_account(&self, account: &Account) -> Result<(), StoreError>;

    /// Delete an account record. Deleting a missing account is not an error.
    async fn delete_account(&self, id: Uuid) -> Result<(), StoreError>;

    /// Persist (or overwrite) a session.
    async fn save_session(&self, session: &Session) -> Result<(), StoreError>;

    /// Fetch a session by id.
    async fn session(&self, id: Uuid) -> Result<Option<Session>, StoreError>;

    /// Delete a session. Deleting a missing session is not an error.
    async fn delete_session(&self, id: Uuid) -> Result<(), StoreError>;

    /// All sessions belonging to one account.
    async fn account_sessions(&self, account_id: Uuid) -> Result<Vec<Session>, StoreError>;

    /// Delete every session belonging to one account.
    async fn delete_all_account_sessions(&self, account_id: Uuid) -> Result<(), StoreError>;

    /// Every stored session, for the expiry sweep.
    async fn sessions(&self) -> Result<Vec<Session>, StoreError>;

    /// Persist the account's encrypted vault payload.
    async fn save_vault(&self, account_id: Uuid, blob: &EncryptedBlob) -> Result<(), StoreError>;

    /// Fetch the account's encrypted vault payload.
    async fn vault(&self, account_id: Uuid) -> Result<Option<EncryptedBlob>, StoreError>;

    /// Delete the account's encrypted vault payload.
    async fn delete_vault(&self, account_id: Uuid) -> Result<(), StoreError>;
}

/// Append-only security audit trail.
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Append one event.
    async fn log_event(&self, event: SecurityEvent) -> Result<(), StoreError>;

    /// All events for one account, oldest first.
    async fn account_events(&self, account_id: Uuid) -> Result<Vec<SecurityEvent>, StoreError>;

    /// Purge an account's audit history (account deletion only).
    async fn clear_account_events(&self, account_id: Uuid) -> Result<(), StoreError>;
}
