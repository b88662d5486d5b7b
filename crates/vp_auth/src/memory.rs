//! In-memory reference implementations of the storage collaborators.
//!
//! Used by the test suites and as the default backing for embedders that
//! keep everything in-process. Cheap to share behind an `Arc`.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;
use vp_crypto::EncryptedBlob;

use crate::error::StoreError;
use crate::models::{Account, SecurityEvent, Session};
use crate::store::{AuditLog, VaultStore};

#[derive(Default)]
pub struct MemoryStore {
    accounts: RwLock<HashMap<Uuid, Account>>,
    sessions: RwLock<HashMap<Uuid, Session>>,
    vaults: RwLock<HashMap<Uuid, EncryptedBlob>>,
}

#[async_trait]
impl VaultStore for MemoryStore {
    async fn save_account(&self, account: &Account) -> Result<(), StoreError> {
        self.accounts.write().insert(account.id, account.clone());
        Ok(())
    }

    async fn account(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.read().get(&id).cloned())
    }

    async fn account_by_handle(&self, handle: &str) -> Result<Option<Account>, StoreError> {
        Ok(self
            .accounts
            .read()
            .values()
            .find(|a| a.handle == handle)
            .cloned())
    }

    async fn update_account(&self, account: &Account) -> Result<(), StoreError> {
        let mut accounts = self.accounts.write();
        if !accounts.contains_key(&account.id) {
            return Err(StoreError::NotFound(format!("account {}", account.id)));
        }
        accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn delete_account(&self, id: Uuid) -> Result<(), StoreError> {
        self.accounts.write().remove(&id);
        Ok(())
    }

    async fn save_session(&self, session: &Session) -> Result<(), StoreError> {
        self.sessions.write().insert(session.id, session.clone());
        Ok(())
    }

    async fn session(&self, id: Uuid) -> Result<Option<Session>, StoreError> {
        Ok(self.sessions.read().get(&id).cloned())
    }

    async fn delete_session(&self, id: Uuid) -> Result<(), StoreError> {
        self.sessions.write().remove(&id);
        Ok(())
    }

    async fn account_sessions(&self, account_id: Uuid) -> Result<Vec<Session>, StoreError> {
        Ok(self
            .sessions
            .read()
            .values()
            .filter(|s| s.account_id == account_id)
            .cloned()
            .collect())
    }

    async fn delete_all_account_sessions(&self, account_id: Uuid) -> Result<(), StoreError> {
        self.sessions.write().retain(|_, s| s.account_id != account_id);
        Ok(())
    }

    async fn sessions(&self) -> Result<Vec<Session>, StoreError> {
        Ok(self.sessions.read().values().cloned().collect())
    }

    async fn save_vault(&self, account_id: Uuid, blob: &EncryptedBlob) -> Result<(), StoreError> {
        self.vaults.write().insert(account_id, blob.clone());
        Ok(())
    }

    async fn vault(&self, account_id: Uuid) -> Result<Option<EncryptedBlob>, StoreError> {
        Ok(self.vaults.read().get(&account_id).cloned())
    }

    async fn delete_vault(&self, account_id: Uuid) -> Result<(), StoreError> {
        self.vaults.write().remove(&account_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryAuditLog {
    events: RwLock<Vec<SecurityEvent>>,
}

#[async_trait]
impl AuditLog for MemoryAuditLog {
    async fn log_event(&self, event: SecurityEvent) -> Result<(), StoreError> {
        self.events.write().push(event);
        Ok(())
    }

    async fn account_events(&self, account_id: Uuid) -> Result<Vec<SecurityEvent>, StoreError> {
        Ok(self
            .events
            .read()
            .iter()
            .filter(|e| e.account_id == account_id)
            .cloned()
            .collect())
    }

    async fn clear_account_events(&self, account_id: Uuid) -> Result<(), StoreError> {
        self.events.write().retain(|e| e.account_id != account_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn update_requires_existing_account() {
        let store = MemoryStore::default();
        let account = Account::new("alice".into(), "hash".into(), "salt".into());
        assert!(matches!(
            store.update_account(&account).await,
            Err(StoreError::NotFound(_))
        ));
        store.save_account(&account).await.unwrap();
        store.update_account(&account).await.unwrap();
    }

    #[tokio::test]
    async fn session_enumeration_is_scoped_by_account() {
        let store = MemoryStore::default();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        for (i, owner) in [a, a, b].into_iter().enumerate() {
            let now = chrono::Utc::now();
            store
                .save_session(&Session {
                    id: Uuid::new_v4(),
                    account_id: owner,
                    token: format!("t{i}"),
                    created_at: now,
                    last_activity: now,
                    absolute_expiry: now + chrono::Duration::hours(8),
                    device: "test".into(),
                })
                .await
                .unwrap();
        }
        assert_eq!(store.account_sessions(a).await.unwrap().len(), 2);
        assert_eq!(store.account_sessions(b).await.unwrap().len(), 1);
        assert_eq!(store.sessions().await.unwrap().len(), 3);

        store.delete_all_account_sessions(a).await.unwrap();
        assert_eq!(store.sessions().await.unwrap().len(), 1);
    }
}
