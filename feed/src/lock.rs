use std::time::Duration;

use tracing::debug;
use uuid::Uuid;

use crate::error::FeedResult;
use crate::store::KeyValueStore;

/// Proof of holding the sync lock, required to release it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockToken(String);

impl LockToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// System-wide mutual exclusion for reconciliations.
///
/// The lock is a single key holding a random token. It expires after its TTL
/// even if never released, and only the holder of the current token can
/// release it, so a holder whose lock expired cannot release a lock taken
/// over by someone else.
#[derive(Debug, Clone)]
pub struct SyncLock<S> {
    store: S,
    key: String,
    ttl: Duration,
}

impl<S> SyncLock<S>
where
    S: KeyValueStore,
{
    pub fn new(store: S, key: impl Into<String>, ttl: Duration) -> Self {
        Self {
            store,
            key: key.into(),
            ttl,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Takes the lock. Returns `None` when it is already held.
    pub async fn acquire(&self) -> FeedResult<Option<LockToken>> {
        let token = LockToken(Uuid::new_v4().to_string());
        let acquired = self
            .store
            .set_if_absent(&self.key, token.as_str(), self.ttl)
            .await?;

        if !acquired {
            debug!(key = %self.key, "sync lock is already held");
            return Ok(None);
        }

        debug!(key = %self.key, ttl_secs = self.ttl.as_secs(), "acquired sync lock");
        Ok(Some(token))
    }

    /// Releases the lock if `token` still holds it.
    ///
    /// Returns `false` when the lock had already expired or changed hands.
    /// Releasing twice is harmless.
    pub async fn release(&self, token: &LockToken) -> FeedResult<bool> {
        let released = self
            .store
            .delete_if_equals(&self.key, token.as_str())
            .await?;
        debug!(key = %self.key, released, "released sync lock");

        Ok(released)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    fn lock(store: &MemoryStore) -> SyncLock<MemoryStore> {
        SyncLock::new(store.clone(), "sync_lock", Duration::from_secs(300))
    }

    #[tokio::test]
    async fn second_acquire_fails_while_held() {
        let store = MemoryStore::new();
        let first = lock(&store);
        let second = lock(&store);

        let token = first.acquire().await.unwrap().unwrap();
        assert!(second.acquire().await.unwrap().is_none());

        assert!(first.release(&token).await.unwrap());
        assert!(second.acquire().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn release_is_idempotent() {
        let store = MemoryStore::new();
        let lock = lock(&store);
        let token = lock.acquire().await.unwrap().unwrap();

        assert!(lock.release(&token).await.unwrap());
        assert!(!lock.release(&token).await.unwrap());
        assert!(!store.contains_key("sync_lock").await);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_holder_cannot_release_a_new_holders_lock() {
        let store = MemoryStore::new();
        let lock = lock(&store);
        let stale = lock.acquire().await.unwrap().unwrap();

        tokio::time::advance(Duration::from_secs(301)).await;
        let current = lock.acquire().await.unwrap().unwrap();

        assert!(!lock.release(&stale).await.unwrap());
        assert_eq!(
            store.get("sync_lock").await.as_deref(),
            Some(current.as_str())
        );
    }
}
