use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::bail;
use crate::error::{ErrorKind, FeedResult};
use crate::store::KeyValueStore;

#[derive(Debug, Clone)]
enum Value {
    Plain(String),
    Hash(HashMap<String, String>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, Entry>,
    unavailable: bool,
}

impl Inner {
    /// Returns the live entry at `key`, dropping it first if it has expired.
    fn live_entry(&mut self, key: &str) -> Option<&mut Entry> {
        let now = Instant::now();
        if self.entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            self.entries.remove(key);
        }

        self.entries.get_mut(key)
    }

    fn check_available(&self) -> FeedResult<()> {
        if self.unavailable {
            bail!(
                ErrorKind::StoreConnectionFailed,
                "Redis is unreachable",
                "store marked unavailable"
            );
        }

        Ok(())
    }
}

/// In-memory [`KeyValueStore`] with expiries driven by the Tokio clock.
///
/// Clones share state. Tests can pause time and advance it to expire keys.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call fail with [`ErrorKind::StoreConnectionFailed`] while `unavailable` is set.
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.inner.lock().await.unavailable = unavailable;
    }

    /// Returns whether `key` currently exists.
    pub async fn contains_key(&self, key: &str) -> bool {
        self.inner.lock().await.live_entry(key).is_some()
    }

    /// Returns the plain value at `key`, if any.
    pub async fn get(&self, key: &str) -> Option<String> {
        match self.inner.lock().await.live_entry(key) {
            Some(Entry {
                value: Value::Plain(value),
                ..
            }) => Some(value.clone()),
            _ => None,
        }
    }

    /// Returns the time left before `key` expires, `None` when it is missing or never expires.
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        self.inner
            .lock()
            .await
            .live_entry(key)
            .and_then(|entry| entry.expires_at)
            .map(|expires_at| expires_at.saturating_duration_since(now))
    }
}

impl KeyValueStore for MemoryStore {
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> FeedResult<bool> {
        let mut inner = self.inner.lock().await;
        inner.check_available()?;

        if inner.live_entry(key).is_some() {
            return Ok(false);
        }

        inner.entries.insert(
            key.to_string(),
            Entry {
                value: Value::Plain(value.to_string()),
                expires_at: Some(Instant::now() + ttl),
            },
        );

        Ok(true)
    }

    async fn delete_if_equals(&self, key: &str, value: &str) -> FeedResult<bool> {
        let mut inner = self.inner.lock().await;
        inner.check_available()?;

        let matches = matches!(
            inner.live_entry(key),
            Some(Entry { value: Value::Plain(current), .. }) if current.as_str() == value
        );
        if matches {
            inner.entries.remove(key);
        }

        Ok(matches)
    }

    async fn hash_set(
        &self,
        key: &str,
        fields: Vec<(String, String)>,
        ttl: Duration,
    ) -> FeedResult<()> {
        let mut inner = self.inner.lock().await;
        inner.check_available()?;

        let expires_at = Some(Instant::now() + ttl);
        match inner.live_entry(key) {
            Some(Entry {
                value: Value::Hash(hash),
                expires_at: current_expiry,
            }) => {
                hash.extend(fields);
                *current_expiry = expires_at;
            }
            Some(_) => bail!(
                ErrorKind::StoreQueryFailed,
                "Redis command failed",
                format!("WRONGTYPE key {key} does not hold a hash")
            ),
            None => {
                inner.entries.insert(
                    key.to_string(),
                    Entry {
                        value: Value::Hash(fields.into_iter().collect()),
                        expires_at,
                    },
                );
            }
        }

        Ok(())
    }

    async fn hash_update(&self, key: &str, fields: Vec<(String, String)>) -> FeedResult<bool> {
        let mut inner = self.inner.lock().await;
        inner.check_available()?;

        match inner.live_entry(key) {
            Some(Entry {
                value: Value::Hash(hash),
                ..
            }) => {
                hash.extend(fields);
                Ok(true)
            }
            Some(_) => bail!(
                ErrorKind::StoreQueryFailed,
                "Redis command failed",
                format!("WRONGTYPE key {key} does not hold a hash")
            ),
            None => Ok(false),
        }
    }

    async fn hash_get_all(&self, key: &str) -> FeedResult<HashMap<String, String>> {
        let mut inner = self.inner.lock().await;
        inner.check_available()?;

        match inner.live_entry(key) {
            Some(Entry {
                value: Value::Hash(hash),
                ..
            }) => Ok(hash.clone()),
            Some(_) => bail!(
                ErrorKind::StoreQueryFailed,
                "Redis command failed",
                format!("WRONGTYPE key {key} does not hold a hash")
            ),
            None => Ok(HashMap::new()),
        }
    }
}
