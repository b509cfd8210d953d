use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;

use vanish_state::error::StateError;
use vanish_state::key::MetaKey;
use vanish_state::store::MetaStore;

/// A single entry in the in-memory store.
#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    /// Returns `true` if this entry has passed its TTL deadline.
    fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// Compute the expiry instant from an optional TTL duration.
fn expiry_from_ttl(ttl: Option<Duration>) -> Option<Instant> {
    ttl.map(|d| Instant::now() + d)
}

/// In-memory [`MetaStore`] backed by a [`DashMap`].
///
/// Entries are lazily evicted on access when their TTL has elapsed. The
/// async trait methods return immediately; `decrement` mutates under the
/// map's shard lock, so it is atomic with respect to concurrent callers.
#[derive(Debug, Default)]
pub struct MemoryMetaStore {
    data: DashMap<String, Entry>,
}

impl MemoryMetaStore {
    /// Create a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the store currently holds no entries at all.
    ///
    /// Test-only visibility into the map, for asserting compensation and
    /// cleanup actually removed every key.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Render a [`MetaKey`] into the string used as the map key.
    fn render_key(key: &MetaKey) -> String {
        key.canonical()
    }
}

#[async_trait]
impl MetaStore for MemoryMetaStore {
    async fn set(
        &self,
        key: &MetaKey,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), StateError> {
        let rendered = Self::render_key(key);
        self.data.insert(
            rendered,
            Entry {
                value: value.to_owned(),
                expires_at: expiry_from_ttl(ttl),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &MetaKey) -> Result<Option<String>, StateError> {
        let rendered = Self::render_key(key);

        // Lazy TTL eviction: check and remove if expired.
        if let Some(entry) = self.data.get(&rendered) {
            if entry.is_expired() {
                drop(entry);
                self.data.remove(&rendered);
                return Ok(None);
            }
            return Ok(Some(entry.value.clone()));
        }

        Ok(None)
    }

    async fn exists(&self, key: &MetaKey) -> Result<bool, StateError> {
        let rendered = Self::render_key(key);
        self.data
            .remove_if(&rendered, |_, entry| entry.is_expired());
        Ok(self.data.contains_key(&rendered))
    }

    async fn delete(&self, keys: &[MetaKey]) -> Result<u64, StateError> {
        let mut deleted = 0u64;
        for key in keys {
            let rendered = Self::render_key(key);
            // Treat expired entries as already gone.
            if let Some((_, entry)) = self.data.remove(&rendered)
                && !entry.is_expired()
            {
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    async fn decrement(&self, key: &MetaKey) -> Result<i64, StateError> {
        let rendered = Self::render_key(key);

        // Remove any expired entry first so it reads as absent.
        self.data
            .remove_if(&rendered, |_, entry| entry.is_expired());

        // The shard lock held by `get_mut` makes the read-modify-write atomic.
        let Some(mut entry) = self.data.get_mut(&rendered) else {
            return Err(StateError::NotFound(rendered));
        };

        let current: i64 = entry
            .value
            .parse()
            .map_err(|e: std::num::ParseIntError| {
                StateError::Serialization(format!("counter value is not an integer: {e}"))
            })?;

        let new_value = current - 1;
        entry.value = new_value.to_string();
        Ok(new_value)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use vanish_state::testing::run_store_conformance_tests;

    use super::*;

    #[tokio::test]
    async fn conformance() {
        let store = MemoryMetaStore::new();
        run_store_conformance_tests(&store)
            .await
            .expect("conformance tests should pass");
    }

    #[tokio::test(start_paused = true)]
    async fn ttl_expiry_via_get() {
        let store = MemoryMetaStore::new();
        let key = MetaKey::meta("ttl-expire");

        store
            .set(&key, "short-lived", Some(Duration::from_secs(5)))
            .await
            .unwrap();

        // Value should be present before TTL elapses.
        let val = store.get(&key).await.unwrap();
        assert_eq!(val.as_deref(), Some("short-lived"));

        // Advance time past TTL.
        tokio::time::advance(Duration::from_secs(6)).await;

        // Lazy eviction: get should return None.
        let val = store.get(&key).await.unwrap();
        assert!(val.is_none(), "value should be expired");
    }

    #[tokio::test(start_paused = true)]
    async fn ttl_expiry_via_exists_and_decrement() {
        let store = MemoryMetaStore::new();
        let key = MetaKey::limit("ttl-counter");

        store
            .set(&key, "2", Some(Duration::from_secs(3)))
            .await
            .unwrap();
        assert!(store.exists(&key).await.unwrap());

        tokio::time::advance(Duration::from_secs(4)).await;

        assert!(!store.exists(&key).await.unwrap(), "counter should expire");
        let result = store.decrement(&key).await;
        assert!(
            matches!(result, Err(StateError::NotFound(_))),
            "expired counter must read as absent to decrement"
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_decrement_hands_out_zero_exactly_once() {
        let store = Arc::new(MemoryMetaStore::new());
        let key = MetaKey::limit("race");
        store.set(&key, "1", None).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            let key = key.clone();
            handles.push(tokio::spawn(
                async move { store.decrement(&key).await },
            ));
        }

        let mut zeroes = 0;
        let mut negatives = 0;
        for handle in handles {
            match handle.await.unwrap().unwrap() {
                0 => zeroes += 1,
                v if v < 0 => negatives += 1,
                v => panic!("unexpected counter value {v}"),
            }
        }

        assert_eq!(zeroes, 1, "exactly one caller observes zero");
        assert_eq!(negatives, 7);
    }
}
