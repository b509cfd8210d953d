use std::time::Duration;

use async_trait::async_trait;

use crate::error::StateError;
use crate::key::MetaKey;

/// Trait for persisting file records and download counters.
///
/// Implementations must be `Send + Sync` and safe for concurrent access.
/// `decrement` is the single serialization point for concurrent downloads
/// racing on the last permitted download, so it must be linearizable per
/// key and must not be implemented as a separate read-then-write.
#[async_trait]
pub trait MetaStore: Send + Sync {
    /// Set a value, overwriting any previous one. `ttl: None` means the
    /// store's own default (or no expiry), per deployed policy.
    async fn set(
        &self,
        key: &MetaKey,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), StateError>;

    /// Get the value for a key. Returns `None` if absent or expired.
    async fn get(&self, key: &MetaKey) -> Result<Option<String>, StateError>;

    /// Check whether a key currently exists.
    async fn exists(&self, key: &MetaKey) -> Result<bool, StateError>;

    /// Delete the given keys. Returns how many existed.
    async fn delete(&self, keys: &[MetaKey]) -> Result<u64, StateError>;

    /// Atomically decrement a counter by one and return the new value.
    ///
    /// Fails with [`StateError::NotFound`] when the key is absent — the
    /// counter is never created as a side effect of decrementing it.
    async fn decrement(&self, key: &MetaKey) -> Result<i64, StateError>;
}
