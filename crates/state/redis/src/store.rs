use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{Config, Pool, Runtime};
use redis::{AsyncCommands, Script};

use vanish_state::error::StateError;
use vanish_state::key::MetaKey;
use vanish_state::store::MetaStore;

use crate::config::RedisConfig;
use crate::key_render::render_key;
use crate::scripts;

/// Redis-backed implementation of [`MetaStore`].
///
/// File records and download counters are plain Redis strings; expiry uses
/// millisecond `PEXPIRE` semantics on `SET`. The decrement-if-exists
/// primitive runs as a Lua script so gating remains a single atomic step.
pub struct RedisMetaStore {
    pool: Pool,
    prefix: String,
}

impl RedisMetaStore {
    /// Create a new `RedisMetaStore` from the provided configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Connection`] if the pool cannot be created.
    pub fn new(config: &RedisConfig) -> Result<Self, StateError> {
        let cfg = Config::from_url(&config.url);
        let pool = cfg
            .builder()
            .map(|b| {
                b.max_size(config.pool_size)
                    .wait_timeout(Some(config.connection_timeout))
                    .runtime(Runtime::Tokio1)
                    .build()
            })
            .map_err(|e| StateError::Connection(e.to_string()))?
            .map_err(|e| StateError::Connection(e.to_string()))?;

        Ok(Self {
            pool,
            prefix: config.prefix.clone(),
        })
    }

    /// Verify the server is reachable with a `PING`.
    pub async fn ping(&self) -> Result<(), StateError> {
        let mut conn = self.conn().await?;
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(|e| StateError::Connection(e.to_string()))?;
        Ok(())
    }

    /// Build the full Redis key for an entry.
    fn redis_key(&self, key: &MetaKey) -> String {
        render_key(&self.prefix, key)
    }

    /// Obtain a connection from the pool.
    async fn conn(&self) -> Result<deadpool_redis::Connection, StateError> {
        self.pool
            .get()
            .await
            .map_err(|e| StateError::Connection(e.to_string()))
    }
}

#[async_trait]
impl MetaStore for RedisMetaStore {
    async fn set(
        &self,
        key: &MetaKey,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), StateError> {
        let redis_key = self.redis_key(key);
        let mut conn = self.conn().await?;

        match ttl {
            Some(d) => {
                let ms = i64::try_from(d.as_millis()).unwrap_or(i64::MAX);
                let () = redis::cmd("SET")
                    .arg(&redis_key)
                    .arg(value)
                    .arg("PX")
                    .arg(ms)
                    .query_async(&mut conn)
                    .await
                    .map_err(|e| StateError::Backend(e.to_string()))?;
            }
            None => {
                let () = conn
                    .set(&redis_key, value)
                    .await
                    .map_err(|e| StateError::Backend(e.to_string()))?;
            }
        }

        Ok(())
    }

    async fn get(&self, key: &MetaKey) -> Result<Option<String>, StateError> {
        let redis_key = self.redis_key(key);
        let mut conn = self.conn().await?;

        let val: Option<String> = conn
            .get(&redis_key)
            .await
            .map_err(|e| StateError::Backend(e.to_string()))?;

        Ok(val)
    }

    async fn exists(&self, key: &MetaKey) -> Result<bool, StateError> {
        let redis_key = self.redis_key(key);
        let mut conn = self.conn().await?;

        let found: bool = conn
            .exists(&redis_key)
            .await
            .map_err(|e| StateError::Backend(e.to_string()))?;

        Ok(found)
    }

    async fn delete(&self, keys: &[MetaKey]) -> Result<u64, StateError> {
        if keys.is_empty() {
            return Ok(0);
        }
        let redis_keys: Vec<String> = keys.iter().map(|k| self.redis_key(k)).collect();
        let mut conn = self.conn().await?;

        let deleted: u64 = conn
            .del(&redis_keys)
            .await
            .map_err(|e| StateError::Backend(e.to_string()))?;

        Ok(deleted)
    }

    async fn decrement(&self, key: &MetaKey) -> Result<i64, StateError> {
        let redis_key = self.redis_key(key);
        let mut conn = self.conn().await?;

        let script = Script::new(scripts::DECREMENT_IF_EXISTS);
        // The script returns `false` (nil to the client) for an absent key.
        let new_value: Option<i64> = script
            .key(&redis_key)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| StateError::Backend(e.to_string()))?;

        new_value.ok_or(StateError::NotFound(key.canonical()))
    }
}
