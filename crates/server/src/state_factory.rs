//! Metadata store construction from configuration.

use std::sync::Arc;

use tracing::info;

use vanish_state::MetaStore;
use vanish_state_memory::MemoryMetaStore;
use vanish_state_redis::{RedisConfig, RedisMetaStore};

use crate::config::StateConfig;
use crate::error::ServerError;

/// Build the configured metadata/counter store and verify it is reachable.
///
/// # Errors
///
/// Returns [`ServerError::Config`] for an unknown backend or when the
/// backend cannot be reached at startup.
pub async fn create_meta_store(config: &StateConfig) -> Result<Arc<dyn MetaStore>, ServerError> {
    match config.backend.as_str() {
        "memory" => {
            info!("using in-memory metadata store");
            Ok(Arc::new(MemoryMetaStore::new()))
        }
        "redis" => {
            let redis_config = RedisConfig {
                url: config
                    .url
                    .clone()
                    .ok_or_else(|| ServerError::Config("state.url is required for the redis backend".into()))?,
                prefix: config.prefix.clone().unwrap_or_else(|| "vanish".to_owned()),
                ..RedisConfig::default()
            };
            let store = RedisMetaStore::new(&redis_config)
                .map_err(|e| ServerError::Config(format!("redis pool: {e}")))?;
            store
                .ping()
                .await
                .map_err(|e| ServerError::Config(format!("redis unreachable: {e}")))?;
            info!(url = %redis_config.url, prefix = %redis_config.prefix, "connected to redis metadata store");
            Ok(Arc::new(store))
        }
        other => Err(ServerError::Config(format!(
            "unknown state backend '{other}' (expected 'memory' or 'redis')"
        ))),
    }
}
