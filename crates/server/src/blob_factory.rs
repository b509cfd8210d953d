//! Blob store construction from configuration.

use std::sync::Arc;

use tracing::info;

use vanish_blob::BlobStore;
use vanish_blob_memory::MemoryBlobStore;
use vanish_blob_s3::{S3BlobStore, S3Config};

use crate::config::BlobConfig;
use crate::error::ServerError;

/// Build the configured blob store and verify the bucket is reachable.
///
/// # Errors
///
/// Returns [`ServerError::Config`] for an unknown backend or when the
/// bucket cannot be reached at startup.
pub async fn create_blob_store(config: &BlobConfig) -> Result<Arc<dyn BlobStore>, ServerError> {
    match config.backend.as_str() {
        "memory" => {
            info!("using in-memory blob store");
            Ok(Arc::new(MemoryBlobStore::new()))
        }
        "s3" => {
            let mut s3_config = S3Config::new(&config.bucket, &config.region)
                .with_force_path_style(config.force_path_style);
            if let Some(endpoint) = &config.endpoint_url {
                s3_config = s3_config.with_endpoint_url(endpoint);
            }
            if let Some(prefix) = &config.prefix {
                s3_config = s3_config.with_prefix(prefix);
            }
            let store = S3BlobStore::new(&s3_config).await;
            store
                .check_bucket()
                .await
                .map_err(|e| ServerError::Config(format!("s3: {e}")))?;
            info!(bucket = %config.bucket, region = %config.region, "connected to s3 blob store");
            Ok(Arc::new(store))
        }
        other => Err(ServerError::Config(format!(
            "unknown blob backend '{other}' (expected 'memory' or 's3')"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_backend_builds() {
        let config = BlobConfig::default();
        assert!(create_blob_store(&config).await.is_ok());
    }

    #[tokio::test]
    async fn unknown_backend_is_rejected() {
        let config = BlobConfig {
            backend: "gcs".into(),
            ..BlobConfig::default()
        };
        let err = create_blob_store(&config).await.unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }
}
