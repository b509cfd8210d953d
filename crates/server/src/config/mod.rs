//! TOML configuration for the vanish server.
//!
//! Every section and field has a default, so an absent file yields a
//! runnable in-memory configuration.

mod blob;
mod cors;
mod server;
mod share;
mod state;

pub use blob::BlobConfig;
pub use cors::CorsConfig;
pub use server::ServerConfig;
pub use share::ShareConfig;
pub use state::StateConfig;

use serde::Deserialize;

/// Top-level configuration for the vanish server.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VanishConfig {
    /// HTTP bind configuration.
    pub server: ServerConfig,
    /// Metadata/counter store backend.
    pub state: StateConfig,
    /// Blob store backend.
    pub blob: BlobConfig,
    /// Share lifetime policy.
    pub share: ShareConfig,
    /// Cross-origin resource sharing.
    pub cors: CorsConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: VanishConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.state.backend, "memory");
        assert_eq!(config.blob.backend, "memory");
        assert_eq!(config.share.default_ttl_hours, 24);
        assert!(config.cors.origins.is_empty());
    }

    #[test]
    fn sections_parse_from_toml() {
        let config: VanishConfig = toml::from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9090

            [state]
            backend = "redis"
            url = "redis://redis:6379"
            prefix = "shares"

            [blob]
            backend = "s3"
            bucket = "vanish-prod"
            region = "eu-central-1"
            endpoint_url = "http://minio:9000"
            force_path_style = true

            [share]
            default_ttl_hours = 12
            max_ttl_hours = 48
            max_download_limit = 10
            max_upload_bytes = 1048576

            [cors]
            origins = ["https://app.example.com"]
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.state.backend, "redis");
        assert_eq!(config.state.url.as_deref(), Some("redis://redis:6379"));
        assert_eq!(config.blob.bucket, "vanish-prod");
        assert!(config.blob.force_path_style);
        assert_eq!(config.share.max_ttl_hours, 48);
        assert_eq!(config.share.max_upload_bytes, 1_048_576);
        assert_eq!(config.cors.origins, vec!["https://app.example.com"]);
    }
}
