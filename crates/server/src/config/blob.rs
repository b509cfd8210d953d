use serde::Deserialize;

/// Configuration for the blob store backend.
#[derive(Debug, Deserialize)]
pub struct BlobConfig {
    /// Which backend to use: `"memory"` or `"s3"`.
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Bucket holding all objects.
    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// AWS region.
    #[serde(default = "default_region")]
    pub region: String,

    /// Endpoint URL override for S3-compatible stores (MinIO, LocalStack).
    pub endpoint_url: Option<String>,

    /// Key prefix applied to every object key.
    pub prefix: Option<String>,

    /// Use path-style addressing. Required by MinIO.
    #[serde(default)]
    pub force_path_style: bool,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            bucket: default_bucket(),
            region: default_region(),
            endpoint_url: None,
            prefix: None,
            force_path_style: false,
        }
    }
}

fn default_backend() -> String {
    "memory".to_owned()
}

fn default_bucket() -> String {
    "vanish".to_owned()
}

fn default_region() -> String {
    "us-east-1".to_owned()
}
