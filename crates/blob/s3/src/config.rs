/// Configuration for the S3 blob store backend.
///
/// Credentials come from the standard AWS provider chain (environment,
/// profile, instance metadata); they are never part of this struct.
#[derive(Debug, Clone)]
pub struct S3Config {
    /// Bucket holding all objects.
    pub bucket: String,

    /// AWS region.
    pub region: String,

    /// Endpoint URL override for S3-compatible stores (MinIO, LocalStack).
    pub endpoint_url: Option<String>,

    /// Key prefix applied to every object key.
    pub prefix: Option<String>,

    /// Use path-style addressing (`host/bucket/key`). Required by MinIO.
    pub force_path_style: bool,
}

impl S3Config {
    /// Create a new `S3Config` for the given bucket and region.
    pub fn new(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: region.into(),
            endpoint_url: None,
            prefix: None,
            force_path_style: false,
        }
    }

    /// Set the endpoint URL override.
    #[must_use]
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    /// Set the object key prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Enable path-style addressing.
    #[must_use]
    pub fn with_force_path_style(mut self, force: bool) -> Self {
        self.force_path_style = force;
        self
    }
}
