use serde::Deserialize;

use vanish_gateway::SharePolicy;

/// Share lifetime policy configuration.
#[derive(Debug, Deserialize)]
pub struct ShareConfig {
    /// Expiry applied when an upload requests no TTL. `0` means no expiry.
    #[serde(default = "default_ttl_hours")]
    pub default_ttl_hours: u32,

    /// Largest accepted TTL, in hours.
    #[serde(default = "default_max_ttl_hours")]
    pub max_ttl_hours: u32,

    /// Largest accepted download limit.
    #[serde(default = "default_max_download_limit")]
    pub max_download_limit: u32,

    /// Largest accepted upload body, in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            default_ttl_hours: default_ttl_hours(),
            max_ttl_hours: default_max_ttl_hours(),
            max_download_limit: default_max_download_limit(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl ShareConfig {
    /// The gateway policy this configuration describes.
    #[must_use]
    pub fn policy(&self) -> SharePolicy {
        SharePolicy {
            default_ttl_hours: self.default_ttl_hours,
            max_ttl_hours: self.max_ttl_hours,
            max_download_limit: self.max_download_limit,
        }
    }
}

fn default_ttl_hours() -> u32 {
    24
}

fn default_max_ttl_hours() -> u32 {
    24 * 7
}

fn default_max_download_limit() -> u32 {
    100
}

fn default_max_upload_bytes() -> usize {
    1024 * 1024 * 1024
}
