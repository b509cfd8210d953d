use std::time::Duration;

/// Per-deployment limits and defaults for share lifetimes.
///
/// Passed into the gateway at construction; there is no ambient global
/// configuration, so tests can pin whatever horizon they need.
#[derive(Debug, Clone)]
pub struct SharePolicy {
    /// Expiry applied when an upload requests `ttl_hours = 0`.
    /// `0` means no expiry at all.
    pub default_ttl_hours: u32,

    /// Largest accepted `ttl_hours` value.
    pub max_ttl_hours: u32,

    /// Largest accepted `download_limit` value.
    pub max_download_limit: u32,
}

impl Default for SharePolicy {
    fn default() -> Self {
        Self {
            default_ttl_hours: 24,
            max_ttl_hours: 24 * 7,
            max_download_limit: 100,
        }
    }
}

impl SharePolicy {
    /// Resolve the expiry horizon for a requested `ttl_hours`.
    ///
    /// Record and counter are both written with this value so they expire
    /// together. `None` means the keys never expire.
    #[must_use]
    pub fn expiry_for(&self, ttl_hours: u32) -> Option<Duration> {
        let hours = if ttl_hours > 0 {
            ttl_hours
        } else {
            self.default_ttl_hours
        };
        (hours > 0).then(|| Duration::from_secs(u64::from(hours) * 3600))
    }
}
