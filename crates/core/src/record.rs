use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Descriptive metadata for one stored blob.
///
/// Held in the metadata store under `meta:<id>`, JSON-encoded. A record is
/// either fully present with a live blob at `blob_key`, or fully absent;
/// there is no state where readable metadata points at missing bytes except
/// transiently during cleanup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Locator of the stored bytes in the blob store. Immutable once written.
    pub blob_key: String,
    /// Byte length as confirmed by the blob store at write time.
    pub size: u64,
    /// When the upload completed.
    pub uploaded_at: DateTime<Utc>,
    /// Requested lifetime in hours; `0` means the store's own default expiry.
    pub ttl_hours: u32,
    /// Downloads requested at upload time; `0` means unlimited.
    pub download_limit: u32,
    /// Sanitized display name, independent of `blob_key`.
    pub filename: String,
}

impl FileRecord {
    /// Serialize to the canonical textual encoding.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from the canonical textual encoding.
    ///
    /// Callers treat a decode failure exactly like an absent record: an
    /// unreadable record and an expired one look the same from outside.
    pub fn decode(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }
}
