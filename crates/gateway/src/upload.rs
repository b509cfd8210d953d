use chrono::Utc;
use tracing::{debug, info, instrument};

use vanish_blob::ByteStream;
use vanish_core::{FileRecord, ReferenceId, sanitize_filename};

use crate::error::ShareError;
use crate::gateway::ShareGateway;

/// One upload: a byte stream plus the caller's lifetime parameters.
pub struct UploadRequest {
    /// The (already client-side-encrypted) bytes to store.
    pub data: ByteStream,
    /// Size the caller declared, if any. Advisory only; the stored size is
    /// whatever the blob store confirms.
    pub declared_size: Option<u64>,
    /// Display name for the eventual download, sanitized server-side.
    pub filename: String,
    /// Requested lifetime in hours; `0` means the configured default.
    pub ttl_hours: u32,
    /// Permitted downloads; `0` means unlimited.
    pub download_limit: u32,
}

impl std::fmt::Debug for UploadRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadRequest")
            .field("declared_size", &self.declared_size)
            .field("filename", &self.filename)
            .field("ttl_hours", &self.ttl_hours)
            .field("download_limit", &self.download_limit)
            .field("data", &"<ByteStream>")
            .finish()
    }
}

/// What a successful upload hands back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    /// The reference id redeemable for downloads.
    pub id: ReferenceId,
    /// Byte count confirmed by the blob store.
    pub size: u64,
    /// Echo of the requested lifetime.
    pub ttl_hours: u32,
    /// Echo of the requested download limit.
    pub download_limit: u32,
    /// The sanitized filename downloads will carry.
    pub filename: String,
}

impl ShareGateway {
    /// Store an uploaded blob and register it for later redemption.
    ///
    /// Writes run in a fixed order: blob first, then the metadata record,
    /// then the counter when a limit was requested. Each step's failure
    /// compensates the prior steps in reverse order, so readable metadata
    /// always has a live blob behind it; the worst crash outcome is an
    /// unreachable orphaned blob. Failures after validation are transient
    /// and safe to retry, since the reference id is only disclosed once
    /// every write has landed.
    #[instrument(skip(self, request), fields(filename = %request.filename, ttl_hours = request.ttl_hours, download_limit = request.download_limit))]
    pub async fn upload(&self, request: UploadRequest) -> Result<UploadReceipt, ShareError> {
        if request.ttl_hours > self.policy.max_ttl_hours {
            return Err(ShareError::InvalidRequest {
                field: "ttl",
                reason: format!(
                    "{} exceeds the maximum of {} hours",
                    request.ttl_hours, self.policy.max_ttl_hours
                ),
            });
        }
        if request.download_limit > self.policy.max_download_limit {
            return Err(ShareError::InvalidRequest {
                field: "download_limit",
                reason: format!(
                    "{} exceeds the maximum of {}",
                    request.download_limit, self.policy.max_download_limit
                ),
            });
        }
        let filename =
            sanitize_filename(&request.filename).ok_or_else(|| ShareError::InvalidRequest {
                field: "filename",
                reason: "no displayable characters remain after sanitization".into(),
            })?;

        let id = ReferenceId::generate();
        let (meta_key, limit_key, blob_key) = Self::keys(&id);

        // Blob before metadata: a crash between the two leaves an orphaned
        // blob nobody can address, never metadata pointing at nothing.
        let size = self
            .blobs
            .put(&blob_key, request.data, request.declared_size)
            .await?;
        debug!(id = %id, size, "blob stored");

        let record = FileRecord {
            blob_key: blob_key.as_str().to_owned(),
            size,
            uploaded_at: Utc::now(),
            ttl_hours: request.ttl_hours,
            download_limit: request.download_limit,
            filename: filename.clone(),
        };
        let encoded = match record.encode() {
            Ok(encoded) => encoded,
            Err(e) => {
                self.compensate_blob(&id, &blob_key).await;
                return Err(ShareError::Transient(format!(
                    "failed to encode file record: {e}"
                )));
            }
        };

        let expiry = self.policy.expiry_for(request.ttl_hours);
        if let Err(e) = self.meta.set(&meta_key, &encoded, expiry).await {
            self.compensate_blob(&id, &blob_key).await;
            return Err(ShareError::Transient(e.to_string()));
        }

        // Counter and record share one expiry horizon so they die together.
        if request.download_limit > 0 {
            if let Err(e) = self
                .meta
                .set(&limit_key, &request.download_limit.to_string(), expiry)
                .await
            {
                self.compensate_record(&id, &meta_key).await;
                self.compensate_blob(&id, &blob_key).await;
                return Err(ShareError::Transient(e.to_string()));
            }
        }

        info!(id = %id, size, "upload complete");
        Ok(UploadReceipt {
            id,
            size,
            ttl_hours: request.ttl_hours,
            download_limit: request.download_limit,
            filename,
        })
    }
}
