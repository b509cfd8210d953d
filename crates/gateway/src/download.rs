use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;
use tracing::{debug, error, instrument, warn};

use vanish_blob::{BlobKey, BlobStore, ByteStream};
use vanish_core::{FileRecord, ReferenceId};
use vanish_state::{MetaKey, MetaStore, StateError};

use crate::error::ShareError;
use crate::gateway::ShareGateway;

/// One granted download: the stored bytes plus what the transport layer
/// needs for its headers.
pub struct Download {
    /// The sanitized display name recorded at upload time.
    pub filename: String,
    /// Byte count confirmed at upload time.
    pub size: u64,
    /// The blob's bytes. When this download exhausted the share, dropping
    /// the stream (consumed or not) triggers cleanup of both stores.
    pub stream: ByteStream,
}

impl std::fmt::Debug for Download {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Download")
            .field("filename", &self.filename)
            .field("size", &self.size)
            .field("stream", &"<ByteStream>")
            .finish()
    }
}

impl ShareGateway {
    /// Redeem a reference id for its stored bytes.
    ///
    /// Runs the per-request state machine: parse the id, load and decode
    /// the record, gate on the counter, then open the blob. The single
    /// atomic decrement is the only serialization point; a request that
    /// observes a negative post-decrement value is refused without rolling
    /// the decrement back. The request that observes exactly zero owns
    /// cleanup, which fires when its stream is dropped on any exit path.
    #[instrument(skip(self))]
    pub async fn download(&self, reference: &str) -> Result<Download, ShareError> {
        // Malformed ids are rejected before any store is consulted.
        let id = ReferenceId::parse(reference).map_err(|_| ShareError::InvalidReference)?;
        let (meta_key, limit_key, _) = Self::keys(&id);

        let Some(raw) = self.meta.get(&meta_key).await? else {
            return Err(ShareError::NotFound);
        };
        let record = match FileRecord::decode(&raw) {
            Ok(record) => record,
            Err(e) => {
                // An unreadable record answers exactly like an expired one.
                warn!(id = %id, error = %e, "file record is unreadable");
                return Err(ShareError::NotFound);
            }
        };

        let owns_cleanup = if self.meta.exists(&limit_key).await? {
            match self.meta.decrement(&limit_key).await {
                Ok(remaining) if remaining < 0 => {
                    // Not rolled back: the counter is about to be deleted by
                    // whichever request observed zero, and a re-increment
                    // would reopen the race this decrement closes.
                    debug!(id = %id, remaining, "download refused, limit exhausted");
                    return Err(ShareError::LimitExceeded);
                }
                Ok(remaining) => remaining == 0,
                // The counter expired between the existence check and the
                // decrement; the share is at end-of-life either way.
                Err(StateError::NotFound(_)) => return Err(ShareError::NotFound),
                Err(e) => return Err(ShareError::Transient(e.to_string())),
            }
        } else {
            // No counter means unlimited; nothing shared is mutated.
            false
        };

        let blob_key = BlobKey::new(record.blob_key.clone());
        let cleanup = owns_cleanup.then(|| CleanupTask {
            meta: Arc::clone(&self.meta),
            blobs: Arc::clone(&self.blobs),
            id,
            meta_key,
            limit_key,
            blob_key: blob_key.clone(),
        });

        let object = match self.blobs.get(&blob_key).await {
            Ok(Some(object)) => object,
            Ok(None) => {
                // The no-orphan invariant says this cannot happen; the
                // record is dead regardless, so an owned cleanup still runs.
                error!(id = %id, key = %blob_key, "blob missing despite live metadata");
                if let Some(cleanup) = cleanup {
                    cleanup.spawn();
                }
                return Err(ShareError::Inconsistent(format!(
                    "blob missing for share {id}"
                )));
            }
            Err(e) => {
                if let Some(cleanup) = cleanup {
                    cleanup.spawn();
                }
                return Err(ShareError::Transient(e.to_string()));
            }
        };

        debug!(id = %id, size = record.size, gated = cleanup.is_some(), "download granted");
        let stream = match cleanup {
            Some(cleanup) => Box::pin(CleanupOnDrop {
                inner: object.stream,
                cleanup: Some(cleanup),
            }) as ByteStream,
            None => object.stream,
        };

        Ok(Download {
            filename: record.filename,
            size: record.size,
            stream,
        })
    }
}

/// Deferred deletion of one exhausted share across both stores.
struct CleanupTask {
    meta: Arc<dyn MetaStore>,
    blobs: Arc<dyn BlobStore>,
    id: ReferenceId,
    meta_key: MetaKey,
    limit_key: MetaKey,
    blob_key: BlobKey,
}

impl CleanupTask {
    /// Run the deletion in the background; the response is already on its
    /// way out and never reflects a cleanup failure.
    fn spawn(self) {
        tokio::spawn(self.run());
    }

    async fn run(self) {
        // Metadata and counter first, blob second: the mirror of creation
        // order, so a crash mid-cleanup leaves at worst an unreachable
        // orphaned blob rather than live metadata pointing at nothing.
        if let Err(e) = self
            .meta
            .delete(&[self.meta_key.clone(), self.limit_key.clone()])
            .await
        {
            warn!(id = %self.id, error = %e, "cleanup failed to delete metadata");
        }
        if let Err(e) = self.blobs.delete(&self.blob_key).await {
            warn!(id = %self.id, key = %self.blob_key, error = %e, "cleanup failed to delete blob, orphaned");
        }
        debug!(id = %self.id, "share exhausted and purged");
    }
}

/// Byte stream wrapper that fires cleanup exactly once when dropped.
///
/// Completion, client disconnect, and mid-transfer errors all end with the
/// stream being dropped, so every exit path releases the blob read handle
/// and still purges the exhausted share.
struct CleanupOnDrop {
    inner: ByteStream,
    cleanup: Option<CleanupTask>,
}

impl Stream for CleanupOnDrop {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl Drop for CleanupOnDrop {
    fn drop(&mut self) {
        if let Some(cleanup) = self.cleanup.take() {
            cleanup.spawn();
        }
    }
}
