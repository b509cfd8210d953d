use std::sync::Arc;

use tracing::warn;

use vanish_blob::{BlobKey, BlobStore};
use vanish_core::ReferenceId;
use vanish_state::{MetaKey, MetaStore};

use crate::builder::ShareGatewayBuilder;
use crate::policy::SharePolicy;

/// Orchestrates the ephemeral lifecycle of uploaded blobs across the
/// metadata/counter store and the blob store.
///
/// Construct via [`ShareGateway::builder`]. The gateway holds no in-process
/// locks; all cross-request coordination lives in the stores' atomic
/// primitives, so any number of uploads and downloads may run concurrently.
pub struct ShareGateway {
    pub(crate) meta: Arc<dyn MetaStore>,
    pub(crate) blobs: Arc<dyn BlobStore>,
    pub(crate) policy: SharePolicy,
}

impl ShareGateway {
    /// Start building a gateway.
    #[must_use]
    pub fn builder() -> ShareGatewayBuilder {
        ShareGatewayBuilder::new()
    }

    /// The policy this gateway enforces.
    #[must_use]
    pub fn policy(&self) -> &SharePolicy {
        &self.policy
    }

    /// All store keys derived from one reference id.
    pub(crate) fn keys(id: &ReferenceId) -> (MetaKey, MetaKey, BlobKey) {
        (
            MetaKey::meta(id.to_string()),
            MetaKey::limit(id.to_string()),
            BlobKey::new(id.blob_key()),
        )
    }

    /// Best-effort deletion of a blob during upload compensation.
    ///
    /// A failure here leaves an orphaned blob: unreachable, reclaimable by
    /// an out-of-band sweep, and worth an operational alert but never a
    /// different answer to the original caller.
    pub(crate) async fn compensate_blob(&self, id: &ReferenceId, key: &BlobKey) {
        if let Err(e) = self.blobs.delete(key).await {
            warn!(id = %id, key = %key, error = %e, "compensation failed, blob orphaned");
        }
    }

    /// Best-effort deletion of the metadata record during compensation.
    pub(crate) async fn compensate_record(&self, id: &ReferenceId, key: &MetaKey) {
        if let Err(e) = self.meta.delete(std::slice::from_ref(key)).await {
            warn!(id = %id, key = %key, error = %e, "compensation failed to delete metadata record");
        }
    }
}

impl std::fmt::Debug for ShareGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareGateway")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
