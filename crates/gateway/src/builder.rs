use std::sync::Arc;

use vanish_blob::BlobStore;
use vanish_state::MetaStore;

use crate::error::ShareError;
use crate::gateway::ShareGateway;
use crate::policy::SharePolicy;

/// Fluent builder for constructing a [`ShareGateway`].
///
/// A [`MetaStore`] and a [`BlobStore`] implementation must be supplied;
/// the policy defaults to [`SharePolicy::default`].
pub struct ShareGatewayBuilder {
    meta: Option<Arc<dyn MetaStore>>,
    blobs: Option<Arc<dyn BlobStore>>,
    policy: SharePolicy,
}

impl ShareGatewayBuilder {
    /// Create a new builder with no stores attached.
    #[must_use]
    pub fn new() -> Self {
        Self {
            meta: None,
            blobs: None,
            policy: SharePolicy::default(),
        }
    }

    /// Set the metadata/counter store implementation.
    #[must_use]
    pub fn meta_store(mut self, store: Arc<dyn MetaStore>) -> Self {
        self.meta = Some(store);
        self
    }

    /// Set the blob store implementation.
    #[must_use]
    pub fn blob_store(mut self, store: Arc<dyn BlobStore>) -> Self {
        self.blobs = Some(store);
        self
    }

    /// Set the share policy.
    #[must_use]
    pub fn policy(mut self, policy: SharePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build the gateway.
    ///
    /// # Errors
    ///
    /// Returns [`ShareError::Configuration`] when a required store is
    /// missing.
    pub fn build(self) -> Result<ShareGateway, ShareError> {
        let meta = self
            .meta
            .ok_or_else(|| ShareError::Configuration("metadata store is required".into()))?;
        let blobs = self
            .blobs
            .ok_or_else(|| ShareError::Configuration("blob store is required".into()))?;

        Ok(ShareGateway {
            meta,
            blobs,
            policy: self.policy,
        })
    }
}

impl Default for ShareGatewayBuilder {
    fn default() -> Self {
        Self::new()
    }
}
