use async_trait::async_trait;

use crate::error::BlobError;
use crate::types::{BlobKey, BlobObject, ByteStream};

/// Trait for persisting opaque blobs.
///
/// Implementations must be `Send + Sync` and must stream in both directions:
/// a put or get of a large object never holds the whole object in memory.
/// Keys are unique per upload, so implementations never see write contention
/// on a single key.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stream `data` into the store under `key`, overwriting any previous
    /// object. Returns the number of bytes actually stored, which callers
    /// trust over any size the uploader declared.
    ///
    /// `size_hint` is advisory; backends may use it to pick a write strategy
    /// but must not fail when the stream turns out longer or shorter.
    async fn put(
        &self,
        key: &BlobKey,
        data: ByteStream,
        size_hint: Option<u64>,
    ) -> Result<u64, BlobError>;

    /// Open the object at `key` for reading. Returns `None` when absent.
    async fn get(&self, key: &BlobKey) -> Result<Option<BlobObject>, BlobError>;

    /// Delete the object at `key`. Deleting an absent object is not an error.
    async fn delete(&self, key: &BlobKey) -> Result<(), BlobError>;
}
