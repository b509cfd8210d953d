use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use dashmap::DashMap;
use futures::StreamExt;

use vanish_blob::error::BlobError;
use vanish_blob::store::BlobStore;
use vanish_blob::types::{BlobKey, BlobObject, ByteStream};

/// In-memory [`BlobStore`] backed by a [`DashMap`].
///
/// `put` drains the caller's stream into one buffer; `get` serves the stored
/// bytes back as a single-chunk stream. Cheap clones via [`Bytes`] mean a
/// reader holds a snapshot even if the object is overwritten or deleted
/// while the stream is still open.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    objects: DashMap<String, Bytes>,
}

impl MemoryBlobStore {
    /// Create a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an object is currently stored under `key`.
    ///
    /// Test-only visibility into the map, for asserting cleanup actually
    /// removed the bytes.
    #[must_use]
    pub fn contains(&self, key: &BlobKey) -> bool {
        self.objects.contains_key(key.as_str())
    }

    /// Whether the store currently holds no objects at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(
        &self,
        key: &BlobKey,
        mut data: ByteStream,
        _size_hint: Option<u64>,
    ) -> Result<u64, BlobError> {
        let mut buf = BytesMut::new();
        while let Some(chunk) = data.next().await {
            buf.extend_from_slice(&chunk?);
        }
        let size = buf.len() as u64;
        self.objects.insert(key.as_str().to_owned(), buf.freeze());
        Ok(size)
    }

    async fn get(&self, key: &BlobKey) -> Result<Option<BlobObject>, BlobError> {
        let Some(bytes) = self.objects.get(key.as_str()).map(|b| b.clone()) else {
            return Ok(None);
        };
        let size = Some(bytes.len() as u64);
        let stream: ByteStream = Box::pin(futures::stream::once(async move { Ok(bytes) }));
        Ok(Some(BlobObject { size, stream }))
    }

    async fn delete(&self, key: &BlobKey) -> Result<(), BlobError> {
        self.objects.remove(key.as_str());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use vanish_blob::testing::{collect, run_blob_conformance_tests, stream_of};

    use super::*;

    #[tokio::test]
    async fn conformance() {
        let store = MemoryBlobStore::new();
        run_blob_conformance_tests(&store)
            .await
            .expect("conformance tests should pass");
    }

    #[tokio::test]
    async fn open_reader_survives_deletion() {
        let store = MemoryBlobStore::new();
        let key = BlobKey::new("files/survives");
        store
            .put(&key, stream_of(vec![b"payload".to_vec()]), None)
            .await
            .unwrap();

        let object = store.get(&key).await.unwrap().unwrap();
        store.delete(&key).await.unwrap();
        assert!(!store.contains(&key));

        // The stream handed out before the delete still serves its bytes.
        let body = collect(object.stream).await.unwrap();
        assert_eq!(body, b"payload");
    }
}
