//! Conformance test suite shared by blob store backends.

use bytes::Bytes;
use futures::StreamExt;

use crate::error::BlobError;
use crate::store::BlobStore;
use crate::types::{BlobKey, ByteStream};

/// Build a [`ByteStream`] delivering the given chunks in order.
#[must_use]
pub fn stream_of(chunks: Vec<Vec<u8>>) -> ByteStream {
    Box::pin(futures::stream::iter(
        chunks.into_iter().map(|c| Ok(Bytes::from(c))),
    ))
}

/// Drain a [`ByteStream`] into a single buffer.
///
/// # Errors
///
/// Returns the first read error the stream yields.
pub async fn collect(mut stream: ByteStream) -> std::io::Result<Vec<u8>> {
    let mut out = Vec::new();
    while let Some(chunk) = stream.next().await {
        out.extend_from_slice(&chunk?);
    }
    Ok(out)
}

/// Run the full blob store conformance test suite.
///
/// Call this from your backend's test module with a fresh store instance.
///
/// # Errors
///
/// Returns an error if any conformance test fails.
pub async fn run_blob_conformance_tests(store: &dyn BlobStore) -> Result<(), BlobError> {
    test_get_missing(store).await?;
    test_put_then_get_round_trips(store).await?;
    test_put_reports_stored_size(store).await?;
    test_put_overwrites(store).await?;
    test_delete(store).await?;
    test_delete_missing_is_ok(store).await?;
    Ok(())
}

async fn test_get_missing(store: &dyn BlobStore) -> Result<(), BlobError> {
    let key = BlobKey::new("conformance/missing");
    let found = store.get(&key).await?;
    assert!(found.is_none(), "get on a missing key should return None");
    Ok(())
}

async fn test_put_then_get_round_trips(store: &dyn BlobStore) -> Result<(), BlobError> {
    let key = BlobKey::new("conformance/round-trip");
    let chunks = vec![b"hello ".to_vec(), b"blob ".to_vec(), b"world".to_vec()];
    let expected: Vec<u8> = chunks.concat();

    store.put(&key, stream_of(chunks), None).await?;

    let object = store
        .get(&key)
        .await?
        .expect("object should exist after put");
    let body = collect(object.stream).await?;
    assert_eq!(body, expected, "downloaded bytes must match uploaded bytes");
    if let Some(size) = object.size {
        assert_eq!(size, expected.len() as u64);
    }
    Ok(())
}

async fn test_put_reports_stored_size(store: &dyn BlobStore) -> Result<(), BlobError> {
    let key = BlobKey::new("conformance/size");
    let data = vec![0xABu8; 1024];

    // A wrong size hint must not distort the confirmed size.
    let confirmed = store
        .put(&key, stream_of(vec![data.clone()]), Some(7))
        .await?;
    assert_eq!(confirmed, data.len() as u64);
    Ok(())
}

async fn test_put_overwrites(store: &dyn BlobStore) -> Result<(), BlobError> {
    let key = BlobKey::new("conformance/overwrite");
    store.put(&key, stream_of(vec![b"first".to_vec()]), None).await?;
    store.put(&key, stream_of(vec![b"second".to_vec()]), None).await?;

    let object = store.get(&key).await?.expect("object should exist");
    let body = collect(object.stream).await?;
    assert_eq!(body, b"second");
    Ok(())
}

async fn test_delete(store: &dyn BlobStore) -> Result<(), BlobError> {
    let key = BlobKey::new("conformance/delete");
    store.put(&key, stream_of(vec![b"bytes".to_vec()]), None).await?;

    store.delete(&key).await?;
    let found = store.get(&key).await?;
    assert!(found.is_none(), "deleted object should be unreachable");
    Ok(())
}

async fn test_delete_missing_is_ok(store: &dyn BlobStore) -> Result<(), BlobError> {
    let key = BlobKey::new("conformance/delete-missing");
    store.delete(&key).await?;
    Ok(())
}
