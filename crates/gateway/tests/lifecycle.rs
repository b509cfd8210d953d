//! End-to-end lifecycle tests for the share gateway against in-memory
//! store fakes.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use vanish_blob::testing::{collect, stream_of};
use vanish_blob::{BlobKey, BlobStore};
use vanish_blob_memory::MemoryBlobStore;
use vanish_core::ReferenceId;
use vanish_gateway::{ShareError, ShareGateway, SharePolicy, UploadRequest};
use vanish_state::{KeyKind, MetaKey, MetaStore, StateError};
use vanish_state_memory::MemoryMetaStore;

fn gateway_with(
    meta: Arc<dyn MetaStore>,
    blobs: Arc<dyn BlobStore>,
    policy: SharePolicy,
) -> ShareGateway {
    ShareGateway::builder()
        .meta_store(meta)
        .blob_store(blobs)
        .policy(policy)
        .build()
        .expect("both stores are supplied")
}

fn fixture() -> (ShareGateway, Arc<MemoryMetaStore>, Arc<MemoryBlobStore>) {
    let meta = Arc::new(MemoryMetaStore::new());
    let blobs = Arc::new(MemoryBlobStore::new());
    let gateway = gateway_with(
        Arc::clone(&meta) as Arc<dyn MetaStore>,
        Arc::clone(&blobs) as Arc<dyn BlobStore>,
        SharePolicy::default(),
    );
    (gateway, meta, blobs)
}

fn request(content: &[u8], filename: &str, ttl_hours: u32, download_limit: u32) -> UploadRequest {
    UploadRequest {
        data: stream_of(vec![content.to_vec()]),
        declared_size: Some(content.len() as u64),
        filename: filename.to_owned(),
        ttl_hours,
        download_limit,
    }
}

/// Poll `condition` until it holds or roughly a second has passed. Cleanup
/// is fire-and-forget, so tests give it a bounded window to land.
async fn eventually(condition: impl Fn() -> bool) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

#[tokio::test]
async fn upload_then_download_round_trips_bytes() {
    let (gateway, _, _) = fixture();
    let content = b"opaque ciphertext bytes".to_vec();

    let receipt = gateway
        .upload(request(&content, "secret.bin", 1, 5))
        .await
        .unwrap();
    assert_eq!(receipt.size, content.len() as u64);
    assert_eq!(receipt.filename, "secret.bin");

    let download = gateway.download(&receipt.id.to_string()).await.unwrap();
    assert_eq!(download.filename, "secret.bin");
    assert_eq!(download.size, content.len() as u64);
    assert_eq!(collect(download.stream).await.unwrap(), content);
}

#[tokio::test]
async fn confirmed_size_wins_over_declared_size() {
    let (gateway, _, _) = fixture();
    let upload = UploadRequest {
        data: stream_of(vec![b"four".to_vec()]),
        declared_size: Some(9999),
        filename: "f.bin".into(),
        ttl_hours: 0,
        download_limit: 0,
    };
    let receipt = gateway.upload(upload).await.unwrap();
    assert_eq!(receipt.size, 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_gated_downloads_never_overserve() {
    let (gateway, _, _) = fixture();
    let limit = 3u32;
    let receipt = gateway
        .upload(request(b"contended", "c.bin", 1, limit))
        .await
        .unwrap();

    let gateway = Arc::new(gateway);
    let mut handles = Vec::new();
    for _ in 0..8 {
        let gateway = Arc::clone(&gateway);
        let id = receipt.id.to_string();
        handles.push(tokio::spawn(async move { gateway.download(&id).await }));
    }

    // Join every request before consuming any stream: cleanup only fires
    // once a granted stream drops, so all gating decisions land first.
    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap());
    }

    let mut served = 0;
    let mut refused = 0;
    for result in results {
        match result {
            Ok(download) => {
                assert_eq!(collect(download.stream).await.unwrap(), b"contended");
                served += 1;
            }
            Err(ShareError::LimitExceeded) => refused += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(served, limit, "exactly the permitted count is served");
    assert_eq!(refused, 8 - limit);
}

#[tokio::test]
async fn exhausted_share_is_purged_from_both_stores() {
    let (gateway, meta, blobs) = fixture();
    let receipt = gateway
        .upload(request(b"last copy", "once.bin", 1, 1))
        .await
        .unwrap();
    let blob_key = BlobKey::new(receipt.id.blob_key());

    let download = gateway.download(&receipt.id.to_string()).await.unwrap();
    assert_eq!(collect(download.stream).await.unwrap(), b"last copy");

    assert!(
        eventually(|| meta.is_empty() && !blobs.contains(&blob_key)).await,
        "cleanup should purge metadata, counter, and blob"
    );
    assert!(matches!(
        gateway.download(&receipt.id.to_string()).await,
        Err(ShareError::NotFound)
    ));
}

#[tokio::test]
async fn dropping_the_stream_unread_still_cleans_up() {
    let (gateway, meta, blobs) = fixture();
    let receipt = gateway
        .upload(request(b"never read", "drop.bin", 1, 1))
        .await
        .unwrap();

    let download = gateway.download(&receipt.id.to_string()).await.unwrap();
    // Client disconnects before reading a single byte.
    drop(download);

    assert!(
        eventually(|| meta.is_empty() && blobs.is_empty()).await,
        "a granted-but-abandoned last download still triggers cleanup"
    );
}

#[tokio::test]
async fn unlimited_share_serves_repeatedly() {
    let (gateway, _, _) = fixture();
    let receipt = gateway
        .upload(request(b"evergreen", "many.bin", 1, 0))
        .await
        .unwrap();

    for _ in 0..4 {
        let download = gateway.download(&receipt.id.to_string()).await.unwrap();
        assert_eq!(collect(download.stream).await.unwrap(), b"evergreen");
    }
}

#[tokio::test]
async fn single_use_share_scenario() {
    let (gateway, meta, _) = fixture();
    let receipt = gateway.upload(request(b"hi", "a.txt", 0, 1)).await.unwrap();
    assert_eq!(receipt.size, 2);

    let download = gateway.download(&receipt.id.to_string()).await.unwrap();
    assert_eq!(download.filename, "a.txt");
    assert_eq!(collect(download.stream).await.unwrap(), b"hi");

    assert!(eventually(|| meta.is_empty()).await);
    assert!(matches!(
        gateway.download(&receipt.id.to_string()).await,
        Err(ShareError::NotFound)
    ));
}

#[tokio::test]
async fn refused_requests_do_not_roll_back_the_counter() {
    let (gateway, _, _) = fixture();
    let receipt = gateway
        .upload(request(b"single", "one.bin", 1, 1))
        .await
        .unwrap();

    // Hold the granted stream open so cleanup has not fired yet.
    let granted = gateway.download(&receipt.id.to_string()).await.unwrap();

    for _ in 0..3 {
        match gateway.download(&receipt.id.to_string()).await {
            Err(ShareError::LimitExceeded | ShareError::NotFound) => {}
            other => panic!("expected refusal, got {other:?}"),
        }
    }

    assert_eq!(collect(granted.stream).await.unwrap(), b"single");
}

#[tokio::test(start_paused = true)]
async fn zero_ttl_expires_on_the_policy_default_horizon() {
    let meta = Arc::new(MemoryMetaStore::new());
    let blobs = Arc::new(MemoryBlobStore::new());
    let policy = SharePolicy {
        default_ttl_hours: 1,
        ..SharePolicy::default()
    };
    let gateway = gateway_with(
        Arc::clone(&meta) as Arc<dyn MetaStore>,
        blobs as Arc<dyn BlobStore>,
        policy,
    );

    let receipt = gateway
        .upload(request(b"short-lived", "ttl.bin", 0, 0))
        .await
        .unwrap();

    tokio::time::advance(Duration::from_secs(2 * 3600)).await;

    assert!(matches!(
        gateway.download(&receipt.id.to_string()).await,
        Err(ShareError::NotFound)
    ));
}

#[tokio::test]
async fn rejects_parameters_outside_policy_bounds() {
    let (gateway, _, _) = fixture();

    let err = gateway
        .upload(request(b"x", "a.txt", SharePolicy::default().max_ttl_hours + 1, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, ShareError::InvalidRequest { field: "ttl", .. }));

    let err = gateway
        .upload(request(b"x", "a.txt", 0, SharePolicy::default().max_download_limit + 1))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ShareError::InvalidRequest {
            field: "download_limit",
            ..
        }
    ));

    let err = gateway.upload(request(b"x", "///", 0, 0)).await.unwrap_err();
    assert!(matches!(
        err,
        ShareError::InvalidRequest {
            field: "filename",
            ..
        }
    ));
}

#[tokio::test]
async fn filename_is_sanitized_before_storage() {
    let (gateway, _, _) = fixture();
    let receipt = gateway
        .upload(request(b"x", "../../etc/report\"v1\".pdf", 1, 0))
        .await
        .unwrap();
    assert_eq!(receipt.filename, "report_v1_.pdf");

    let download = gateway.download(&receipt.id.to_string()).await.unwrap();
    assert_eq!(download.filename, "report_v1_.pdf");
}

#[tokio::test]
async fn corrupt_record_reads_as_not_found() {
    let (gateway, meta, _) = fixture();
    let id = ReferenceId::generate();
    meta.set(&MetaKey::meta(id.to_string()), "not json at all", None)
        .await
        .unwrap();

    assert!(matches!(
        gateway.download(&id.to_string()).await,
        Err(ShareError::NotFound)
    ));
}

#[tokio::test]
async fn missing_blob_with_live_metadata_is_an_internal_error() {
    let (gateway, _, blobs) = fixture();
    let receipt = gateway
        .upload(request(b"gone", "gone.bin", 1, 0))
        .await
        .unwrap();

    blobs
        .delete(&BlobKey::new(receipt.id.blob_key()))
        .await
        .unwrap();

    assert!(matches!(
        gateway.download(&receipt.id.to_string()).await,
        Err(ShareError::Inconsistent(_))
    ));
}

// ---------------------------------------------------------------------------
// Store access accounting
// ---------------------------------------------------------------------------

struct CountingMetaStore {
    inner: MemoryMetaStore,
    calls: AtomicUsize,
}

impl CountingMetaStore {
    fn new() -> Self {
        Self {
            inner: MemoryMetaStore::new(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl MetaStore for CountingMetaStore {
    async fn set(
        &self,
        key: &MetaKey,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), StateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value, ttl).await
    }

    async fn get(&self, key: &MetaKey) -> Result<Option<String>, StateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key).await
    }

    async fn exists(&self, key: &MetaKey) -> Result<bool, StateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.exists(key).await
    }

    async fn delete(&self, keys: &[MetaKey]) -> Result<u64, StateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(keys).await
    }

    async fn decrement(&self, key: &MetaKey) -> Result<i64, StateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.decrement(key).await
    }
}

#[tokio::test]
async fn malformed_id_is_rejected_without_store_access() {
    let meta = Arc::new(CountingMetaStore::new());
    let blobs = Arc::new(MemoryBlobStore::new());
    let gateway = gateway_with(
        Arc::clone(&meta) as Arc<dyn MetaStore>,
        blobs as Arc<dyn BlobStore>,
        SharePolicy::default(),
    );

    for bad in ["", "not-a-uuid", "c232ab00-9414-11ec-b3c8-9f6bdeced846"] {
        assert!(matches!(
            gateway.download(bad).await,
            Err(ShareError::InvalidReference)
        ));
    }

    assert_eq!(
        meta.calls.load(Ordering::SeqCst),
        0,
        "validation must precede any store access"
    );
}

// ---------------------------------------------------------------------------
// Write failure compensation
// ---------------------------------------------------------------------------

/// Fails every `set` for one key kind; everything else delegates.
struct FailingSetStore {
    inner: MemoryMetaStore,
    fail_kind: KeyKind,
}

impl FailingSetStore {
    fn new(fail_kind: KeyKind) -> Self {
        Self {
            inner: MemoryMetaStore::new(),
            fail_kind,
        }
    }
}

#[async_trait]
impl MetaStore for FailingSetStore {
    async fn set(
        &self,
        key: &MetaKey,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), StateError> {
        if key.kind == self.fail_kind {
            return Err(StateError::Backend("injected write failure".into()));
        }
        self.inner.set(key, value, ttl).await
    }

    async fn get(&self, key: &MetaKey) -> Result<Option<String>, StateError> {
        self.inner.get(key).await
    }

    async fn exists(&self, key: &MetaKey) -> Result<bool, StateError> {
        self.inner.exists(key).await
    }

    async fn delete(&self, keys: &[MetaKey]) -> Result<u64, StateError> {
        self.inner.delete(keys).await
    }

    async fn decrement(&self, key: &MetaKey) -> Result<i64, StateError> {
        self.inner.decrement(key).await
    }
}

#[tokio::test]
async fn metadata_write_failure_deletes_the_blob() {
    let meta = Arc::new(FailingSetStore::new(KeyKind::Meta));
    let blobs = Arc::new(MemoryBlobStore::new());
    let gateway = gateway_with(
        Arc::clone(&meta) as Arc<dyn MetaStore>,
        Arc::clone(&blobs) as Arc<dyn BlobStore>,
        SharePolicy::default(),
    );

    let err = gateway
        .upload(request(b"doomed", "d.bin", 1, 2))
        .await
        .unwrap_err();
    assert!(matches!(err, ShareError::Transient(_)));
    assert!(
        blobs.is_empty(),
        "the blob written before the failed metadata write must be compensated"
    );
    assert!(meta.inner.is_empty());
}

#[tokio::test]
async fn counter_write_failure_deletes_record_and_blob() {
    let meta = Arc::new(FailingSetStore::new(KeyKind::Limit));
    let blobs = Arc::new(MemoryBlobStore::new());
    let gateway = gateway_with(
        Arc::clone(&meta) as Arc<dyn MetaStore>,
        Arc::clone(&blobs) as Arc<dyn BlobStore>,
        SharePolicy::default(),
    );

    let err = gateway
        .upload(request(b"doomed", "d.bin", 1, 2))
        .await
        .unwrap_err();
    assert!(matches!(err, ShareError::Transient(_)));
    assert!(blobs.is_empty(), "blob compensated in reverse order");
    assert!(meta.inner.is_empty(), "record compensated in reverse order");
}

#[tokio::test]
async fn blob_write_failure_is_terminal_and_transient() {
    struct BrokenBlobStore;

    #[async_trait]
    impl BlobStore for BrokenBlobStore {
        async fn put(
            &self,
            _key: &BlobKey,
            _data: vanish_blob::ByteStream,
            _size_hint: Option<u64>,
        ) -> Result<u64, vanish_blob::BlobError> {
            Err(vanish_blob::BlobError::Connection("injected outage".into()))
        }

        async fn get(
            &self,
            _key: &BlobKey,
        ) -> Result<Option<vanish_blob::BlobObject>, vanish_blob::BlobError> {
            Ok(None)
        }

        async fn delete(&self, _key: &BlobKey) -> Result<(), vanish_blob::BlobError> {
            Ok(())
        }
    }

    let meta = Arc::new(MemoryMetaStore::new());
    let gateway = gateway_with(
        Arc::clone(&meta) as Arc<dyn MetaStore>,
        Arc::new(BrokenBlobStore) as Arc<dyn BlobStore>,
        SharePolicy::default(),
    );

    let err = gateway
        .upload(request(b"lost", "l.bin", 1, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, ShareError::Transient(_)));
    assert!(meta.is_empty(), "no metadata may exist without a blob");
}
