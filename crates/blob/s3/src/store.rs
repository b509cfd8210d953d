use async_trait::async_trait;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::primitives::ByteStream as SdkByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use bytes::BytesMut;
use futures::StreamExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

use vanish_blob::error::BlobError;
use vanish_blob::store::BlobStore;
use vanish_blob::types::{BlobKey, BlobObject, ByteStream};

use crate::config::S3Config;

/// One upload part. Objects at or below this go up in a single `PutObject`;
/// anything larger switches to a multipart upload, so the buffer held in
/// memory never exceeds one part regardless of object size.
const PART_SIZE: usize = 8 * 1024 * 1024;

/// S3-backed implementation of [`BlobStore`].
pub struct S3BlobStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    prefix: Option<String>,
}

impl std::fmt::Debug for S3BlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3BlobStore")
            .field("bucket", &self.bucket)
            .field("prefix", &self.prefix)
            .field("client", &"<S3Client>")
            .finish()
    }
}

impl S3BlobStore {
    /// Create a new `S3BlobStore` by building an AWS SDK client.
    ///
    /// Uses the standard SDK credential chain; the endpoint URL and
    /// path-style addressing overrides make the same code path work against
    /// MinIO and LocalStack.
    pub async fn new(config: &S3Config) -> Self {
        let mut loader =
            aws_config::from_env().region(aws_config::Region::new(config.region.clone()));
        if let Some(endpoint) = &config.endpoint_url {
            debug!(endpoint = %endpoint, "using custom S3 endpoint");
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if config.force_path_style {
            builder = builder.force_path_style(true);
        }
        let client = aws_sdk_s3::Client::from_conf(builder.build());

        Self {
            client,
            bucket: config.bucket.clone(),
            prefix: config.prefix.clone(),
        }
    }

    /// Create an `S3BlobStore` with a pre-built client (for testing).
    pub fn with_client(config: &S3Config, client: aws_sdk_s3::Client) -> Self {
        Self {
            client,
            bucket: config.bucket.clone(),
            prefix: config.prefix.clone(),
        }
    }

    /// Verify the bucket exists and is reachable.
    pub async fn check_bucket(&self) -> Result<(), BlobError> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| BlobError::Connection(format!("bucket {} unreachable: {e}", self.bucket)))?;
        Ok(())
    }

    /// Apply the configured prefix to a blob key.
    fn object_key(&self, key: &BlobKey) -> String {
        prefixed_key(self.prefix.as_deref(), key.as_str())
    }

    async fn put_single(&self, object_key: &str, body: BytesMut) -> Result<u64, BlobError> {
        let size = body.len() as u64;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(object_key)
            .content_length(i64::try_from(size).unwrap_or(i64::MAX))
            .body(SdkByteStream::from(body.freeze()))
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e.to_string()))?;
        Ok(size)
    }

    async fn put_multipart(
        &self,
        object_key: &str,
        buffered: BytesMut,
        rest: ByteStream,
    ) -> Result<u64, BlobError> {
        let created = self
            .client
            .create_multipart_upload()
            .bucket(&self.bucket)
            .key(object_key)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e.to_string()))?;
        let upload_id = created
            .upload_id()
            .ok_or_else(|| BlobError::Storage("multipart upload created without an id".into()))?
            .to_owned();

        match self
            .upload_parts(object_key, &upload_id, buffered, rest)
            .await
        {
            Ok(total) => Ok(total),
            Err(e) => {
                // Abandoned parts keep costing storage until aborted.
                if let Err(abort_err) = self
                    .client
                    .abort_multipart_upload()
                    .bucket(&self.bucket)
                    .key(object_key)
                    .upload_id(&upload_id)
                    .send()
                    .await
                {
                    warn!(
                        key = %object_key,
                        upload_id = %upload_id,
                        error = %abort_err,
                        "failed to abort multipart upload"
                    );
                }
                Err(e)
            }
        }
    }

    async fn upload_parts(
        &self,
        object_key: &str,
        upload_id: &str,
        buffered: BytesMut,
        mut rest: ByteStream,
    ) -> Result<u64, BlobError> {
        let mut buf = buffered;
        let mut total = 0u64;
        let mut part_number = 0i32;
        let mut completed = Vec::new();

        let mut drained = false;
        while !drained || !buf.is_empty() {
            // Refill until one full part is buffered or the stream ends.
            while buf.len() < PART_SIZE && !drained {
                match rest.next().await {
                    Some(chunk) => buf.extend_from_slice(&chunk?),
                    None => drained = true,
                }
            }

            // The stream can end exactly on a part boundary; an empty
            // trailing part would be rejected by the store.
            if buf.is_empty() {
                break;
            }
            let part = if buf.len() > PART_SIZE {
                buf.split_to(PART_SIZE).freeze()
            } else {
                std::mem::take(&mut buf).freeze()
            };

            part_number += 1;
            total += part.len() as u64;
            let uploaded = self
                .client
                .upload_part()
                .bucket(&self.bucket)
                .key(object_key)
                .upload_id(upload_id)
                .part_number(part_number)
                .body(SdkByteStream::from(part))
                .send()
                .await
                .map_err(|e| classify_sdk_error(&e.to_string()))?;
            completed.push(
                CompletedPart::builder()
                    .part_number(part_number)
                    .set_e_tag(uploaded.e_tag)
                    .build(),
            );
        }

        self.client
            .complete_multipart_upload()
            .bucket(&self.bucket)
            .key(object_key)
            .upload_id(upload_id)
            .multipart_upload(
                CompletedMultipartUpload::builder()
                    .set_parts(Some(completed))
                    .build(),
            )
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e.to_string()))?;

        Ok(total)
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(
        &self,
        key: &BlobKey,
        mut data: ByteStream,
        size_hint: Option<u64>,
    ) -> Result<u64, BlobError> {
        let object_key = self.object_key(key);

        // Buffer up to one part; if the stream ends inside it the object
        // goes up in a single request and multipart overhead is skipped.
        let capacity = size_hint
            .and_then(|s| usize::try_from(s).ok())
            .unwrap_or(0)
            .min(PART_SIZE);
        let mut head = BytesMut::with_capacity(capacity);
        loop {
            if head.len() > PART_SIZE {
                debug!(key = %object_key, "object exceeds one part, switching to multipart upload");
                return self.put_multipart(&object_key, head, data).await;
            }
            match data.next().await {
                Some(chunk) => head.extend_from_slice(&chunk?),
                None => break,
            }
        }

        self.put_single(&object_key, head).await
    }

    async fn get(&self, key: &BlobKey) -> Result<Option<BlobObject>, BlobError> {
        let object_key = self.object_key(key);
        match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .send()
            .await
        {
            Ok(output) => {
                let size = output.content_length().and_then(|l| u64::try_from(l).ok());
                let stream: ByteStream =
                    Box::pin(ReaderStream::new(output.body.into_async_read()));
                Ok(Some(BlobObject { size, stream }))
            }
            Err(SdkError::ServiceError(ctx)) if ctx.err().is_no_such_key() => Ok(None),
            Err(e) => Err(classify_sdk_error(&e.to_string())),
        }
    }

    async fn delete(&self, key: &BlobKey) -> Result<(), BlobError> {
        let object_key = self.object_key(key);
        // S3 delete is idempotent: deleting a missing key succeeds.
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e.to_string()))?;
        Ok(())
    }
}

/// Apply an optional prefix to an object key.
fn prefixed_key(prefix: Option<&str>, key: &str) -> String {
    match prefix {
        Some(prefix) => format!("{prefix}{key}"),
        None => key.to_owned(),
    }
}

/// Classify an SDK error string into connection vs. storage failure.
fn classify_sdk_error(error_str: &str) -> BlobError {
    let lower = error_str.to_lowercase();
    if lower.contains("connection")
        || lower.contains("connect")
        || lower.contains("dns")
        || lower.contains("timeout")
        || lower.contains("timed out")
    {
        BlobError::Connection(error_str.to_owned())
    } else {
        BlobError::Storage(error_str.to_owned())
    }
}
