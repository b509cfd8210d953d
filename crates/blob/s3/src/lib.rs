//! S3-compatible blob store backend.
//!
//! Provides the object-store implementation of the [`BlobStore`] trait from
//! `vanish-blob` on top of `aws-sdk-s3`. Works against AWS S3 proper as well
//! as MinIO or LocalStack via an endpoint URL override with path-style
//! addressing.
//!
//! Uploads stream through a bounded buffer: objects up to one part go up in
//! a single `PutObject`, anything larger switches to a multipart upload.
//! Downloads adapt the SDK body into the crate-wide byte stream without
//! collecting it.
//!
//! [`BlobStore`]: vanish_blob::BlobStore

mod config;
mod store;

pub use config::S3Config;
pub use store::S3BlobStore;
