//! In-memory blob store backend.
//!
//! A [`DashMap`]-backed implementation of the [`BlobStore`] trait from
//! `vanish-blob`, used to substitute the real object store in tests.
//!
//! [`DashMap`]: dashmap::DashMap
//! [`BlobStore`]: vanish_blob::BlobStore

mod store;

pub use store::MemoryBlobStore;
