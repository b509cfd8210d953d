//! In-memory metadata store backend.
//!
//! Backs tests and single-process development runs with a [`DashMap`];
//! production deployments use the Redis backend. TTL handling matches the
//! real store's observable behavior: entries are lazily evicted on access
//! once their deadline passes.
//!
//! [`DashMap`]: dashmap::DashMap

mod store;

pub use store::MemoryMetaStore;
