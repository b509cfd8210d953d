use std::io;
use std::pin::Pin;

use bytes::Bytes;
use futures::Stream;

/// A boxed stream of object bytes.
///
/// Both directions of the store speak this type so that objects of any size
/// move through without ever being buffered whole.
pub type ByteStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

/// Locator of one stored object within the blob store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobKey(String);

impl BlobKey {
    /// Create a key from its string form.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BlobKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A readable object handed back by [`BlobStore::get`].
///
/// [`BlobStore::get`]: crate::store::BlobStore::get
pub struct BlobObject {
    /// Object length in bytes, when the backend reports one.
    pub size: Option<u64>,
    /// The object's bytes.
    pub stream: ByteStream,
}

impl std::fmt::Debug for BlobObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobObject")
            .field("size", &self.size)
            .field("stream", &"<ByteStream>")
            .finish()
    }
}
