use thiserror::Error;

/// Errors from blob store operations.
#[derive(Debug, Error)]
pub enum BlobError {
    /// The backend could not be reached.
    #[error("blob connection error: {0}")]
    Connection(String),

    /// The backend accepted the request but failed to serve it.
    #[error("blob storage error: {0}")]
    Storage(String),

    /// Reading or writing the byte stream failed.
    #[error("blob io error: {0}")]
    Io(#[from] std::io::Error),
}
