use thiserror::Error;

/// Errors surfaced by share gateway operations.
///
/// The taxonomy maps directly onto caller-facing classifications: variants
/// up to [`LimitExceeded`] are the caller's fault and carry no retry advice;
/// [`Transient`] is retry-safe because no partial state stays visible;
/// [`Inconsistent`] means a prior invariant violation and asks for
/// operational attention, not caller action.
///
/// [`LimitExceeded`]: ShareError::LimitExceeded
/// [`Transient`]: ShareError::Transient
/// [`Inconsistent`]: ShareError::Inconsistent
#[derive(Debug, Error)]
pub enum ShareError {
    /// The reference id is not a well-formed version-4 identifier.
    #[error("malformed reference id")]
    InvalidReference,

    /// An upload parameter failed validation.
    #[error("invalid {field}: {reason}")]
    InvalidRequest {
        /// Which parameter was rejected.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// The share does not exist. Absent, expired, and unreadable records
    /// all answer identically.
    #[error("share not found")]
    NotFound,

    /// The remaining-download counter is exhausted.
    #[error("download limit exceeded")]
    LimitExceeded,

    /// A store was unreachable or a write failed, with no partial state
    /// left visible. Safe to retry.
    #[error("transient infrastructure error: {0}")]
    Transient(String),

    /// The blob is missing despite live metadata. Logged loudly at the
    /// point of detection.
    #[error("internal inconsistency: {0}")]
    Inconsistent(String),

    /// The gateway was misconfigured (e.g. missing required components).
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<vanish_state::StateError> for ShareError {
    fn from(err: vanish_state::StateError) -> Self {
        Self::Transient(err.to_string())
    }
}

impl From<vanish_blob::BlobError> for ShareError {
    fn from(err: vanish_blob::BlobError) -> Self {
        Self::Transient(err.to_string())
    }
}
