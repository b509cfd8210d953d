use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Response for a successful upload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    /// Reference id redeemable for downloads.
    pub file_id: String,
    /// Byte count confirmed by the blob store.
    pub size: u64,
    /// Echo of the requested lifetime in hours (`0` = server default).
    pub ttl_hours: u32,
    /// Echo of the requested download limit (`0` = unlimited).
    pub download_limit: u32,
    /// The sanitized filename downloads will carry.
    pub filename: String,
    /// Human-readable confirmation.
    pub message: String,
}

/// Response for `GET /health`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always `"ok"` when the server is up.
    pub status: String,
    /// Server crate version.
    pub version: String,
}

/// JSON error body returned by all failing routes.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// What went wrong, classified for the caller.
    pub error: String,
}
