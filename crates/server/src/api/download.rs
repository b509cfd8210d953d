use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::Response;

use crate::error::ServerError;

use super::AppState;
use super::schemas::ErrorResponse;

/// `GET /download/{id}` -- redeem a reference id for its bytes.
///
/// Streams the blob with a `Content-Disposition` attachment carrying the
/// sanitized filename and the store-confirmed `Content-Length`. The body is
/// back-pressured by the client's read rate; the gateway purges an
/// exhausted share once the stream closes, whether it completed or not.
#[utoipa::path(
    get,
    path = "/download/{id}",
    tag = "Shares",
    summary = "Download a blob",
    description = "Streams the stored bytes for a reference id while its TTL and download limit allow.",
    params(
        ("id" = String, Path, description = "Reference id returned by the upload")
    ),
    responses(
        (status = 200, description = "Blob bytes", content_type = "application/octet-stream"),
        (status = 400, description = "Malformed reference id", body = ErrorResponse),
        (status = 403, description = "Download limit exceeded", body = ErrorResponse),
        (status = 404, description = "Unknown or expired reference", body = ErrorResponse),
        (status = 500, description = "Internal inconsistency", body = ErrorResponse),
        (status = 503, description = "A backing store is unavailable", body = ErrorResponse)
    )
)]
pub async fn download(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ServerError> {
    let download = state.gateway.download(&id).await?;

    // The filename was sanitized at upload time, so it is header-safe here.
    let disposition = format!("attachment; filename=\"{}\"", download.filename);
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::CONTENT_DISPOSITION, disposition)
        .header(header::CONTENT_LENGTH, download.size)
        .body(Body::from_stream(download.stream))
        .map_err(|e| ServerError::Config(format!("failed to build response: {e}")))
}
