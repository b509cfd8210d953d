use axum::Json;
use axum::extract::multipart::{Field, Multipart};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tokio_stream::wrappers::ReceiverStream;

use vanish_blob::ByteStream;
use vanish_gateway::UploadRequest;

use crate::error::ServerError;

use super::AppState;
use super::schemas::{ErrorResponse, UploadResponse};

/// `POST /upload` -- store a blob and hand back its reference id.
///
/// Multipart form fields: `ttl` (hours, optional), `download_limit`
/// (optional), `filename` (falls back to the file part's own filename),
/// and `file`. The body is read in a single pass and the file part is
/// streamed straight through to the blob store, so the scalar fields must
/// precede `file`.
#[utoipa::path(
    post,
    path = "/upload",
    tag = "Shares",
    summary = "Upload a blob",
    description = "Stores an opaque blob and returns a short-lived, access-limited reference id. Scalar fields must precede the file field.",
    request_body(content_type = "multipart/form-data", description = "Fields: ttl, download_limit, filename, file"),
    responses(
        (status = 200, description = "Blob stored", body = UploadResponse),
        (status = 400, description = "Invalid parameter or missing field", body = ErrorResponse),
        (status = 503, description = "A backing store is unavailable", body = ErrorResponse)
    )
)]
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ServerError> {
    let mut ttl_hours = 0u32;
    let mut download_limit = 0u32;
    let mut filename: Option<String> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        match field.name() {
            Some("ttl") => ttl_hours = parse_field(field, "ttl").await?,
            Some("download_limit") => {
                download_limit = parse_field(field, "download_limit").await?;
            }
            Some("filename") => {
                filename = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ServerError::BadRequest(format!("invalid filename: {e}")))?,
                );
            }
            Some("file") => {
                let filename = filename
                    .or_else(|| field.file_name().map(ToOwned::to_owned))
                    .ok_or_else(|| ServerError::BadRequest("filename is required".into()))?;

                // Pump the field into a channel so the gateway sees an owned
                // stream while this pass keeps draining the body.
                let (tx, rx) = tokio::sync::mpsc::channel::<std::io::Result<bytes::Bytes>>(16);
                let data: ByteStream = Box::pin(ReceiverStream::new(rx));

                let request = UploadRequest {
                    data,
                    declared_size: None,
                    filename,
                    ttl_hours,
                    download_limit,
                };
                let (receipt, ()) =
                    tokio::join!(state.gateway.upload(request), pump_field(&mut field, tx));
                let receipt = receipt?;

                return Ok((
                    StatusCode::OK,
                    Json(UploadResponse {
                        file_id: receipt.id.to_string(),
                        size: receipt.size,
                        ttl_hours: receipt.ttl_hours,
                        download_limit: receipt.download_limit,
                        filename: receipt.filename,
                        message: "file uploaded successfully".into(),
                    }),
                ));
            }
            _ => {}
        }
    }

    Err(ServerError::BadRequest("file is required".into()))
}

/// Forward one multipart field chunk-by-chunk into `tx`. A body read error
/// is forwarded as the stream's final item so the blob write fails cleanly.
async fn pump_field(field: &mut Field<'_>, tx: tokio::sync::mpsc::Sender<std::io::Result<bytes::Bytes>>) {
    loop {
        match field.chunk().await {
            Ok(Some(chunk)) => {
                if tx.send(Ok(chunk)).await.is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                let _ = tx.send(Err(std::io::Error::other(e))).await;
                break;
            }
        }
    }
}

async fn parse_field(field: Field<'_>, name: &'static str) -> Result<u32, ServerError> {
    let text = field
        .text()
        .await
        .map_err(|e| ServerError::BadRequest(format!("invalid {name}: {e}")))?;
    if text.is_empty() {
        return Ok(0);
    }
    text.parse()
        .map_err(|_| ServerError::BadRequest(format!("invalid {name}")))
}
