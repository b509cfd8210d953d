use super::schemas::{ErrorResponse, HealthResponse, UploadResponse};

#[derive(utoipa::OpenApi)]
#[openapi(
    info(
        title = "Vanish API",
        version = "0.1.0",
        description = "HTTP API for the vanish ephemeral file sharing service. Upload an opaque blob, hand out its reference id, and let it vanish after the permitted downloads or TTL.",
        license(name = "Apache-2.0")
    ),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Shares", description = "Upload and redeem ephemeral shares")
    ),
    paths(
        super::health::health,
        super::upload::upload,
        super::download::download,
    ),
    components(schemas(HealthResponse, UploadResponse, ErrorResponse))
)]
pub struct ApiDoc;
