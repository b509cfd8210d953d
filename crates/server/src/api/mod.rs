pub mod download;
pub mod health;
pub mod openapi;
pub mod schemas;
pub mod upload;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use vanish_gateway::ShareGateway;

use self::openapi::ApiDoc;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The share gateway instance.
    pub gateway: Arc<ShareGateway>,
    /// Largest accepted upload body, in bytes.
    pub max_upload_bytes: usize,
    /// Origins allowed to call the API.
    pub cors_origins: Vec<String>,
}

/// Build the Axum router with all API routes, middleware, and Swagger UI.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.cors_origins);
    let max_upload_bytes = state.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health))
        .route("/upload", post(upload::upload))
        .route("/download/{id}", get(download::download))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for browser clients: GET/POST only, and the download headers the
/// frontend needs to read (`Content-Disposition`, `Content-Length`) exposed.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([header::CONTENT_DISPOSITION, header::CONTENT_LENGTH])
}
