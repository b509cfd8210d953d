use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use vanish_gateway::ShareError;

/// Errors that can occur when running the vanish server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O error (e.g. binding the listener).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The request body was malformed or missing a required field.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// A share lifecycle error surfaced through the API.
    #[error(transparent)]
    Share(#[from] ShareError),
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Config(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Share(share) => match share {
                ShareError::InvalidReference | ShareError::InvalidRequest { .. } => {
                    StatusCode::BAD_REQUEST
                }
                ShareError::NotFound => StatusCode::NOT_FOUND,
                ShareError::LimitExceeded => StatusCode::FORBIDDEN,
                ShareError::Transient(_) => StatusCode::SERVICE_UNAVAILABLE,
                ShareError::Inconsistent(_) | ShareError::Configuration(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Internal detail stays in the logs; the body carries only the
        // classification the caller can act on.
        let message = match &self {
            Self::Share(ShareError::Transient(_)) => "temporarily unavailable".to_owned(),
            Self::Share(ShareError::Inconsistent(_)) => "internal error".to_owned(),
            other => other.to_string(),
        };
        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}
