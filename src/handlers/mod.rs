pub mod redirect;
pub mod shorten;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::ShortenError;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// JSON error body with the given status.
pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

impl ShortenError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ShortenError::MissingInput { .. } => StatusCode::BAD_REQUEST,
            ShortenError::NotFound { .. } => StatusCode::NOT_FOUND,
            ShortenError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            ShortenError::Cancelled
            | ShortenError::CodeSpaceExhausted { .. }
            | ShortenError::StoreClosed => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ShortenError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Store request failed: {}", self);
        }
        error_response(status, self.to_string())
    }
}
