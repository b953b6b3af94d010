use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use super::error_response;
use crate::{scope::RequestScope, AppState};

#[derive(Deserialize)]
pub struct ShortenRequest {
    #[serde(default)]
    url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub code: String,
    pub short_url: String,
}

/// POST /shorten
///
/// Body: `{"url": "..."}`. The URL is stored as given, provided it can be
/// sent back as a `Location` header.
pub async fn shorten(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ShortenRequest>,
) -> Response {
    if !body.url.is_empty() && HeaderValue::from_str(&body.url).is_err() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "url contains characters not allowed in a redirect",
        );
    }

    let scope = RequestScope::with_timeout(state.config.request_timeout);
    let code = match state.shortener.shorten(&body.url, &scope).await {
        Ok(code) => code,
        Err(e) => return e.into_response(),
    };

    tracing::info!("Shortened {} -> {}", body.url, code);
    (
        StatusCode::CREATED,
        Json(ShortenResponse {
            short_url: format!("{}/{}", state.config.base_url, code),
            code,
        }),
    )
        .into_response()
}
