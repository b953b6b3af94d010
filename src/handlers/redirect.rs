use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use super::error_response;
use crate::{scope::RequestScope, AppState};

/// GET /:code
///
/// Resolve the code through the mapping store and redirect (303) to the
/// original URL. Unknown codes get a 404.
pub async fn redirect(State(state): State<Arc<AppState>>, Path(code): Path<String>) -> Response {
    let scope = RequestScope::with_timeout(state.config.request_timeout);

    let original_url = match state.shortener.resolve(&code, &scope).await {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!("Resolving '{}' failed: {}", code, e);
            return e.into_response();
        }
    };

    // Entries can be preloaded without going through POST /shorten.
    match HeaderValue::from_str(&original_url) {
        Ok(location) => (StatusCode::SEE_OTHER, [(header::LOCATION, location)]).into_response(),
        Err(_) => {
            tracing::error!("Stored URL for '{}' is not a valid Location header", code);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "stored URL cannot be used as a redirect target",
            )
        }
    }
}
