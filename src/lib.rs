//! In-memory URL shortener built around a single store actor.
//!
//! The actor in [`store`] is the only code that touches the code -> URL
//! table; [`Shortener`] handles talk to it by message passing, and the
//! [`handlers`] expose that over HTTP.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub mod code;
pub mod config;
pub mod error;
pub mod handlers;
pub mod scope;
pub mod shortener;
pub mod store;

pub use config::AppConfig;
pub use error::ShortenError;
pub use scope::RequestScope;
pub use shortener::Shortener;
pub use store::{CollisionPolicy, MappingStore, StoreConfig};

// ── Shared application state ───────────────────────────────────────────────

pub struct AppState {
    pub config: AppConfig,
    pub shortener: Shortener,
}

// ── Router ─────────────────────────────────────────────────────────────────

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(|| async { StatusCode::OK }))
        .route("/shorten", post(handlers::shorten::shorten))
        // Short-code redirect — must come LAST so the fixed paths take priority
        .route("/:code", get(handlers::redirect::redirect))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
