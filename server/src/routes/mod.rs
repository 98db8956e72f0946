//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds the audio proxy endpoints under a single Axum router. The short
//! paths (`/audio`, `/details`) are the primary API; the `/api/youtube-*`
//! paths serve the same handlers for clients built against the older URLs.

pub mod media;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/audio", get(media::audio))
        .route("/details", get(media::details))
        .route("/api/youtube-audio", get(media::audio))
        .route("/api/youtube-details", get(media::details))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
