//! Audio proxy handlers.
//!
//! Both handlers take the video id from `?id=`. A missing or blank id is a
//! 400 before the video source is consulted. Upstream failures are logged
//! with their cause and answered with a fixed generic message.

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;

use crate::media::MediaError;
use crate::state::AppState;

pub const MISSING_ID: &str = "Missing video ID";
pub const AUDIO_FAILED: &str = "Error streaming audio";
pub const DETAILS_FAILED: &str = "Error fetching video details";
const AUDIO_CONTENT_TYPE: &str = "audio/mp4";

#[derive(Debug, Deserialize)]
pub struct VideoQuery {
    #[serde(default)]
    pub id: Option<String>,
}

impl VideoQuery {
    /// The trimmed id, or `None` when absent or blank.
    fn id(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }
}

/// Which endpoint failed; selects the response shape for [`media_error_response`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Audio,
    Details,
}

/// `GET /audio?id=`: stream the video's audio track.
pub async fn audio(State(state): State<AppState>, Query(query): Query<VideoQuery>) -> Response {
    let Some(id) = query.id() else {
        return missing_id();
    };

    match state.source.open_audio_stream(id).await {
        Ok(stream) => {
            tracing::info!(%id, "streaming audio");
            ([(header::CONTENT_TYPE, AUDIO_CONTENT_TYPE)], Body::from_stream(stream)).into_response()
        }
        Err(e) => media_error_response(Endpoint::Audio, id, &e),
    }
}

/// `GET /details?id=`: title and artist of the video.
pub async fn details(State(state): State<AppState>, Query(query): Query<VideoQuery>) -> Response {
    let Some(id) = query.id() else {
        return missing_id();
    };

    match state.source.resolve_metadata(id).await {
        Ok(details) => Json(details).into_response(),
        Err(e) => media_error_response(Endpoint::Details, id, &e),
    }
}

fn missing_id() -> Response {
    (StatusCode::BAD_REQUEST, MISSING_ID).into_response()
}

/// Log the cause and answer with the endpoint's generic 500 body.
pub fn media_error_response(endpoint: Endpoint, id: &str, err: &MediaError) -> Response {
    tracing::warn!(%id, ?endpoint, error = %err, "video source failed");
    match endpoint {
        Endpoint::Audio => (StatusCode::INTERNAL_SERVER_ERROR, AUDIO_FAILED).into_response(),
        Endpoint::Details => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": DETAILS_FAILED })),
        )
            .into_response(),
    }
}

#[cfg(test)]
#[path = "media_test.rs"]
mod tests;
