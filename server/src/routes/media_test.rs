use axum::body::{Body, to_bytes};
use axum::http::Request;
use tower::util::ServiceExt;

use super::*;
use crate::routes::app;
use crate::state::test_helpers::{MockSource, test_app_state};

async fn get(source: MockSource, uri: &str) -> (Response, std::sync::Arc<MockSource>) {
    let (state, source) = test_app_state(source);
    let response = app(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    (response, source)
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn working() -> MockSource {
    MockSource::working("Tune", "Band", vec![b"abc".as_slice(), b"def".as_slice()])
}

// =============================================================
// Missing id
// =============================================================

#[tokio::test]
async fn audio_without_id_is_bad_request() {
    let (response, source) = get(working(), "/audio").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "Missing video ID");
    assert_eq!(source.call_count(), 0);
}

#[tokio::test]
async fn details_with_blank_id_is_bad_request() {
    let (response, source) = get(working(), "/details?id=").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "Missing video ID");
    assert_eq!(source.call_count(), 0);
}

// =============================================================
// Audio
// =============================================================

#[tokio::test]
async fn audio_streams_chunks_as_mp4() {
    let (response, source) = get(working(), "/audio?id=dQw4w9WgXcQ").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/mp4");
    assert_eq!(body_text(response).await, "abcdef");
    assert_eq!(*source.calls.lock().unwrap(), ["dQw4w9WgXcQ"]);
}

#[tokio::test]
async fn audio_failure_is_generic_500() {
    let (response, _) = get(MockSource::failing(), "/audio?id=dQw4w9WgXcQ").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(response).await, "Error streaming audio");
}

// =============================================================
// Details
// =============================================================

#[tokio::test]
async fn details_returns_title_and_artist() {
    let (response, _) = get(working(), "/details?id=dQw4w9WgXcQ").await;
    assert_eq!(response.status(), StatusCode::OK);
    let value: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(value, serde_json::json!({"title": "Tune", "artist": "Band"}));
}

#[tokio::test]
async fn details_failure_is_json_500() {
    let (response, _) = get(MockSource::failing(), "/details?id=nope").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let value: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(value, serde_json::json!({"error": "Error fetching video details"}));
}

#[tokio::test]
async fn id_is_trimmed_before_lookup() {
    let (_, source) = get(working(), "/details?id=%20abc%20").await;
    assert_eq!(*source.calls.lock().unwrap(), ["abc"]);
}

// =============================================================
// Router
// =============================================================

#[tokio::test]
async fn legacy_paths_share_handlers() {
    let (response, _) = get(working(), "/api/youtube-details?id=x").await;
    assert_eq!(response.status(), StatusCode::OK);
    let (response, _) = get(working(), "/api/youtube-audio").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn healthz_is_ok() {
    let (response, _) = get(working(), "/healthz").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[test]
fn media_error_response_picks_shape_by_endpoint() {
    let err = MediaError::NoAudioFormat;
    let audio = media_error_response(Endpoint::Audio, "x", &err);
    let details = media_error_response(Endpoint::Details, "x", &err);
    assert_eq!(audio.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(details.headers()[header::CONTENT_TYPE], "application/json");
}
