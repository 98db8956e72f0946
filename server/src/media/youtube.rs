//! YouTube-backed video source.
//!
//! Metadata comes from the public oEmbed endpoint. Audio comes from the
//! player endpoint, which lists the adaptive formats of a video; the best
//! audio-only format that carries a direct URL is fetched and its body is
//! forwarded untouched. Formats that only offer a `signatureCipher` are
//! skipped. Pure parsing lives in `parse_oembed` and `select_audio_format`
//! for testability.

use std::time::Duration;

use futures::{StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};

use super::{AudioStream, MediaError, VideoDetails, VideoSource, is_valid_video_id};
use crate::config::UpstreamTimeouts;

const OEMBED_PATH: &str = "/oembed";
const PLAYER_PATH: &str = "/youtubei/v1/player";
const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

// Player API client identity. The Android client returns direct format URLs.
const CLIENT_NAME: &str = "ANDROID";
const CLIENT_VERSION: &str = "19.09.37";
const ANDROID_SDK_VERSION: u32 = 30;
const USER_AGENT: &str = "com.google.android.youtube/19.09.37 (Linux; U; Android 11) gzip";

// =============================================================================
// CLIENT
// =============================================================================

pub struct YouTubeSource {
    http: reqwest::Client,
    base_url: String,
    request_timeout: Duration,
}

impl YouTubeSource {
    /// Build a source talking to `base_url` (no trailing slash).
    ///
    /// Only connecting is bounded at the client level; metadata and player
    /// requests get `request_timeout` each, and so does opening the audio
    /// download. The audio body itself streams without a deadline.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(base_url: impl Into<String>, timeouts: UpstreamTimeouts) -> Result<Self, MediaError> {
        let http = reqwest::Client::builder()
            .connect_timeout(timeouts.connect())
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| MediaError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.into(), request_timeout: timeouts.request() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch_player(&self, id: &str) -> Result<String, MediaError> {
        let response = self
            .http
            .post(format!("{}{PLAYER_PATH}", self.base_url))
            .timeout(self.request_timeout)
            .json(&PlayerRequest::new(id))
            .send()
            .await
            .map_err(request_error)?;
        success_text(response).await
    }
}

#[async_trait::async_trait]
impl VideoSource for YouTubeSource {
    async fn resolve_metadata(&self, id: &str) -> Result<VideoDetails, MediaError> {
        check_id(id)?;
        let watch = watch_url(id);
        let response = self
            .http
            .get(format!("{}{OEMBED_PATH}", self.base_url))
            .query(&[("url", watch.as_str()), ("format", "json")])
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(request_error)?;
        let text = success_text(response).await?;
        parse_oembed(&text)
    }

    async fn open_audio_stream(&self, id: &str) -> Result<AudioStream, MediaError> {
        check_id(id)?;
        let player = self.fetch_player(id).await?;
        let format = select_audio_format(&player)?;
        tracing::debug!(%id, mime = %format.mime_type, bitrate = format.bitrate, "audio format selected");

        let response = tokio::time::timeout(self.request_timeout, self.http.get(&format.url).send())
            .await
            .map_err(|_| MediaError::Timeout)?
            .map_err(request_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(MediaError::UpstreamStatus { status: status.as_u16() });
        }

        Ok(response
            .bytes_stream()
            .map_err(|e| MediaError::Upstream(e.to_string()))
            .boxed())
    }
}

fn check_id(id: &str) -> Result<(), MediaError> {
    if is_valid_video_id(id) { Ok(()) } else { Err(MediaError::InvalidId(id.to_owned())) }
}

fn watch_url(id: &str) -> String {
    format!("{WATCH_URL}{id}")
}

fn request_error(e: reqwest::Error) -> MediaError {
    if e.is_timeout() { MediaError::Timeout } else { MediaError::Upstream(e.to_string()) }
}

async fn success_text(response: reqwest::Response) -> Result<String, MediaError> {
    let status = response.status();
    if !status.is_success() {
        return Err(MediaError::UpstreamStatus { status: status.as_u16() });
    }
    response.text().await.map_err(request_error)
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Deserialize)]
struct OEmbedResponse {
    title: String,
    author_name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlayerRequest<'a> {
    video_id: &'a str,
    context: PlayerContext,
    content_check_ok: bool,
    racy_check_ok: bool,
}

impl<'a> PlayerRequest<'a> {
    fn new(video_id: &'a str) -> Self {
        Self {
            video_id,
            context: PlayerContext {
                client: PlayerClient {
                    client_name: CLIENT_NAME,
                    client_version: CLIENT_VERSION,
                    android_sdk_version: ANDROID_SDK_VERSION,
                    hl: "en",
                    gl: "US",
                },
            },
            content_check_ok: true,
            racy_check_ok: true,
        }
    }
}

#[derive(Serialize)]
struct PlayerContext {
    client: PlayerClient,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlayerClient {
    client_name: &'static str,
    client_version: &'static str,
    android_sdk_version: u32,
    hl: &'static str,
    gl: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    #[serde(default)]
    playability_status: Option<PlayabilityStatus>,
    #[serde(default)]
    streaming_data: Option<StreamingData>,
}

#[derive(Deserialize)]
struct PlayabilityStatus {
    status: String,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StreamingData {
    #[serde(default)]
    adaptive_formats: Vec<RawFormat>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFormat {
    #[serde(default)]
    url: Option<String>,
    mime_type: String,
    #[serde(default)]
    bitrate: u64,
}

/// An audio-only format that can be downloaded directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFormat {
    pub url: String,
    pub mime_type: String,
    pub bitrate: u64,
}

// =============================================================================
// PARSING
// =============================================================================

/// Extract title and author from an oEmbed body.
///
/// # Errors
///
/// Returns `Parse` if the body is not an oEmbed object.
pub fn parse_oembed(text: &str) -> Result<VideoDetails, MediaError> {
    let parsed: OEmbedResponse = serde_json::from_str(text).map_err(|e| MediaError::Parse(e.to_string()))?;
    Ok(VideoDetails { title: parsed.title, artist: parsed.author_name })
}

/// Pick the best audio-only format from a player response: `audio/mp4`
/// first, then the highest bitrate.
///
/// # Errors
///
/// - `Parse` for a malformed body.
/// - `Unplayable` when the playability status is not `OK`.
/// - `NoAudioFormat` when nothing downloadable remains.
pub fn select_audio_format(text: &str) -> Result<AudioFormat, MediaError> {
    let parsed: PlayerResponse = serde_json::from_str(text).map_err(|e| MediaError::Parse(e.to_string()))?;

    if let Some(playability) = parsed.playability_status {
        if playability.status != "OK" {
            return Err(MediaError::Unplayable(playability.reason.unwrap_or(playability.status)));
        }
    }

    parsed
        .streaming_data
        .map(|data| data.adaptive_formats)
        .unwrap_or_default()
        .into_iter()
        .filter(|f| f.mime_type.starts_with("audio/"))
        .filter_map(|f| f.url.map(|url| AudioFormat { url, mime_type: f.mime_type, bitrate: f.bitrate }))
        .max_by_key(|f| (f.mime_type.starts_with("audio/mp4"), f.bitrate))
        .ok_or(MediaError::NoAudioFormat)
}

#[cfg(test)]
#[path = "youtube_test.rs"]
mod tests;
