//! Video source capability used by the audio proxy.
//!
//! DESIGN
//! ======
//! Routes never talk to the video platform directly; they go through the
//! `VideoSource` trait so handlers can be exercised with an in-memory mock.
//! `YouTubeSource` is the production implementation.

pub mod youtube;

use axum::body::Bytes;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

pub use youtube::YouTubeSource;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced while resolving or streaming a video.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// The id is not a well-formed video id.
    #[error("invalid video id: {0}")]
    InvalidId(String),

    /// The HTTP request to the platform failed.
    #[error("upstream request failed: {0}")]
    Upstream(String),

    /// The platform answered with a non-success status.
    #[error("upstream returned status {status}")]
    UpstreamStatus { status: u16 },

    /// The platform response could not be decoded.
    #[error("upstream response parse failed: {0}")]
    Parse(String),

    /// The platform refused to play the video.
    #[error("video unplayable: {0}")]
    Unplayable(String),

    /// No audio-only format with a direct URL was offered.
    #[error("no playable audio format")]
    NoAudioFormat,

    /// The upstream did not answer within the configured timeout.
    #[error("upstream timed out")]
    Timeout,

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

// =============================================================================
// TYPES
// =============================================================================

/// Title and author of a video, as shown in the song player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoDetails {
    pub title: String,
    pub artist: String,
}

/// Audio bytes forwarded chunk by chunk as they arrive from upstream.
pub type AudioStream = BoxStream<'static, Result<Bytes, MediaError>>;

/// Something that can resolve video metadata and open an audio stream.
#[async_trait::async_trait]
pub trait VideoSource: Send + Sync {
    /// Look up title and author for `id`.
    ///
    /// # Errors
    ///
    /// Returns a [`MediaError`] if the id is invalid or the lookup fails.
    async fn resolve_metadata(&self, id: &str) -> Result<VideoDetails, MediaError>;

    /// Open the best audio-only stream for `id`.
    ///
    /// # Errors
    ///
    /// Returns a [`MediaError`] if no audio stream can be opened.
    async fn open_audio_stream(&self, id: &str) -> Result<AudioStream, MediaError>;
}

/// Video ids are 11 characters of `[A-Za-z0-9_-]`.
#[must_use]
pub fn is_valid_video_id(id: &str) -> bool {
    id.len() == 11 && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
