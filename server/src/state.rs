//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! is immutable after startup: the video source is shared behind an `Arc`
//! and every request works on its own upstream connection.

use std::sync::Arc;

use crate::media::VideoSource;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn VideoSource>,
}

impl AppState {
    #[must_use]
    pub fn new(source: Arc<dyn VideoSource>) -> Self {
        Self { source }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
