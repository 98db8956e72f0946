//! Camera capture: turn a live camera stream into a still-image payload.
//!
//! SYSTEM CONTEXT
//! ==============
//! The camera itself is a capability (`Camera` / `CameraStream`) supplied by
//! the host. `CaptureSession` owns at most one open stream: `start` acquires
//! it, `capture` grabs a single frame at the stream's native resolution and
//! encodes it as a PNG data URL, and the stream is released straight after
//! the capture (successful or not) or on `cancel`.
//!
//! Calling `start` while a stream is already open keeps the open stream
//! rather than acquiring a second one.

#[cfg(test)]
#[path = "capture_test.rs"]
mod capture_test;

use std::io::Cursor;
use std::path::PathBuf;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbaImage};

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("camera permission denied: {0}")]
    PermissionDenied(String),
    #[error("camera unavailable: {0}")]
    Unavailable(String),
    #[error("camera not started")]
    NotStarted,
    #[error("frame grab failed: {0}")]
    Frame(String),
    #[error("image encode failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("unsupported image type: {0}")]
    UnsupportedType(String),
}

/// An open camera stream.
pub trait CameraStream {
    /// Native `(width, height)` of the live video.
    fn native_size(&self) -> (u32, u32);

    /// Grab the current frame.
    ///
    /// # Errors
    ///
    /// Returns an error if no frame can be read from the device.
    fn grab_frame(&mut self) -> Result<RgbaImage, CaptureError>;

    /// Stop every track of the stream.
    fn release(&mut self);
}

/// Something that can open a camera stream.
pub trait Camera {
    type Stream: CameraStream;

    /// Request access and open a stream.
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` or `Unavailable` when access fails.
    fn open(&mut self) -> Result<Self::Stream, CaptureError>;
}

// =============================================================================
// SESSION
// =============================================================================

/// Scoped ownership of at most one camera stream.
pub struct CaptureSession<C: Camera> {
    camera: C,
    active: Option<C::Stream>,
}

impl<C: Camera> CaptureSession<C> {
    #[must_use]
    pub fn new(camera: C) -> Self {
        Self { camera, active: None }
    }

    /// Whether a stream is currently open.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Open the camera unless a stream is already open.
    ///
    /// # Errors
    ///
    /// Propagates the camera's permission or hardware error. The session
    /// stays inactive and the caller may retry.
    pub fn start(&mut self) -> Result<(), CaptureError> {
        if self.active.is_some() {
            tracing::debug!("camera already streaming; reusing stream");
            return Ok(());
        }
        let stream = self.camera.open()?;
        let (width, height) = stream.native_size();
        tracing::debug!(width, height, "camera stream opened");
        self.active = Some(stream);
        Ok(())
    }

    /// Grab one frame, release the stream, and return the frame as a PNG data URL.
    ///
    /// # Errors
    ///
    /// `NotStarted` without an open stream; otherwise frame or encode errors.
    /// The stream is released in every case.
    pub fn capture(&mut self) -> Result<String, CaptureError> {
        let mut stream = self.active.take().ok_or(CaptureError::NotStarted)?;
        let result = grab_native(&mut stream);
        stream.release();
        let frame = result?;
        encode_png_data_url(&frame)
    }

    /// Release the stream without capturing.
    pub fn cancel(&mut self) {
        if let Some(mut stream) = self.active.take() {
            stream.release();
            tracing::debug!("camera capture cancelled");
        }
    }
}

impl<C: Camera> Drop for CaptureSession<C> {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Grab a frame sized to the stream's native resolution.
fn grab_native<S: CameraStream>(stream: &mut S) -> Result<RgbaImage, CaptureError> {
    let (width, height) = stream.native_size();
    if width == 0 || height == 0 {
        return Err(CaptureError::Frame("stream reports an empty video size".into()));
    }
    let frame = stream.grab_frame()?;
    if frame.dimensions() == (width, height) {
        Ok(frame)
    } else {
        Ok(imageops::resize(&frame, width, height, FilterType::Triangle))
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Encode `frame` as a `data:image/png;base64,…` URL.
///
/// # Errors
///
/// Returns an error if PNG encoding fails.
pub fn encode_png_data_url(frame: &RgbaImage) -> Result<String, CaptureError> {
    let mut png = Cursor::new(Vec::new());
    frame.write_to(&mut png, ImageFormat::Png)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(png.into_inner())))
}

/// Wrap raw image file bytes as a data URL, rejecting non-image content.
///
/// # Errors
///
/// Returns `UnsupportedType` when the bytes are not a recognized image format.
pub fn image_data_url(bytes: &[u8]) -> Result<String, CaptureError> {
    let format = image::guess_format(bytes).map_err(|e| CaptureError::UnsupportedType(e.to_string()))?;
    Ok(format!("data:{};base64,{}", format.to_mime_type(), STANDARD.encode(bytes)))
}

// =============================================================================
// STILL IMAGE CAMERA
// =============================================================================

/// A camera whose "live video" is a single image file.
#[derive(Debug, Clone)]
pub struct StillImageCamera {
    path: PathBuf,
}

impl StillImageCamera {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Camera for StillImageCamera {
    type Stream = StillImageStream;

    fn open(&mut self) -> Result<Self::Stream, CaptureError> {
        let image = image::open(&self.path)
            .map_err(|e| CaptureError::Unavailable(format!("{}: {e}", self.path.display())))?;
        Ok(StillImageStream { frame: Some(image.to_rgba8()) })
    }
}

/// Stream produced by [`StillImageCamera`].
#[derive(Debug)]
pub struct StillImageStream {
    frame: Option<RgbaImage>,
}

impl CameraStream for StillImageStream {
    fn native_size(&self) -> (u32, u32) {
        self.frame.as_ref().map_or((0, 0), RgbaImage::dimensions)
    }

    fn grab_frame(&mut self) -> Result<RgbaImage, CaptureError> {
        self.frame
            .clone()
            .ok_or_else(|| CaptureError::Frame("stream released".into()))
    }

    fn release(&mut self) {
        self.frame = None;
    }
}
