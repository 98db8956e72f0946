//! Board actions and the pure reducer that applies them.
//!
//! DESIGN
//! ======
//! Every mutation of a [`BoardDocument`] is expressed as an [`Action`] and
//! applied by [`reduce`], a pure `(document, action) -> document` function.
//! The reducer never touches storage, randomness or the clock: callers build
//! fully formed objects (ids, spawn positions, tilt) and the reducer only
//! enforces document invariants.
//!
//! INVARIANTS
//! ==========
//! - Ids are unique across all four kinds.
//! - z-indices are never negative. Adds and moves put the object at the
//!   front of its own kind's pool (`max + 1`); pools never compare across
//!   kinds.
//! - Scale is finite and strictly positive.
//! - Positions and rotations are finite.
//!
//! A rejected action returns an error and leaves the input untouched.

#[cfg(test)]
#[path = "action_test.rs"]
mod action_test;

use crate::doc::{BoardDocument, Doodle, Note, ObjectId, ObjectKind, Photo, Placed, Point, SongRef, Sticker, StickerKind};
use crate::store::StorageError;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: ObjectKind, id: ObjectId },
    #[error("duplicate object id: {0}")]
    DuplicateId(ObjectId),
    #[error("invalid scale: {0}")]
    InvalidScale(f64),
    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f64 },
    #[error("{0} z-index pool is exhausted")]
    ZIndexExhausted(ObjectKind),
    #[error("invalid image: {0}")]
    InvalidImage(String),
    #[error("camera capture failed: {0}")]
    Capture(#[from] crate::capture::CaptureError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

// =============================================================================
// ACTIONS
// =============================================================================

/// A single mutation of the board document.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    AddNote(Note),
    /// Replace a note's text.
    EditNote { id: ObjectId, content: String },
    AddPhoto(Photo),
    AddSticker(Sticker),
    AddDoodle(Doodle),
    /// Move an object and bring it to the front of its pool.
    Move { kind: ObjectKind, id: ObjectId, position: Point },
    /// Add `delta` degrees to an object's rotation.
    Rotate { kind: ObjectKind, id: ObjectId, delta: f64 },
    /// Set an object's absolute scale.
    Scale { kind: ObjectKind, id: ObjectId, scale: f64 },
    Delete { kind: ObjectKind, id: ObjectId },
    /// Attach a song, or detach it with `None`.
    SetSong(Option<SongRef>),
    /// Flip the hidden-message flag.
    ToggleUnlock,
    /// Remove every placed object. Song and flag survive.
    ClearAll,
}

impl Action {
    /// Short name used in log fields.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddNote(_) => "add_note",
            Self::EditNote { .. } => "edit_note",
            Self::AddPhoto(_) => "add_photo",
            Self::AddSticker(_) => "add_sticker",
            Self::AddDoodle(_) => "add_doodle",
            Self::Move { .. } => "move",
            Self::Rotate { .. } => "rotate",
            Self::Scale { .. } => "scale",
            Self::Delete { .. } => "delete",
            Self::SetSong(_) => "set_song",
            Self::ToggleUnlock => "toggle_unlock",
            Self::ClearAll => "clear_all",
        }
    }
}

// =============================================================================
// REDUCER
// =============================================================================

/// Apply `action` to `doc`, returning the next document.
///
/// # Errors
///
/// - `DuplicateId` when an add reuses an id already on the board.
/// - `NotFound` when an update or delete names a missing object.
/// - `InvalidScale` for a non-finite or non-positive scale.
/// - `NonFinite` for a NaN or infinite position, rotation delta, or a
///   rotation that overflows to infinity.
/// - `ZIndexExhausted` when the kind's pool already holds `i64::MAX`.
/// - `InvalidImage` for a custom sticker without a usable image URL.
pub fn reduce(doc: &BoardDocument, action: Action) -> Result<BoardDocument, BoardError> {
    let mut next = doc.clone();
    match action {
        Action::AddNote(note) => {
            let note = prepare_add(&next, note)?;
            next.notes.push(note);
        }
        Action::EditNote { id, content } => {
            let note = next
                .notes
                .iter_mut()
                .find(|n| n.id() == id)
                .ok_or(BoardError::NotFound { kind: ObjectKind::Note, id })?;
            note.content = content;
        }
        Action::AddPhoto(photo) => {
            let photo = prepare_add(&next, photo)?;
            next.photos.push(photo);
        }
        Action::AddSticker(sticker) => {
            validate_sticker(&sticker)?;
            let sticker = prepare_add(&next, sticker)?;
            next.stickers.push(sticker);
        }
        Action::AddDoodle(doodle) => {
            let doodle = prepare_add(&next, doodle)?;
            next.doodles.push(doodle);
        }
        Action::Move { kind, id, position } => {
            check_finite("position.x", position.x)?;
            check_finite("position.y", position.y)?;
            let front = next.front_z(kind).ok_or(BoardError::ZIndexExhausted(kind))?;
            let placement = next
                .placement_mut(kind, &id)
                .ok_or(BoardError::NotFound { kind, id })?;
            placement.position = position;
            placement.z_index = front;
        }
        Action::Rotate { kind, id, delta } => {
            check_finite("rotation delta", delta)?;
            let placement = next
                .placement_mut(kind, &id)
                .ok_or(BoardError::NotFound { kind, id })?;
            let rotation = placement.rotation + delta;
            check_finite("rotation", rotation)?;
            placement.rotation = rotation;
        }
        Action::Scale { kind, id, scale } => {
            check_scale(scale)?;
            let placement = next
                .placement_mut(kind, &id)
                .ok_or(BoardError::NotFound { kind, id })?;
            placement.scale = scale;
        }
        Action::Delete { kind, id } => {
            if !next.remove(kind, &id) {
                return Err(BoardError::NotFound { kind, id });
            }
        }
        Action::SetSong(song) => next.song = song,
        Action::ToggleUnlock => next.unlocked = !next.unlocked,
        Action::ClearAll => {
            next.notes.clear();
            next.photos.clear();
            next.stickers.clear();
            next.doodles.clear();
        }
    }
    Ok(next)
}

/// Validate a new object and put it at the front of its pool.
fn prepare_add<T: Placed>(doc: &BoardDocument, mut item: T) -> Result<T, BoardError> {
    if doc.contains_id(item.id()) {
        return Err(BoardError::DuplicateId(item.id().to_owned()));
    }
    let placement = item.placement();
    check_scale(placement.scale)?;
    check_finite("position.x", placement.position.x)?;
    check_finite("position.y", placement.position.y)?;
    check_finite("rotation", placement.rotation)?;
    item.placement_mut().z_index = doc.front_z(T::KIND).ok_or(BoardError::ZIndexExhausted(T::KIND))?;
    Ok(item)
}

fn check_finite(field: &'static str, value: f64) -> Result<(), BoardError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(BoardError::NonFinite { field, value })
    }
}

fn check_scale(scale: f64) -> Result<(), BoardError> {
    if scale.is_finite() && scale > 0.0 {
        Ok(())
    } else {
        Err(BoardError::InvalidScale(scale))
    }
}

fn validate_sticker(sticker: &Sticker) -> Result<(), BoardError> {
    match (sticker.kind, sticker.image_url.as_deref()) {
        (StickerKind::Custom, Some(url)) => check_image_url(url),
        (StickerKind::Custom, None) => Err(BoardError::InvalidImage("custom sticker without image".into())),
        (_, Some(_)) => Err(BoardError::InvalidImage("only custom stickers carry an image".into())),
        (_, None) => Ok(()),
    }
}

/// Accept inline image data or a web URL; reject anything else.
///
/// # Errors
///
/// Returns `InvalidImage` for any other scheme.
pub fn check_image_url(url: &str) -> Result<(), BoardError> {
    let lower = url.trim_start().to_ascii_lowercase();
    if lower.starts_with("data:image/") || lower.starts_with("https://") || lower.starts_with("http://") {
        Ok(())
    } else {
        Err(BoardError::InvalidImage(format!("unsupported image source: {}", truncate(url, 32))))
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
