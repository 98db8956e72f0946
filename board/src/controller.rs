//! Board controller: the single owner and writer of the board document.
//!
//! DESIGN
//! ======
//! The controller turns user intents (add a note, drag a sticker, capture a
//! selfie) into [`Action`]s, runs them through the pure [`reduce`] function,
//! and persists the whole resulting document before committing it in memory.
//! A failed reduce or a failed write leaves both the in-memory document and
//! the store unchanged.
//!
//! Everything non-deterministic (object ids, spawn jitter, tilt) is decided
//! here, never in the reducer. The random source is a type parameter so tests
//! can use a seeded generator.

#[cfg(test)]
#[path = "controller_test.rs"]
mod controller_test;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use crate::action::{Action, BoardError, check_image_url, reduce};
use crate::capture::{Camera, CaptureSession};
use crate::consts::{
    DEFAULT_NOTE_CONTENT, DOODLE_SPAWN_PX, FALLBACK_BOARD_HEIGHT, FALLBACK_BOARD_WIDTH, INITIAL_DOODLE_COUNT,
    NOTE_SPAWN_PX, PAPER_TILT_DEG, PHOTO_SPAWN_PX, SEED_AREA_FRACTION, SPAWN_JITTER_PX, STICKER_SPAWN_PX,
    STICKER_TILT_DEG,
};
use crate::doc::{
    BoardDocument, Doodle, DoodleKind, Note, NoteColor, ObjectId, ObjectKind, Photo, Placement, Point, SongRef,
    Sticker, StickerKind, StrokeColor,
};
use crate::layer::{BoardRect, LayerManager};
use crate::notice::Notice;
use crate::store::{BoardStore, LoadOutcome, load_document, save_document};

/// Owns the board document, its store, and the transient UI state around it.
pub struct BoardController<S: BoardStore, R: Rng = StdRng> {
    doc: BoardDocument,
    store: S,
    layers: LayerManager,
    editing: Option<ObjectId>,
    rng: R,
}

impl<S: BoardStore> BoardController<S, StdRng> {
    /// Load the board from `store` using an OS-seeded random source.
    ///
    /// # Errors
    ///
    /// See [`BoardController::with_rng`].
    pub fn open(store: S) -> Result<Self, BoardError> {
        Self::with_rng(store, StdRng::from_os_rng())
    }
}

impl<S: BoardStore, R: Rng> BoardController<S, R> {
    /// Load the board from `store`.
    ///
    /// A store that has never been written is seeded with a handful of
    /// doodles; a corrupt one is reset to an empty board. In both cases the
    /// fresh document is written back immediately.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the fresh document cannot be written.
    pub fn with_rng(mut store: S, mut rng: R) -> Result<Self, BoardError> {
        let doc = match load_document(&store) {
            LoadOutcome::Restored(doc) => doc,
            LoadOutcome::Missing => {
                let doc = seed_document(&mut rng);
                save_document(&mut store, &doc)?;
                doc
            }
            LoadOutcome::Corrupt => {
                let doc = BoardDocument::new();
                save_document(&mut store, &doc)?;
                doc
            }
        };
        Ok(Self { doc, store, layers: LayerManager::new(), editing: None, rng })
    }

    #[must_use]
    pub fn document(&self) -> &BoardDocument {
        &self.doc
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The note currently open in the editor, if any.
    #[must_use]
    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    #[must_use]
    pub fn layers(&self) -> &LayerManager {
        &self.layers
    }

    /// Reduce, persist, then commit.
    ///
    /// # Errors
    ///
    /// Returns the reducer's rejection or a storage failure.
    pub fn dispatch(&mut self, action: Action) -> Result<(), BoardError> {
        let name = action.name();
        let next = reduce(&self.doc, action).inspect_err(|e| {
            tracing::debug!(action = name, error = %e, "action rejected");
        })?;
        save_document(&mut self.store, &next)?;
        self.doc = next;
        tracing::trace!(action = name, objects = self.doc.len(), "board saved");
        Ok(())
    }

    // --- Notes ---

    /// Add a note with the default text and open it for editing.
    ///
    /// # Errors
    ///
    /// Returns a storage failure.
    pub fn add_note(&mut self, color: NoteColor) -> Result<ObjectId, BoardError> {
        let placement = self.spawn("note", NOTE_SPAWN_PX, PAPER_TILT_DEG);
        let id = placement.id.clone();
        self.dispatch(Action::AddNote(Note { placement, content: DEFAULT_NOTE_CONTENT.to_owned(), color }))?;
        self.editing = Some(id.clone());
        Ok(id)
    }

    /// Open an existing note in the editor.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no note has `id`.
    pub fn start_editing(&mut self, id: &str) -> Result<(), BoardError> {
        if self.doc.note(id).is_none() {
            return Err(BoardError::NotFound { kind: ObjectKind::Note, id: id.to_owned() });
        }
        self.editing = Some(id.to_owned());
        Ok(())
    }

    /// Save new text for a note and close the editor if it was open on it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or a storage failure.
    pub fn edit_note(&mut self, id: &str, content: impl Into<String>) -> Result<(), BoardError> {
        self.dispatch(Action::EditNote { id: id.to_owned(), content: content.into() })?;
        if self.editing.as_deref() == Some(id) {
            self.editing = None;
        }
        Ok(())
    }

    // --- Photos ---

    /// Add a photo from an encoded image payload.
    ///
    /// # Errors
    ///
    /// Returns `InvalidImage` unless the payload is an inline image.
    pub fn add_photo(&mut self, image_data: String) -> Result<ObjectId, BoardError> {
        if !image_data.starts_with("data:image/") {
            return Err(BoardError::InvalidImage("photo payload must be an inline image".into()));
        }
        let placement = self.spawn("selfie", PHOTO_SPAWN_PX, PAPER_TILT_DEG);
        let id = placement.id.clone();
        self.dispatch(Action::AddPhoto(Photo { placement, image_data }))?;
        Ok(id)
    }

    /// Capture a frame from an active camera session and pin it as a photo.
    ///
    /// # Errors
    ///
    /// Returns `Capture` when the camera is not started or the frame cannot
    /// be grabbed; the session is released either way.
    pub fn capture_photo<C: Camera>(&mut self, session: &mut CaptureSession<C>) -> Result<ObjectId, BoardError> {
        let image_data = session.capture()?;
        self.add_photo(image_data)
    }

    // --- Stickers and doodles ---

    /// Add one of the built-in stickers.
    ///
    /// # Errors
    ///
    /// Returns `InvalidImage` for [`StickerKind::Custom`], which needs an image.
    pub fn add_sticker(&mut self, kind: StickerKind) -> Result<ObjectId, BoardError> {
        if kind == StickerKind::Custom {
            return Err(BoardError::InvalidImage("custom stickers need an image".into()));
        }
        let placement = self.spawn("sticker", STICKER_SPAWN_PX, STICKER_TILT_DEG);
        let id = placement.id.clone();
        self.dispatch(Action::AddSticker(Sticker { placement, kind, image_url: None }))?;
        Ok(id)
    }

    /// Add a sticker showing a user-supplied image.
    ///
    /// # Errors
    ///
    /// Returns `InvalidImage` unless `image_url` is inline image data or a web URL.
    pub fn add_custom_sticker(&mut self, image_url: String) -> Result<(ObjectId, Notice), BoardError> {
        check_image_url(&image_url)?;
        let placement = self.spawn("sticker-custom", STICKER_SPAWN_PX, STICKER_TILT_DEG);
        let id = placement.id.clone();
        self.dispatch(Action::AddSticker(Sticker { placement, kind: StickerKind::Custom, image_url: Some(image_url) }))?;
        Ok((id, Notice::image_added()))
    }

    /// Add a doodle, drawn in `stroke` or the shape's default colour.
    ///
    /// # Errors
    ///
    /// Returns a storage failure.
    pub fn add_doodle(&mut self, kind: DoodleKind, stroke: Option<StrokeColor>) -> Result<ObjectId, BoardError> {
        let mut placement = self.spawn("doodle", DOODLE_SPAWN_PX, 0.0);
        placement.rotation = self.rng.random_range(0.0..360.0);
        let id = placement.id.clone();
        let stroke_color = stroke.unwrap_or(kind.default_stroke());
        self.dispatch(Action::AddDoodle(Doodle { placement, kind, stroke_color }))?;
        Ok(id)
    }

    // --- Placement edits ---

    /// Move an object and bring it to the front of its kind.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `NonFinite`, `ZIndexExhausted`, or a storage failure.
    pub fn move_to(&mut self, kind: ObjectKind, id: &str, position: Point) -> Result<(), BoardError> {
        self.dispatch(Action::Move { kind, id: id.to_owned(), position })
    }

    /// Rotate an object by `delta` degrees.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `NonFinite`, or a storage failure.
    pub fn rotate(&mut self, kind: ObjectKind, id: &str, delta: f64) -> Result<(), BoardError> {
        self.dispatch(Action::Rotate { kind, id: id.to_owned(), delta })
    }

    /// Set an object's scale.
    ///
    /// # Errors
    ///
    /// Returns `InvalidScale`, `NotFound`, or a storage failure.
    pub fn scale(&mut self, kind: ObjectKind, id: &str, scale: f64) -> Result<(), BoardError> {
        self.dispatch(Action::Scale { kind, id: id.to_owned(), scale })
    }

    /// Remove an object.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or a storage failure.
    pub fn delete(&mut self, kind: ObjectKind, id: &str) -> Result<(), BoardError> {
        self.dispatch(Action::Delete { kind, id: id.to_owned() })?;
        if self.editing.as_deref() == Some(id) {
            self.editing = None;
        }
        if self.layers.active().is_some_and(|(k, active)| k == kind && active == id) {
            self.layers.end_drag();
        }
        Ok(())
    }

    // --- Song, flag, board ---

    /// Attach the background song.
    ///
    /// # Errors
    ///
    /// Returns a storage failure.
    pub fn set_song(&mut self, song: SongRef) -> Result<Notice, BoardError> {
        self.dispatch(Action::SetSong(Some(song)))?;
        Ok(Notice::song_added())
    }

    /// Detach the background song.
    ///
    /// # Errors
    ///
    /// Returns a storage failure.
    pub fn clear_song(&mut self) -> Result<(), BoardError> {
        self.dispatch(Action::SetSong(None))
    }

    /// Flip the hidden-message flag and return its new value.
    ///
    /// # Errors
    ///
    /// Returns a storage failure.
    pub fn toggle_unlock(&mut self) -> Result<bool, BoardError> {
        self.dispatch(Action::ToggleUnlock)?;
        Ok(self.doc.unlocked)
    }

    /// Remove every placed object.
    ///
    /// # Errors
    ///
    /// Returns a storage failure.
    pub fn clear_all(&mut self) -> Result<Notice, BoardError> {
        self.dispatch(Action::ClearAll)?;
        self.editing = None;
        self.layers.end_drag();
        Ok(Notice::board_cleared())
    }

    // --- Drag gestures ---

    /// Start dragging an object. Returns false, and starts nothing, if the
    /// object does not exist or is a note open in the editor.
    pub fn begin_drag(&mut self, kind: ObjectKind, id: &str) -> bool {
        if kind == ObjectKind::Note && self.editing.as_deref() == Some(id) {
            return false;
        }
        if self.doc.placement(kind, id).is_none() {
            return false;
        }
        self.layers.begin_drag(kind, id);
        true
    }

    /// Follow the pointer with the dragged object, if any.
    ///
    /// # Errors
    ///
    /// Returns the reducer's rejection or a storage failure.
    pub fn pointer_move(&mut self, pointer: Point, board: &BoardRect) -> Result<(), BoardError> {
        match self.layers.pointer_move(pointer, board) {
            Some(action) => self.dispatch(action),
            None => Ok(()),
        }
    }

    /// Release the dragged object.
    pub fn end_drag(&mut self) {
        self.layers.end_drag();
    }

    // --- Helpers ---

    /// Fresh placement at `base + [0, jitter)` on both axes, tilted within `±tilt`.
    fn spawn(&mut self, prefix: &str, base: f64, tilt: f64) -> Placement {
        let position = Point::new(
            base + self.rng.random_range(0.0..SPAWN_JITTER_PX),
            base + self.rng.random_range(0.0..SPAWN_JITTER_PX),
        );
        let rotation = if tilt > 0.0 { self.rng.random_range(-tilt..tilt) } else { 0.0 };
        Placement::new(new_id(prefix), position, rotation)
    }
}

fn new_id(prefix: &str) -> ObjectId {
    format!("{prefix}-{}", Uuid::new_v4())
}

/// Board shown the very first time: a few random doodles scattered around.
pub fn seed_document<R: Rng>(rng: &mut R) -> BoardDocument {
    let max_x = FALLBACK_BOARD_WIDTH * SEED_AREA_FRACTION;
    let max_y = FALLBACK_BOARD_HEIGHT * SEED_AREA_FRACTION;
    let doodles = (0..INITIAL_DOODLE_COUNT)
        .map(|i| {
            let kind = DoodleKind::ALL[rng.random_range(0..DoodleKind::ALL.len())];
            let position = Point::new(rng.random_range(0.0..max_x), rng.random_range(0.0..max_y));
            let mut placement = Placement::new(format!("doodle-initial-{i}"), position, rng.random_range(0.0..360.0));
            placement.z_index = 1;
            placement.scale = rng.random_range(0.5..1.5);
            Doodle { placement, kind, stroke_color: kind.default_stroke() }
        })
        .collect();
    BoardDocument { doodles, ..BoardDocument::default() }
}
