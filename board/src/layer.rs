//! Drag gestures and per-kind stacking order.
//!
//! `LayerManager` is the small state machine tracked between pointer-down and
//! pointer-up. While a drag is active every pointer move is translated into a
//! board-relative position and emitted as an [`Action::Move`], which the
//! reducer applies by moving the object and raising it to the front of its
//! own kind's pool.
//!
//! Stacking is compared only within a kind: notes, photos, stickers and
//! doodles each keep an independent z-index pool, so the order between, say,
//! a note and a sticker is whatever the renderer's layering makes it.

#[cfg(test)]
#[path = "layer_test.rs"]
mod layer_test;

use crate::action::Action;
use crate::doc::{ObjectId, ObjectKind, Point};

/// The board's bounding box in the pointer's coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoardRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl BoardRect {
    #[must_use]
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    /// Convert a pointer position to board-relative coordinates.
    #[must_use]
    pub fn to_board(&self, pointer: Point) -> Point {
        Point { x: pointer.x - self.left, y: pointer.y - self.top }
    }
}

/// Gesture state between pointer-down and pointer-up.
#[derive(Debug, Clone, PartialEq, Default)]
enum DragState {
    /// No drag in progress.
    #[default]
    Idle,
    /// An object is following the pointer.
    Dragging { kind: ObjectKind, id: ObjectId },
}

/// Tracks the active drag and turns pointer moves into board actions.
#[derive(Debug, Clone, Default)]
pub struct LayerManager {
    state: DragState,
}

impl LayerManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `(kind, id)` as the object under the pointer. Replaces any
    /// drag already in progress.
    pub fn begin_drag(&mut self, kind: ObjectKind, id: impl Into<ObjectId>) {
        self.state = DragState::Dragging { kind, id: id.into() };
    }

    /// Translate a pointer move into a move-to-front action for the active
    /// object. Returns `None` when nothing is being dragged.
    #[must_use]
    pub fn pointer_move(&self, pointer: Point, board: &BoardRect) -> Option<Action> {
        match &self.state {
            DragState::Idle => None,
            DragState::Dragging { kind, id } => {
                Some(Action::Move { kind: *kind, id: id.clone(), position: board.to_board(pointer) })
            }
        }
    }

    /// Clear the active drag, returning what was being dragged.
    pub fn end_drag(&mut self) -> Option<(ObjectKind, ObjectId)> {
        match std::mem::take(&mut self.state) {
            DragState::Idle => None,
            DragState::Dragging { kind, id } => Some((kind, id)),
        }
    }

    /// The object currently being dragged, if any.
    #[must_use]
    pub fn active(&self) -> Option<(ObjectKind, &str)> {
        match &self.state {
            DragState::Idle => None,
            DragState::Dragging { kind, id } => Some((*kind, id.as_str())),
        }
    }
}
