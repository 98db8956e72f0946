//! Document model: placed objects, their palettes, and the board document.
//!
//! This module defines everything that is persisted for a scrapbook: the four
//! kinds of placed objects (`Note`, `Photo`, `Sticker`, `Doodle`), the shared
//! `Placement` they all carry, the optional `SongRef`, and the
//! `BoardDocument` that owns them.
//!
//! The JSON layout uses camelCase keys and flattens `Placement` into each
//! object, so a stored note reads
//! `{"id":…,"position":{"x":…,"y":…},"rotation":…,"zIndex":…,"scale":…,"content":…,"color":…}`.
//! Missing arrays and flags default to empty, which keeps partial documents
//! loadable.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_SCALE, PLACEHOLDER_SONG_ARTIST, PLACEHOLDER_SONG_TITLE};

/// Unique identifier for a placed object, e.g. `note-7f0c…`.
pub type ObjectId = String;

/// A string tag did not name any variant of the target palette.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {what}: {value}")]
pub struct UnknownTag {
    pub what: &'static str,
    pub value: String,
}

/// Declares a lowercase string-tagged enum with `as_str`, `ALL`, `Display`
/// and `FromStr`.
macro_rules! tag_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($what:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $tag:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $tag)] $variant ),+
        }

        impl $name {
            /// Every variant, in palette order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The wire tag for this variant.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $tag),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownTag;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| UnknownTag { what: $what, value: s.to_owned() })
            }
        }
    };
}

tag_enum! {
    /// The kind of a placed object. Each kind has its own z-index pool.
    ObjectKind ("object kind") {
        Note => "note",
        Photo => "photo",
        Sticker => "sticker",
        Doodle => "doodle",
    }
}

tag_enum! {
    /// Sticky-note paper colour.
    NoteColor ("note color") {
        Yellow => "yellow",
        Pink => "pink",
        Blue => "blue",
        Green => "green",
        Purple => "purple",
        Orange => "orange",
    }
}

tag_enum! {
    /// Sticker artwork. `Custom` stickers carry their own image URL.
    StickerKind ("sticker kind") {
        Heart => "heart",
        Star => "star",
        Music => "music",
        Sparkle => "sparkle",
        Disc => "disc",
        Cloud => "cloud",
        Feather => "feather",
        Custom => "custom",
    }
}

tag_enum! {
    /// Doodle outline shape.
    DoodleKind ("doodle kind") {
        Squiggle => "squiggle",
        Heart => "heart",
        Star => "star",
        Cloud => "cloud",
        Flower => "flower",
        Spiral => "spiral",
    }
}

tag_enum! {
    /// Stroke colour used to draw a doodle.
    StrokeColor ("stroke color") {
        Pink => "pink",
        Red => "red",
        Yellow => "yellow",
        Blue => "blue",
        Green => "green",
        Purple => "purple",
    }
}

impl DoodleKind {
    /// The stroke colour this shape is drawn with unless one is chosen.
    #[must_use]
    pub fn default_stroke(self) -> StrokeColor {
        match self {
            Self::Squiggle => StrokeColor::Pink,
            Self::Heart => StrokeColor::Red,
            Self::Star => StrokeColor::Yellow,
            Self::Cloud => StrokeColor::Blue,
            Self::Flower => StrokeColor::Green,
            Self::Spiral => StrokeColor::Purple,
        }
    }
}

/// A board-relative position in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

fn default_scale() -> f64 {
    DEFAULT_SCALE
}

/// Position, orientation and stacking shared by every placed object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    /// Unique across the whole document, not just within one kind.
    pub id: ObjectId,
    /// Top-left corner relative to the board.
    pub position: Point,
    /// Clockwise rotation in degrees. Unbounded; renderers wrap it.
    pub rotation: f64,
    /// Stacking order within the object's kind.
    pub z_index: i64,
    /// Uniform scale factor, always `> 0`.
    #[serde(default = "default_scale")]
    pub scale: f64,
}

impl Placement {
    #[must_use]
    pub fn new(id: impl Into<ObjectId>, position: Point, rotation: f64) -> Self {
        Self { id: id.into(), position, rotation, z_index: 0, scale: DEFAULT_SCALE }
    }
}

/// A sticky note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    #[serde(flatten)]
    pub placement: Placement,
    pub content: String,
    pub color: NoteColor,
}

/// A still image captured from the camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    #[serde(flatten)]
    pub placement: Placement,
    /// Encoded image payload (a `data:image/png;base64,…` URL). Never uploaded.
    pub image_data: String,
}

/// A decorative sticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sticker {
    #[serde(flatten)]
    pub placement: Placement,
    #[serde(rename = "type")]
    pub kind: StickerKind,
    /// Image source; present only for [`StickerKind::Custom`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// A hand-drawn outline shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doodle {
    #[serde(flatten)]
    pub placement: Placement,
    #[serde(rename = "type")]
    pub kind: DoodleKind,
    pub stroke_color: StrokeColor,
}

/// The background song attached to the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongRef {
    pub url: String,
    pub title: String,
    pub artist: String,
}

/// Access to the shared placement of any placed object.
pub trait Placed {
    /// The z-index pool this type belongs to.
    const KIND: ObjectKind;

    fn placement(&self) -> &Placement;

    fn placement_mut(&mut self) -> &mut Placement;

    fn id(&self) -> &str {
        &self.placement().id
    }
}

macro_rules! impl_placed {
    ($ty:ty, $kind:expr) => {
        impl Placed for $ty {
            const KIND: ObjectKind = $kind;

            fn placement(&self) -> &Placement {
                &self.placement
            }

            fn placement_mut(&mut self) -> &mut Placement {
                &mut self.placement
            }
        }
    };
}

impl_placed!(Note, ObjectKind::Note);
impl_placed!(Photo, ObjectKind::Photo);
impl_placed!(Sticker, ObjectKind::Sticker);
impl_placed!(Doodle, ObjectKind::Doodle);

/// Highest z-index in a pool, or 0 for an empty pool.
fn pool_max<T: Placed>(items: &[T]) -> i64 {
    items
        .iter()
        .map(|item| item.placement().z_index)
        .fold(0, i64::max)
}

/// The full persisted state of a scrapbook.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoardDocument {
    pub notes: Vec<Note>,
    pub photos: Vec<Photo>,
    pub stickers: Vec<Sticker>,
    pub doodles: Vec<Doodle>,
    /// Whether the hidden message has been revealed.
    pub unlocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub song: Option<SongRef>,
}

impl BoardDocument {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterate every placement as `(kind, placement)`, notes first.
    pub fn placements(&self) -> impl Iterator<Item = (ObjectKind, &Placement)> {
        let notes = self.notes.iter().map(|o| (ObjectKind::Note, &o.placement));
        let photos = self.photos.iter().map(|o| (ObjectKind::Photo, &o.placement));
        let stickers = self.stickers.iter().map(|o| (ObjectKind::Sticker, &o.placement));
        let doodles = self.doodles.iter().map(|o| (ObjectKind::Doodle, &o.placement));
        notes.chain(photos).chain(stickers).chain(doodles)
    }

    /// Returns `true` if any object of any kind uses `id`.
    #[must_use]
    pub fn contains_id(&self, id: &str) -> bool {
        self.placements().any(|(_, p)| p.id == id)
    }

    /// Placement of the object `id` within the `kind` pool.
    #[must_use]
    pub fn placement(&self, kind: ObjectKind, id: &str) -> Option<&Placement> {
        match kind {
            ObjectKind::Note => find(&self.notes, id),
            ObjectKind::Photo => find(&self.photos, id),
            ObjectKind::Sticker => find(&self.stickers, id),
            ObjectKind::Doodle => find(&self.doodles, id),
        }
    }

    /// Mutable placement of the object `id` within the `kind` pool.
    pub fn placement_mut(&mut self, kind: ObjectKind, id: &str) -> Option<&mut Placement> {
        match kind {
            ObjectKind::Note => find_mut(&mut self.notes, id),
            ObjectKind::Photo => find_mut(&mut self.photos, id),
            ObjectKind::Sticker => find_mut(&mut self.stickers, id),
            ObjectKind::Doodle => find_mut(&mut self.doodles, id),
        }
    }

    /// Remove the object `id` from the `kind` pool. Returns false if absent.
    pub fn remove(&mut self, kind: ObjectKind, id: &str) -> bool {
        match kind {
            ObjectKind::Note => remove(&mut self.notes, id),
            ObjectKind::Photo => remove(&mut self.photos, id),
            ObjectKind::Sticker => remove(&mut self.stickers, id),
            ObjectKind::Doodle => remove(&mut self.doodles, id),
        }
    }

    /// Highest z-index in the `kind` pool (0 when the pool is empty).
    #[must_use]
    pub fn max_z(&self, kind: ObjectKind) -> i64 {
        match kind {
            ObjectKind::Note => pool_max(&self.notes),
            ObjectKind::Photo => pool_max(&self.photos),
            ObjectKind::Sticker => pool_max(&self.stickers),
            ObjectKind::Doodle => pool_max(&self.doodles),
        }
    }

    /// The z-index that brings an object to the front of its pool, or
    /// `None` once the pool has reached `i64::MAX`.
    #[must_use]
    pub fn front_z(&self, kind: ObjectKind) -> Option<i64> {
        self.max_z(kind).checked_add(1)
    }

    /// Placements of one pool sorted by `(z_index, id)` for draw order.
    #[must_use]
    pub fn draw_order(&self, kind: ObjectKind) -> Vec<&Placement> {
        let mut pool: Vec<&Placement> = self
            .placements()
            .filter(|(k, _)| *k == kind)
            .map(|(_, p)| p)
            .collect();
        pool.sort_by(|a, b| a.z_index.cmp(&b.z_index).then_with(|| a.id.cmp(&b.id)));
        pool
    }

    /// Total number of placed objects across all kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notes.len() + self.photos.len() + self.stickers.len() + self.doodles.len()
    }

    /// Returns `true` if no objects are placed (song and flag are ignored).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Title and artist for the player, falling back to placeholders.
    #[must_use]
    pub fn song_label(&self) -> (&str, &str) {
        match &self.song {
            Some(song) => (song.title.as_str(), song.artist.as_str()),
            None => (PLACEHOLDER_SONG_TITLE, PLACEHOLDER_SONG_ARTIST),
        }
    }

    /// Describe the first broken invariant, if any: a repeated id, a
    /// negative z-index, a non-positive scale, or a non-finite position or
    /// rotation.
    #[must_use]
    pub fn integrity_violation(&self) -> Option<String> {
        let mut seen = HashSet::new();
        for (kind, p) in self.placements() {
            if !seen.insert(p.id.as_str()) {
                return Some(format!("duplicate id {}", p.id));
            }
            if p.z_index < 0 {
                return Some(format!("{kind} {} has negative z-index {}", p.id, p.z_index));
            }
            if !(p.scale.is_finite() && p.scale > 0.0) {
                return Some(format!("{kind} {} has invalid scale {}", p.id, p.scale));
            }
            if !(p.position.x.is_finite() && p.position.y.is_finite() && p.rotation.is_finite()) {
                return Some(format!("{kind} {} has a non-finite position or rotation", p.id));
            }
        }
        None
    }

    /// Note lookup by id.
    #[must_use]
    pub fn note(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id() == id)
    }
}

fn find<'a, T: Placed>(items: &'a [T], id: &str) -> Option<&'a Placement> {
    items.iter().find(|item| item.id() == id).map(Placed::placement)
}

fn find_mut<'a, T: Placed>(items: &'a mut [T], id: &str) -> Option<&'a mut Placement> {
    items
        .iter_mut()
        .find(|item| item.id() == id)
        .map(Placed::placement_mut)
}

fn remove<T: Placed>(items: &mut Vec<T>, id: &str) -> bool {
    let before = items.len();
    items.retain(|item| item.id() != id);
    items.len() != before
}
