//! Shared constants for the board crate.

// ── Storage ─────────────────────────────────────────────────────

/// Fixed key under which the whole board document is persisted.
pub const STORAGE_KEY: &str = "scrapbookData";

// ── Defaults ────────────────────────────────────────────────────

/// Content of a freshly added note.
pub const DEFAULT_NOTE_CONTENT: &str = "Click to edit...";

/// Placeholder title shown by the player when no song is set.
pub const PLACEHOLDER_SONG_TITLE: &str = "Add your favorite song";

/// Placeholder artist shown by the player when no song is set.
pub const PLACEHOLDER_SONG_ARTIST: &str = "Artist name";

/// Scale assigned to newly created objects.
pub const DEFAULT_SCALE: f64 = 1.0;

// ── Spawn areas ─────────────────────────────────────────────────

/// Width of the random offset added to every spawn base, in pixels.
pub const SPAWN_JITTER_PX: f64 = 100.0;

/// Spawn base (both axes) for new notes.
pub const NOTE_SPAWN_PX: f64 = 100.0;

/// Spawn base (both axes) for new photos.
pub const PHOTO_SPAWN_PX: f64 = 150.0;

/// Spawn base (both axes) for new stickers.
pub const STICKER_SPAWN_PX: f64 = 200.0;

/// Spawn base (both axes) for new doodles.
pub const DOODLE_SPAWN_PX: f64 = 300.0;

// ── Rotation jitter ─────────────────────────────────────────────

/// Notes and photos are tilted up to this many degrees either way.
pub const PAPER_TILT_DEG: f64 = 5.0;

/// Stickers are tilted up to this many degrees either way.
pub const STICKER_TILT_DEG: f64 = 10.0;

// ── Initial board ───────────────────────────────────────────────

/// Number of doodles seeded onto a board that has never been saved.
pub const INITIAL_DOODLE_COUNT: usize = 5;

/// Board size assumed when seeding, before any layout is known.
pub const FALLBACK_BOARD_WIDTH: f64 = 800.0;

/// See [`FALLBACK_BOARD_WIDTH`].
pub const FALLBACK_BOARD_HEIGHT: f64 = 600.0;

/// Seeded doodles stay within this fraction of the board.
pub const SEED_AREA_FRACTION: f64 = 0.8;
