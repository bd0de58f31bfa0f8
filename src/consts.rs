//! Shared numeric constants for the editing engine.

// ── Units ───────────────────────────────────────────────────────

/// Screen pixels per real-world foot.
pub const PX_PER_FOOT: f64 = 14.0;

/// Wall thickness in feet.
pub const WALL_THICKNESS_FT: f64 = 0.7;

/// Wall thickness in pixels. Fixed per wall at creation.
pub const WALL_THICKNESS_PX: f64 = WALL_THICKNESS_FT * PX_PER_FOOT;

// ── Placement ───────────────────────────────────────────────────

/// Width of a freshly placed textbox, in pixels.
pub const TEXTBOX_DEFAULT_WIDTH: f64 = 200.0;

/// Display height of a freshly placed textbox, in pixels.
pub const TEXTBOX_DEFAULT_HEIGHT: f64 = 40.0;

/// Font size of a freshly placed textbox.
pub const TEXTBOX_DEFAULT_FONT_SIZE: f64 = 16.0;

/// Placeholder text of a freshly placed textbox.
pub const TEXTBOX_DEFAULT_TEXT: &str = "Double Click to Edit";

/// Edge length of a freshly placed symbol, in pixels. Symbols are centered on the pointer.
pub const SYMBOL_SIZE: f64 = 50.0;

/// Offset applied in both axes when pasting a copied entity.
pub const PASTE_OFFSET_PX: f64 = 30.0;

// ── History / persistence ───────────────────────────────────────

/// Default maximum number of history entries.
pub const HISTORY_CAPACITY: usize = 50;

/// Default trailing-debounce delay before an autosave write, in milliseconds.
pub const AUTOSAVE_DEBOUNCE_MS: u64 = 1000;

/// Name given to newly created projects.
pub const DEFAULT_PROJECT_NAME: &str = "Untitled Project";

// ── Hit-testing ─────────────────────────────────────────────────

/// Hit slop in pixels for thin geometry such as arrows.
pub const HIT_SLOP_PX: f64 = 6.0;
