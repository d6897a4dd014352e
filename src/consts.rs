//! Shared constants for the magnifier crate.

// ── Zoom and glass ──────────────────────────────────────────────

/// Default magnification factor.
pub const DEFAULT_ZOOM: f64 = 3.0;

/// Lowest accepted zoom factor (no magnification).
pub const MIN_ZOOM: f64 = 1.0;

/// Highest accepted zoom factor.
pub const MAX_ZOOM: f64 = 20.0;

/// Default glass diameter in CSS pixels.
pub const DEFAULT_DIAMETER_PX: f64 = 300.0;

/// Smallest accepted glass diameter in CSS pixels.
pub const MIN_DIAMETER_PX: f64 = 50.0;

/// Largest accepted glass diameter in CSS pixels.
pub const MAX_DIAMETER_PX: f64 = 1000.0;

/// Default border width in CSS pixels.
pub const DEFAULT_BORDER_WIDTH_PX: f64 = 2.0;

/// Largest accepted border width in CSS pixels.
pub const MAX_BORDER_WIDTH_PX: f64 = 20.0;

/// Default border color.
pub const DEFAULT_BORDER_COLOR: &str = "#ffffff";

/// Distance between the cursor (or canvas edge) and a compass-placed glass, in CSS pixels.
pub const GLASS_GAP_PX: f64 = 20.0;

/// Corner radius of the rounded-square glass as a fraction of its diameter.
pub const ROUNDED_CORNER_RATIO: f64 = 0.12;

// ── Keyboard ────────────────────────────────────────────────────

/// Default key held to show the glass.
pub const DEFAULT_ACTIVATION_KEY: &str = "z";

/// Default key pressed to zero the manual offset.
pub const DEFAULT_RESET_KEY: &str = "r";

/// Default manual offset step in graph units.
pub const DEFAULT_OFFSET_STEP: i32 = 5;

/// Largest accepted manual offset step in graph units.
pub const MAX_OFFSET_STEP: i32 = 100;

/// Step multiplier applied while Shift is held.
pub const LARGE_STEP_MULTIPLIER: i32 = 5;

// ── Persistence ─────────────────────────────────────────────────

/// Storage key for the horizontal manual offset.
pub const STORAGE_KEY_OFFSET_X: &str = "MagnifyGlass.OffsetX";

/// Storage key for the vertical manual offset.
pub const STORAGE_KEY_OFFSET_Y: &str = "MagnifyGlass.OffsetY";

// ── Startup ─────────────────────────────────────────────────────

/// Delay between attempts to locate the host canvas, in milliseconds.
pub const CANVAS_RETRY_DELAY_MS: u32 = 500;

/// Number of attempts to locate the host canvas before giving up.
pub const CANVAS_RETRY_LIMIT: u32 = 20;
