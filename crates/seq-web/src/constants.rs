// Web-layer tuning constants. Model-side geometry and timing live in
// seq-core's constants; only DOM concerns belong here.

// --- Timers ---
pub const RESIZE_DEBOUNCE_MS: f64 = 150.0; // quiet period after the last resize event
pub const SPLIT_MOVE_MIN_GAP_MS: f64 = 16.0; // divider moves faster than this are dropped

// --- Pointer classification ---
pub const CLICK_MAX_DRIFT_PX: f32 = 6.0; // presses that wander past this stop counting as clicks
pub const CLICK_MAX_DURATION_MS: f64 = 300.0; // presses held longer than this are not clicks

// --- Stacking order ---
pub const PORTAL_LAYER: i32 = 25; // portals sit just under their source notes
pub const NOTE_LAYER: i32 = 30;
pub const NOTE_LIFTED_LAYER: i32 = 60; // a dragged note rides above everything
pub const DIVIDER_LAYER: i32 = 80;
