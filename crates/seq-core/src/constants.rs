// Shared layout/timing tuning constants used by the model and the web frontend.

// Tempo
pub const MIN_BPM: f32 = 1.0; // lower guard for interval math
pub const MAX_CATCHUP_BEATS: u32 = 8; // most beats replayed after a stalled timer

// Screen split
pub const SPLIT_DEFAULT_PERCENT: f32 = 50.0;
pub const SPLIT_DRAG_MIN_PERCENT: f32 = 15.0; // divider drag stays inside this band
pub const SPLIT_DRAG_MAX_PERCENT: f32 = 85.0;

// Free-note layout (stage-space px)
pub const NOTE_SIZE_PX: f32 = 72.0; // square hit box for a free note
pub const NOTE_COLUMNS: u32 = 2; // fixed two-column home layout
pub const NOTE_TRAY_MARGIN_X: f32 = 36.0; // inset of a side's tray from its outer edge
pub const NOTE_TRAY_ORIGIN_Y: f32 = 96.0;
pub const NOTE_TRAY_STEP_X: f32 = 96.0;
pub const NOTE_TRAY_STEP_Y: f32 = 96.0;

// Nested-child badge shown on a parent note (stage-space px, relative to note)
pub const NESTED_BADGE_SIZE_PX: f32 = 24.0;
pub const NESTED_BADGE_INSET_PX: f32 = 4.0; // from the parent's top-right corner

// Sequencer cells (stage-space px)
pub const CELL_SIZE_PX: f32 = 84.0;
pub const CELL_STEP_X: f32 = 100.0;
pub const CELL_ROW_INSET_Y: f32 = 120.0; // row distance from the stage bottom
pub const CELL_ROW_MARGIN_X: f32 = 48.0; // inset of a side's cell row from its outer edge

// Drag feel
pub const DRAG_APPROACH_FACTOR: f32 = 0.1; // fraction of remaining distance per frame
pub const DRAG_SNAP_EPSILON_PX: f32 = 0.5; // below this the note locks onto the target

// Pulse visuals
pub const DIAMOND_ROTATION_STEP_DEG: f32 = 45.0; // accrued once per active/rest pair
pub const FULL_TURN_DEG: f32 = 360.0;

// Audio
pub const GAIN_RAMP_SEC: f64 = 0.1; // linear ramp length for enable/disable
pub const DEFAULT_MASTER_VOLUME: f32 = 0.8;
