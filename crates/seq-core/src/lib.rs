pub mod config;
pub mod constants;
pub mod drag;
pub mod grid;
pub mod note;
pub mod pulse;
pub mod session;
pub mod split;
pub mod timing;

pub use config::{ConfigError, MusicConfig, Player};
pub use drag::{DragController, DragFrame, DropOutcome};
pub use grid::{CellKey, CellState, GridEffect, SequencerGrid};
pub use note::{Note, NoteRegistry, Shape};
pub use pulse::{PulseOp, PulsePhase, PulseState, ShapePreset};
pub use session::{DragResolution, Session, SessionOps, TrackSet};
pub use split::{Rect, ScreenSplit, StageGeometry};
pub use timing::{BeatClock, Debounce, Throttle};
