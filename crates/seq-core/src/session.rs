//! The live session: one config driving notes, grid, pulse, drag and the
//! transport intent that the audio layer mirrors.
//!
//! Mutations return a [`SessionOps`] bundle listing, in order, the track
//! changes for the audio layer and the visual ops for the renderer. The
//! session always commits its own state before recording an effect, so by the
//! time a caller applies one, the model already reflects the mutation.

use fnv::FnvHashSet;
use glam::Vec2;
use smallvec::SmallVec;

use crate::config::{ConfigError, MusicConfig};
use crate::constants::DEFAULT_MASTER_VOLUME;
use crate::drag::{DragController, DragFrame, DropOutcome};
use crate::grid::{CellKey, GridEffect, SequencerGrid};
use crate::note::{NoteRegistry, Shape};
use crate::pulse::{PulseOp, PulseState};
use crate::split::{ScreenSplit, StageGeometry};
use crate::timing::clamp_unit;

/// Ordered side effects of one session mutation.
#[derive(Default, Debug)]
pub struct SessionOps {
    pub track_effects: Vec<GridEffect>,
    pub pulse_ops: Vec<PulseOp>,
}

impl SessionOps {
    pub fn is_empty(&self) -> bool {
        self.track_effects.is_empty() && self.pulse_ops.is_empty()
    }
}

/// Result of letting go of a dragged note.
pub struct DragResolution {
    pub note: u32,
    pub outcome: DropOutcome,
    pub ops: SessionOps,
}

/// Which tracks should be audible and whether the transport is rolling.
///
/// This is intent, not audio state: the web audio layer ramps its gains to
/// match this set and a session stays consistent even when audio is
/// unavailable.
pub struct TrackSet {
    enabled: FnvHashSet<u32>,
    master_volume: f32,
    playing: bool,
    started_once: bool,
}

impl Default for TrackSet {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackSet {
    pub fn new() -> Self {
        Self {
            enabled: FnvHashSet::default(),
            master_volume: DEFAULT_MASTER_VOLUME,
            playing: false,
            started_once: false,
        }
    }

    pub fn is_enabled(&self, note: u32) -> bool {
        self.enabled.contains(&note)
    }

    pub fn enabled(&self) -> &FnvHashSet<u32> {
        &self.enabled
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    /// True once playback has been started at least once this page load.
    pub fn started_once(&self) -> bool {
        self.started_once
    }

    pub fn mark_started(&mut self) {
        self.started_once = true;
    }

    pub fn master_volume(&self) -> f32 {
        self.master_volume
    }

    pub fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = clamp_unit(volume);
    }

    pub fn apply(&mut self, effect: GridEffect) {
        match effect {
            GridEffect::NoteActivated(note) => {
                self.enabled.insert(note);
            }
            GridEffect::NoteDeactivated(note) => {
                self.enabled.remove(&note);
            }
        }
    }

    fn clear(&mut self) {
        self.enabled.clear();
        self.playing = false;
    }
}

pub struct Session {
    config: MusicConfig,
    pub notes: NoteRegistry,
    pub grid: SequencerGrid,
    pub stage: StageGeometry,
    pub split: ScreenSplit,
    pub pulse: PulseState,
    pub drag: DragController,
    pub tracks: TrackSet,
    current_step: u32,
}

impl Session {
    pub fn new(config: MusicConfig, stage_size: Vec2) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = SequencerGrid::from_config(&config);
        let stage = StageGeometry::new(stage_size, grid.cell_keys());
        let notes = NoteRegistry::from_config(&config, stage_size);
        Ok(Self {
            config,
            notes,
            grid,
            stage,
            split: ScreenSplit::new(),
            pulse: PulseState::new(),
            drag: DragController::new(),
            tracks: TrackSet::new(),
            current_step: 0,
        })
    }

    pub fn config(&self) -> &MusicConfig {
        &self.config
    }

    pub fn current_step(&self) -> u32 {
        self.current_step
    }

    /// Swap the whole session over to a new config.
    ///
    /// The config is validated before anything is touched; a rejected config
    /// leaves the running session exactly as it was. On success every
    /// subsystem is rebuilt from scratch. The divider position, master volume
    /// and the started-once flag are user/page state and survive the swap.
    pub fn apply_config(&mut self, config: MusicConfig) -> Result<SessionOps, ConfigError> {
        config.validate()?;
        let mut ops = SessionOps::default();
        self.pulse.teardown(&mut ops.pulse_ops);
        self.grid = SequencerGrid::from_config(&config);
        self.stage.resize(self.stage.size(), self.grid.cell_keys());
        self.notes = NoteRegistry::from_config(&config, self.stage.size());
        self.drag = DragController::new();
        self.tracks.clear();
        self.current_step = 0;
        self.config = config;
        Ok(ops)
    }

    pub fn set_stage_size(&mut self, size: Vec2) {
        self.stage.resize(size, self.grid.cell_keys());
    }

    pub fn set_split(&mut self, percent: f32) -> bool {
        self.split.update(percent)
    }

    pub fn set_master_volume(&mut self, volume: f32) {
        self.tracks.set_master_volume(volume);
    }

    /// Sequence `note` into `cell`, evicting any previous occupant. The grid
    /// is updated first; the returned effects are already reflected in the
    /// track set and pulse effects when this returns.
    pub fn place_note(&mut self, cell: CellKey, note: u32) -> SessionOps {
        let mut ops = SessionOps::default();
        if self.notes.get(note).is_none() {
            log::warn!("place of unknown note {note} ignored");
            return ops;
        }
        let mut effects = Vec::new();
        if !self.grid.place(cell, note, &mut effects) {
            return ops;
        }
        if let Some(rect) = self.stage.cell_rect(cell) {
            self.notes.move_to(note, rect.min);
        }
        if let Some(state) = self.notes.get_mut(note) {
            state.in_cell = Some(cell.position);
        }
        self.apply_effects(effects, &mut ops);
        ops
    }

    /// Empty a cell; its note becomes a free note again where the cell sits.
    pub fn clear_cell(&mut self, cell: CellKey) -> SessionOps {
        let mut ops = SessionOps::default();
        let mut effects = Vec::new();
        if let Some(note) = self.grid.clear(cell, &mut effects) {
            if let Some(state) = self.notes.get_mut(note) {
                state.in_cell = None;
            }
        }
        self.apply_effects(effects, &mut ops);
        ops
    }

    /// Flip a cell between sounding and muted.
    pub fn toggle_cell(&mut self, cell: CellKey) -> SessionOps {
        let mut ops = SessionOps::default();
        let mut effects = Vec::new();
        self.grid.toggle(cell, &mut effects);
        self.apply_effects(effects, &mut ops);
        ops
    }

    /// Stop playback, clear every cell and restore the config's initial note
    /// layout, nesting included.
    pub fn reset(&mut self) -> SessionOps {
        let mut ops = SessionOps::default();
        self.tracks.set_playing(false);
        let mut effects = Vec::new();
        self.grid.reset(&mut effects);
        self.apply_effects(effects, &mut ops);
        self.pulse.teardown(&mut ops.pulse_ops);
        debug_assert!(self.tracks.enabled().is_empty());
        self.notes = NoteRegistry::from_config(&self.config, self.stage.size());
        self.drag = DragController::new();
        self.current_step = 0;
        ops
    }

    pub fn start_playback(&mut self, from_beginning: bool) {
        if from_beginning {
            self.current_step = 0;
        }
        self.tracks.set_playing(true);
        self.tracks.mark_started();
        self.pulse.start();
    }

    pub fn stop_playback(&mut self) -> SessionOps {
        let mut ops = SessionOps::default();
        self.tracks.set_playing(false);
        self.pulse.stop(&mut ops.pulse_ops);
        self.current_step = 0;
        ops
    }

    /// One beat from the timer: style the sounding cells and advance the step
    /// counter. Does nothing while the transport is stopped.
    pub fn beat_tick(&mut self) -> SessionOps {
        let mut ops = SessionOps::default();
        if !self.tracks.is_playing() {
            return ops;
        }
        let sounding: SmallVec<[(CellKey, Shape); 8]> = self
            .grid
            .occupied()
            .filter(|(_, state)| state.active)
            .filter_map(|(key, state)| self.notes.get(state.note).map(|note| (key, note.shape)))
            .collect();
        self.pulse.beat(&sounding, &mut ops.pulse_ops);
        self.current_step = (self.current_step + 1) % self.config.total_cells.max(1);
        ops
    }

    pub fn begin_drag(&mut self, note: u32, pointer: Vec2) -> bool {
        self.drag.begin(note, pointer, &mut self.notes)
    }

    pub fn drag_pointer(&mut self, pointer: Vec2) {
        self.drag.set_pointer(pointer);
    }

    /// Advance the active drag by one animation frame.
    pub fn drag_frame(&mut self) -> Option<DragFrame> {
        self.drag
            .frame_step(&mut self.notes, &self.split, &self.grid, &self.stage)
    }

    /// Let go of the dragged note and apply whatever the outcome demands.
    pub fn release_drag(&mut self) -> Option<DragResolution> {
        let (note, outcome) = self
            .drag
            .release(&mut self.notes, &self.split, &self.grid, &self.stage)?;
        let ops = match outcome {
            DropOutcome::InCell(cell) => self.place_note(cell, note),
            DropOutcome::CrossedSides { .. } | DropOutcome::SnappedBack => SessionOps::default(),
        };
        Some(DragResolution { note, outcome, ops })
    }

    fn apply_effects(&mut self, effects: Vec<GridEffect>, ops: &mut SessionOps) {
        for effect in effects {
            self.tracks.apply(effect);
            match effect {
                GridEffect::NoteActivated(note) => self.pulse.show_effect(note, &mut ops.pulse_ops),
                GridEffect::NoteDeactivated(note) => {
                    self.pulse.hide_effect(note, &mut ops.pulse_ops)
                }
            }
            ops.track_effects.push(effect);
        }
    }
}
