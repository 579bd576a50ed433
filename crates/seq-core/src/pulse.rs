//! Beat-synchronized pulse visuals.
//!
//! Each beat alternates between an active and a rest phase and produces a
//! list of [`PulseOp`]s for the renderer. The state remembers every cell it
//! has styled and every special effect it has shown, so stopping puts the
//! page back exactly as it found it and never leaves a stray transform
//! behind.

use fnv::FnvHashSet;
use smallvec::SmallVec;

use crate::constants::{DIAMOND_ROTATION_STEP_DEG, FULL_TURN_DEG};
use crate::grid::CellKey;
use crate::note::Shape;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PulsePhase {
    Active,
    Rest,
}

/// Visual parameters for one cell during one phase.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ShapePreset {
    pub scale: f32,
    pub rotation_deg: f32,
    pub glow: f32,
}

/// Renderer instruction, emitted in application order.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum PulseOp {
    Style { cell: CellKey, preset: ShapePreset },
    ClearStyle { cell: CellKey },
    ShowEffect { note: u32 },
    HideEffect { note: u32 },
}

/// Per-shape look for a phase. The diamond is the only shape that rotates;
/// its angle is carried in so it holds steady through rest phases.
pub fn preset_for(shape: Shape, phase: PulsePhase, diamond_rotation_deg: f32) -> ShapePreset {
    let rotation_deg = match shape {
        Shape::Diamond => diamond_rotation_deg,
        _ => 0.0,
    };
    match phase {
        PulsePhase::Active => ShapePreset {
            scale: match shape {
                Shape::Triangle => 1.2,
                Shape::Diamond => 1.15,
                Shape::Circle => 1.25,
                Shape::Square => 1.1,
            },
            rotation_deg,
            glow: 1.0,
        },
        PulsePhase::Rest => ShapePreset {
            scale: 1.0,
            rotation_deg,
            glow: 0.25,
        },
    }
}

pub struct PulseState {
    running: bool,
    /// Index of the next beat; even beats are active, odd beats rest.
    beats: u64,
    last_phase: PulsePhase,
    diamond_rotation_deg: f32,
    special_effects: FnvHashSet<u32>,
    styled_cells: FnvHashSet<CellKey>,
}

impl Default for PulseState {
    fn default() -> Self {
        Self::new()
    }
}

impl PulseState {
    pub fn new() -> Self {
        Self {
            running: false,
            beats: 0,
            last_phase: PulsePhase::Rest,
            diamond_rotation_deg: 0.0,
            special_effects: FnvHashSet::default(),
            styled_cells: FnvHashSet::default(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn phase(&self) -> PulsePhase {
        self.last_phase
    }

    pub fn diamond_rotation_deg(&self) -> f32 {
        self.diamond_rotation_deg
    }

    pub fn active_effects(&self) -> &FnvHashSet<u32> {
        &self.special_effects
    }

    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.beats = 0;
        self.last_phase = PulsePhase::Rest;
        self.diamond_rotation_deg = 0.0;
    }

    /// Advance one beat. `sounding` lists the occupied, active cells with
    /// their shapes; anything styled earlier that is no longer sounding gets
    /// an explicit clear first.
    pub fn beat(&mut self, sounding: &[(CellKey, Shape)], ops: &mut Vec<PulseOp>) {
        if !self.running {
            return;
        }
        let phase = if self.beats % 2 == 0 {
            PulsePhase::Active
        } else {
            PulsePhase::Rest
        };
        // One diamond turn step per completed active/rest pair, wrapping at a
        // full turn.
        let rotation =
            ((self.beats / 2) as f32 * DIAMOND_ROTATION_STEP_DEG) % FULL_TURN_DEG;
        self.beats += 1;
        self.last_phase = phase;
        self.diamond_rotation_deg = rotation;

        let stale: SmallVec<[CellKey; 8]> = self
            .styled_cells
            .iter()
            .filter(|key| !sounding.iter().any(|(cell, _)| cell == *key))
            .copied()
            .collect();
        for cell in stale {
            self.styled_cells.remove(&cell);
            ops.push(PulseOp::ClearStyle { cell });
        }

        for &(cell, shape) in sounding {
            self.styled_cells.insert(cell);
            ops.push(PulseOp::Style {
                cell,
                preset: preset_for(shape, phase, rotation),
            });
        }
    }

    /// Mark a note's hidden special-effect element visible. Follows cell
    /// placement, not the beat timer.
    pub fn show_effect(&mut self, note: u32, ops: &mut Vec<PulseOp>) {
        if self.special_effects.insert(note) {
            ops.push(PulseOp::ShowEffect { note });
        }
    }

    pub fn hide_effect(&mut self, note: u32, ops: &mut Vec<PulseOp>) {
        if self.special_effects.remove(&note) {
            ops.push(PulseOp::HideEffect { note });
        }
    }

    /// Halt the beat cycle and clear every transform it applied. Safe to call
    /// repeatedly. Special effects stay, since they belong to placement.
    pub fn stop(&mut self, ops: &mut Vec<PulseOp>) {
        for cell in std::mem::take(&mut self.styled_cells) {
            ops.push(PulseOp::ClearStyle { cell });
        }
        self.running = false;
        self.beats = 0;
        self.last_phase = PulsePhase::Rest;
        self.diamond_rotation_deg = 0.0;
    }

    /// Full reset for a config switch: stop plus hiding every special effect.
    pub fn teardown(&mut self, ops: &mut Vec<PulseOp>) {
        self.stop(ops);
        for note in std::mem::take(&mut self.special_effects) {
            ops.push(PulseOp::HideEffect { note });
        }
    }
}
