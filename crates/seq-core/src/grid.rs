//! Sequencer grid occupancy.
//!
//! The grid is the authoritative record of which note sits in which cell.
//! Mutations update occupancy first and report the resulting track changes as
//! an ordered list of [`GridEffect`]s; callers apply those to the audio layer
//! and pulse visuals afterwards, so occupancy is always committed before any
//! side effect runs.

use fnv::FnvHashMap;

use crate::config::{MusicConfig, Player};

/// Identity of one sequencer cell: screen position index plus owning side.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct CellKey {
    pub position: u32,
    pub player: Player,
}

impl CellKey {
    pub fn new(position: u32, player: Player) -> Self {
        Self { position, player }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CellState {
    pub note: u32,
    /// Toggled-off cells keep their note but contribute no sound or pulse.
    pub active: bool,
}

/// Track change requested by a grid mutation, in application order.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GridEffect {
    NoteActivated(u32),
    NoteDeactivated(u32),
}

pub struct SequencerGrid {
    cells: FnvHashMap<CellKey, CellState>,
    layout: Vec<CellKey>,
}

impl SequencerGrid {
    pub fn from_config(config: &MusicConfig) -> Self {
        let mut layout =
            Vec::with_capacity(config.player_a_cells.len() + config.player_b_cells.len());
        for player in [Player::A, Player::B] {
            for &position in config.cells_for(player) {
                layout.push(CellKey { position, player });
            }
        }
        Self {
            cells: FnvHashMap::default(),
            layout,
        }
    }

    /// All cells the active config defines, player A's first.
    pub fn cell_keys(&self) -> &[CellKey] {
        &self.layout
    }

    pub fn contains(&self, key: CellKey) -> bool {
        self.layout.contains(&key)
    }

    pub fn occupant(&self, key: CellKey) -> Option<CellState> {
        self.cells.get(&key).copied()
    }

    pub fn occupied(&self) -> impl Iterator<Item = (CellKey, CellState)> + '_ {
        self.layout
            .iter()
            .filter_map(|key| self.cells.get(key).map(|state| (*key, *state)))
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether a dragged note may be dropped into `key`.
    ///
    /// A drop needs the cell to exist, sit on the note's current side, match
    /// the note's number, and the note must not carry attached children.
    pub fn can_drop(
        &self,
        key: CellKey,
        note: u32,
        note_side: Player,
        has_attached_children: bool,
    ) -> bool {
        self.contains(key)
            && key.player == note_side
            && key.position == note
            && !has_attached_children
    }

    /// Put `note` into `key`, evicting any previous occupant first.
    pub fn place(&mut self, key: CellKey, note: u32, effects: &mut Vec<GridEffect>) -> bool {
        if !self.contains(key) {
            log::warn!("place into unknown cell {key:?} ignored");
            return false;
        }
        if let Some(prev) = self.cells.insert(key, CellState { note, active: true }) {
            if prev.active {
                effects.push(GridEffect::NoteDeactivated(prev.note));
            }
        }
        effects.push(GridEffect::NoteActivated(note));
        true
    }

    /// Empty a cell, returning the note that sat in it.
    pub fn clear(&mut self, key: CellKey, effects: &mut Vec<GridEffect>) -> Option<u32> {
        match self.cells.remove(&key) {
            Some(prev) => {
                if prev.active {
                    effects.push(GridEffect::NoteDeactivated(prev.note));
                }
                Some(prev.note)
            }
            None => {
                log::warn!("clear on empty cell {key:?} ignored");
                None
            }
        }
    }

    /// Flip a cell between sounding and muted without removing its note.
    pub fn toggle(&mut self, key: CellKey, effects: &mut Vec<GridEffect>) -> Option<bool> {
        match self.cells.get_mut(&key) {
            Some(state) => {
                state.active = !state.active;
                effects.push(if state.active {
                    GridEffect::NoteActivated(state.note)
                } else {
                    GridEffect::NoteDeactivated(state.note)
                });
                Some(state.active)
            }
            None => {
                log::warn!("toggle on empty cell {key:?} ignored");
                None
            }
        }
    }

    /// Clear every cell, deactivating whatever was sounding.
    pub fn reset(&mut self, effects: &mut Vec<GridEffect>) {
        for key in &self.layout {
            if let Some(prev) = self.cells.remove(key) {
                if prev.active {
                    effects.push(GridEffect::NoteDeactivated(prev.note));
                }
            }
        }
        debug_assert!(self.cells.is_empty());
    }
}
