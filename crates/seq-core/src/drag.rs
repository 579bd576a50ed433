//! Note drag state machine.
//!
//! One drag at a time: a grab either starts a drag or is refused. Every
//! animation frame the dragged note chases the latest pointer position with a
//! constant easing factor, re-evaluates which side of the divider it is on
//! and which cell (if any) would accept it. Release resolves into exactly one
//! of three outcomes and always leaves the controller idle, whatever else
//! happens.

use glam::Vec2;

use crate::config::Player;
use crate::constants::{DRAG_APPROACH_FACTOR, DRAG_SNAP_EPSILON_PX, NOTE_SIZE_PX};
use crate::grid::{CellKey, SequencerGrid};
use crate::note::{portal_opacity, NoteRegistry};
use crate::split::{ScreenSplit, StageGeometry};
use crate::timing::approach_vec2;

/// How a drag ended.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DropOutcome {
    /// Released over the highlighted cell; the note gets sequenced.
    InCell(CellKey),
    /// Released free on the other side from where the drag began; the note
    /// and its attached children migrate for good.
    CrossedSides { from: Player, to: Player },
    /// Released anywhere else; the note settles where it is, hollow again.
    SnappedBack,
}

/// Per-frame summary of the active drag for the renderer.
#[derive(Clone, Copy, Debug)]
pub struct DragFrame {
    pub note: u32,
    pub pos: Vec2,
    pub side: Player,
    /// The note's center crossed the divider this frame.
    pub side_changed: bool,
    pub portal_opacity: f32,
    pub highlight: Option<CellKey>,
}

struct ActiveDrag {
    note: u32,
    /// Latest pointer position in stage coordinates.
    pointer: Vec2,
    /// Pointer minus note corner at grab time, so the note keeps its grip
    /// point under the finger.
    grab_offset: Vec2,
    start_side: Player,
    highlight: Option<CellKey>,
}

#[derive(Default)]
pub struct DragController {
    active: Option<ActiveDrag>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_note(&self) -> Option<u32> {
        self.active.as_ref().map(|drag| drag.note)
    }

    /// Try to start dragging `number` from `pointer`. Grabbing a still-nested
    /// child extracts it first; extraction is permanent for the session.
    pub fn begin(&mut self, number: u32, pointer: Vec2, notes: &mut NoteRegistry) -> bool {
        if self.active.is_some() {
            log::warn!("grab of note {number} ignored; another drag is active");
            return false;
        }
        let Some(note) = notes.get(number) else {
            log::warn!("grab of unknown note {number} ignored");
            return false;
        };
        if !note.is_free() {
            log::warn!("grab of sequenced note {number} ignored");
            return false;
        }
        let grab_offset = pointer - note.pos;
        let start_side = note.current;
        if notes.is_attached_child(number) {
            notes.extract(number);
        }
        notes.set_lifted(number, true);
        self.active = Some(ActiveDrag {
            note: number,
            pointer,
            grab_offset,
            start_side,
            highlight: None,
        });
        true
    }

    /// Record the newest pointer position. Cheap; the movement itself happens
    /// in [`DragController::frame_step`].
    pub fn set_pointer(&mut self, pointer: Vec2) {
        if let Some(drag) = self.active.as_mut() {
            drag.pointer = pointer;
        }
    }

    /// One easing step toward the pointer. Moves the note (and its attached
    /// children), updates side tracking and picks the drop highlight.
    pub fn frame_step(
        &mut self,
        notes: &mut NoteRegistry,
        split: &ScreenSplit,
        grid: &SequencerGrid,
        stage: &StageGeometry,
    ) -> Option<DragFrame> {
        let drag = self.active.as_mut()?;
        let current_pos = notes.get(drag.note)?.pos;
        let target = drag.pointer - drag.grab_offset;
        let mut pos = approach_vec2(current_pos, target, DRAG_APPROACH_FACTOR);
        if (target - pos).length() < DRAG_SNAP_EPSILON_PX {
            pos = target;
        }
        notes.move_to(drag.note, pos);

        let stage_width = stage.size().x;
        let center = pos + Vec2::splat(NOTE_SIZE_PX * 0.5);
        let side = split.side_of(center.x, stage_width);
        let side_changed = notes.get(drag.note).map_or(false, |note| note.current != side);
        if side_changed {
            notes.set_side(drag.note, side);
        }

        let has_children = notes.has_attached_children(drag.note);
        drag.highlight = stage
            .cell_at(center)
            .filter(|&cell| grid.can_drop(cell, drag.note, side, has_children));

        Some(DragFrame {
            note: drag.note,
            pos,
            side,
            side_changed,
            portal_opacity: portal_opacity(split.overlap_fraction(
                pos.x,
                NOTE_SIZE_PX,
                stage_width,
            )),
            highlight: drag.highlight,
        })
    }

    /// End the drag and classify it. The active state is taken before any
    /// other work, so no path out of here can leave a drag dangling.
    pub fn release(
        &mut self,
        notes: &mut NoteRegistry,
        split: &ScreenSplit,
        grid: &SequencerGrid,
        stage: &StageGeometry,
    ) -> Option<(u32, DropOutcome)> {
        let drag = self.active.take()?;
        notes.set_lifted(drag.note, false);
        let (center, current) = {
            let note = notes.get(drag.note)?;
            (note.center(), note.current)
        };
        let side = split.side_of(center.x, stage.size().x);
        if current != side {
            notes.set_side(drag.note, side);
        }

        let has_children = notes.has_attached_children(drag.note);
        let accepted = stage
            .cell_at(center)
            .filter(|&cell| grid.can_drop(cell, drag.note, side, has_children));
        let outcome = match accepted {
            Some(cell) => DropOutcome::InCell(cell),
            None if side != drag.start_side => DropOutcome::CrossedSides {
                from: drag.start_side,
                to: side,
            },
            None => DropOutcome::SnappedBack,
        };
        Some((drag.note, outcome))
    }
}
