//! Notes, shapes and the note registry.
//!
//! The registry is the authoritative model of every draggable note: where it
//! sits on the stage, which side it is on, whether it is sequenced into a
//! cell and which notes are still nested inside which. The DOM layer renders
//! from this state and never stores anything of its own.

use fnv::FnvHashMap;
use glam::Vec2;
use smallvec::SmallVec;

use crate::config::{MusicConfig, Player};
use crate::constants::{
    NESTED_BADGE_INSET_PX, NESTED_BADGE_SIZE_PX, NOTE_COLUMNS, NOTE_SIZE_PX, NOTE_TRAY_MARGIN_X,
    NOTE_TRAY_ORIGIN_Y, NOTE_TRAY_STEP_X, NOTE_TRAY_STEP_Y,
};
use crate::split::Rect;
use crate::timing::clamp_unit;

/// Display shape of a note, decided by its number.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Shape {
    Triangle,
    Diamond,
    Circle,
    Square,
}

impl Shape {
    pub fn for_note(number: u32) -> Self {
        match number {
            1 | 5 => Shape::Triangle,
            2 => Shape::Diamond,
            4 => Shape::Circle,
            _ => Shape::Square,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Shape::Triangle => "shape-triangle",
            Shape::Diamond => "shape-diamond",
            Shape::Circle => "shape-circle",
            Shape::Square => "shape-square",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Note {
    pub number: u32,
    pub shape: Shape,
    /// Side the config assigned this note to. Never changes.
    pub home: Player,
    /// Side the note is physically on right now. Tracks the center during a
    /// drag and flips permanently on a cross-side drop.
    pub current: Player,
    /// Stage-space top-left corner.
    pub pos: Vec2,
    /// Cell position occupied when the note has been sequenced.
    pub in_cell: Option<u32>,
    /// Raised above everything else while dragged.
    pub lifted: bool,
}

impl Note {
    pub fn rect(&self) -> Rect {
        Rect::from_min_size(self.pos, Vec2::splat(NOTE_SIZE_PX))
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(NOTE_SIZE_PX * 0.5)
    }

    /// A free note still sits on the stage; a sequenced one is represented
    /// by its cell instead.
    pub fn is_free(&self) -> bool {
        self.in_cell.is_none()
    }

    /// Rectangle of the indicator badge for the attached child in `slot`,
    /// stacked down the note's right edge.
    pub fn badge_rect(&self, slot: usize) -> Rect {
        let x = self.pos.x + NOTE_SIZE_PX - NESTED_BADGE_INSET_PX - NESTED_BADGE_SIZE_PX;
        let y = self.pos.y
            + NESTED_BADGE_INSET_PX
            + slot as f32 * (NESTED_BADGE_SIZE_PX + NESTED_BADGE_INSET_PX);
        Rect::from_min_size(Vec2::new(x, y), Vec2::splat(NESTED_BADGE_SIZE_PX))
    }
}

/// Whether an attached child is hidden, given the side the note holding it is
/// on. A child only shows while its holder is on the child's native side; on
/// the opposite side it travels invisibly inside the holder. One rule, applied
/// the same way mid-drag and after a drop.
pub fn nested_child_hidden(child_home: Player, holder_current: Player) -> bool {
    holder_current == child_home.opposite()
}

/// Opacity of a note's portal counterpart for a given divider overlap.
pub fn portal_opacity(overlap_fraction: f32) -> f32 {
    clamp_unit(overlap_fraction)
}

/// Clip insets `(left, right)` in stage px for a portal counterpart, so only
/// the slice of the note past the divider shows on the opposite side.
pub fn portal_clip_insets(left: f32, width: f32, divider_x: f32, shown_on: Player) -> (f32, f32) {
    match shown_on {
        Player::A => (0.0, (left + width - divider_x).clamp(0.0, width)),
        Player::B => ((divider_x - left).clamp(0.0, width), 0.0),
    }
}

pub struct NoteRegistry {
    notes: FnvHashMap<u32, Note>,
    /// Config order, player A's notes first. Doubles as stacking order for
    /// hit testing, bottom to top.
    order: Vec<u32>,
    children: FnvHashMap<u32, SmallVec<[u32; 4]>>,
    parent: FnvHashMap<u32, u32>,
}

impl NoteRegistry {
    /// Build the initial layout for a config: free notes fill a two-column
    /// tray on their home side, nested children sit exactly on the note at
    /// the root of their attachment chain.
    pub fn from_config(config: &MusicConfig, stage_size: Vec2) -> Self {
        let mut children: FnvHashMap<u32, SmallVec<[u32; 4]>> = FnvHashMap::default();
        let mut parent: FnvHashMap<u32, u32> = FnvHashMap::default();
        for (&holder, kids) in config.nested_items.iter() {
            for &kid in kids.iter() {
                parent.insert(kid, holder);
            }
            children.insert(holder, SmallVec::from_slice(kids));
        }

        let mut notes = FnvHashMap::default();
        let mut order = Vec::with_capacity(config.note_count());
        for player in [Player::A, Player::B] {
            let mut slot = 0usize;
            for &number in config.notes_for(player) {
                let pos = if parent.contains_key(&number) {
                    Vec2::ZERO // settled onto the chain root below
                } else {
                    let at = tray_slot_pos(player, slot, stage_size);
                    slot += 1;
                    at
                };
                notes.insert(
                    number,
                    Note {
                        number,
                        shape: Shape::for_note(number),
                        home: player,
                        current: player,
                        pos,
                        in_cell: None,
                        lifted: false,
                    },
                );
                order.push(number);
            }
        }

        let mut registry = Self {
            notes,
            order,
            children,
            parent,
        };
        registry.settle_attached();
        registry
    }

    /// Snap every attached child onto its chain root and adopt the root's
    /// physical side.
    fn settle_attached(&mut self) {
        for number in self.order.clone() {
            let mut root = number;
            while let Some(&up) = self.parent.get(&root) {
                root = up;
            }
            if root == number {
                continue;
            }
            let (pos, current) = match self.notes.get(&root) {
                Some(note) => (note.pos, note.current),
                None => continue,
            };
            if let Some(note) = self.notes.get_mut(&number) {
                note.pos = pos;
                note.current = current;
            }
        }
    }

    pub fn get(&self, number: u32) -> Option<&Note> {
        self.notes.get(&number)
    }

    pub fn get_mut(&mut self, number: u32) -> Option<&mut Note> {
        self.notes.get_mut(&number)
    }

    pub fn numbers(&self) -> &[u32] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = &Note> + '_ {
        self.order.iter().filter_map(|number| self.notes.get(number))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn attached_children(&self, parent: u32) -> &[u32] {
        self.children
            .get(&parent)
            .map(|kids| kids.as_slice())
            .unwrap_or(&[])
    }

    pub fn parent_of(&self, child: u32) -> Option<u32> {
        self.parent.get(&child).copied()
    }

    pub fn is_attached_child(&self, number: u32) -> bool {
        self.parent.contains_key(&number)
    }

    pub fn has_attached_children(&self, number: u32) -> bool {
        self.children
            .get(&number)
            .map_or(false, |kids| !kids.is_empty())
    }

    /// A child's indicator badge is withheld while its parent is itself still
    /// attached to a grandparent.
    pub fn indicator_suppressed(&self, child: u32) -> bool {
        self.parent_of(child)
            .map_or(false, |holder| self.is_attached_child(holder))
    }

    /// Whether an attached child is currently hidden by the side rule. Free
    /// notes are never hidden.
    pub fn hidden_by_side(&self, number: u32) -> bool {
        match (self.notes.get(&number), self.parent_of(number)) {
            (Some(note), Some(holder)) => self
                .notes
                .get(&holder)
                .map_or(false, |held_by| nested_child_hidden(note.home, held_by.current)),
            _ => false,
        }
    }

    /// Permanently detach `child` from its parent. Relationships only ever
    /// shrink; there is no way to re-attach within a session.
    pub fn extract(&mut self, child: u32) -> bool {
        let Some(holder) = self.parent.remove(&child) else {
            return false;
        };
        if let Some(kids) = self.children.get_mut(&holder) {
            kids.retain(|&mut kid| kid != child);
            if kids.is_empty() {
                self.children.remove(&holder);
            }
        }
        true
    }

    /// The note plus every still-attached descendant, in attachment order.
    pub fn subtree(&self, root: u32) -> SmallVec<[u32; 8]> {
        let mut out: SmallVec<[u32; 8]> = SmallVec::new();
        out.push(root);
        let mut cursor = 0;
        while cursor < out.len() {
            let holder = out[cursor];
            cursor += 1;
            for &kid in self.attached_children(holder) {
                out.push(kid);
            }
        }
        out
    }

    /// Move a note, carrying its attached subtree with it.
    pub fn move_to(&mut self, number: u32, pos: Vec2) {
        for member in self.subtree(number) {
            if let Some(note) = self.notes.get_mut(&member) {
                note.pos = pos;
            }
        }
    }

    /// Put a note (and its attached subtree) on a side.
    pub fn set_side(&mut self, number: u32, side: Player) {
        for member in self.subtree(number) {
            if let Some(note) = self.notes.get_mut(&member) {
                note.current = side;
            }
        }
    }

    pub fn set_lifted(&mut self, number: u32, lifted: bool) {
        if let Some(note) = self.notes.get_mut(&number) {
            note.lifted = lifted;
        }
    }

    /// Topmost grabbable note at a stage point.
    ///
    /// Attached children stack above their holders, so a grab on a nest takes
    /// the deepest visible child first; repeated grabs peel the nest apart one
    /// note at a time. Children hidden by the side rule and sequenced notes
    /// are not grabbable.
    pub fn hit_test(&self, p: Vec2) -> Option<u32> {
        let mut best: Option<(usize, usize, u32)> = None;
        for (index, &number) in self.order.iter().enumerate() {
            let Some(note) = self.notes.get(&number) else {
                continue;
            };
            if !note.is_free() || !note.rect().contains(p) {
                continue;
            }
            if self.hidden_by_side(number) {
                continue;
            }
            let depth = self.depth(number);
            if best.map_or(true, |(d, i, _)| (depth, index) > (d, i)) {
                best = Some((depth, index, number));
            }
        }
        best.map(|(_, _, number)| number)
    }

    fn depth(&self, number: u32) -> usize {
        let mut depth = 0;
        let mut cursor = number;
        while let Some(&up) = self.parent.get(&cursor) {
            depth += 1;
            cursor = up;
        }
        depth
    }
}

/// Tray position for the `slot`-th free note on a side. Two columns, anchored
/// to the side's outer edge so trays stay clear of the divider's travel.
pub fn tray_slot_pos(player: Player, slot: usize, stage_size: Vec2) -> Vec2 {
    let column = (slot as u32 % NOTE_COLUMNS) as f32;
    let row = (slot as u32 / NOTE_COLUMNS) as f32;
    let y = NOTE_TRAY_ORIGIN_Y + row * NOTE_TRAY_STEP_Y;
    let x = match player {
        Player::A => NOTE_TRAY_MARGIN_X + column * NOTE_TRAY_STEP_X,
        Player::B => {
            stage_size.x - NOTE_TRAY_MARGIN_X - NOTE_SIZE_PX - column * NOTE_TRAY_STEP_X
        }
    };
    Vec2::new(x, y)
}
