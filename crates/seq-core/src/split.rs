//! Screen split position and stage geometry.
//!
//! The stage is one coordinate space shared by both screen halves; the
//! divider only decides where each half's clip ends. Cell rectangles are laid
//! out in stage space anchored to the outer edges, so moving the divider
//! never moves a cell.

use fnv::FnvHashMap;
use glam::Vec2;

use crate::config::Player;
use crate::constants::{
    CELL_ROW_INSET_Y, CELL_ROW_MARGIN_X, CELL_SIZE_PX, CELL_STEP_X, SPLIT_DEFAULT_PERCENT,
};
use crate::grid::CellKey;
use crate::timing::clamp_percent;

/// Axis-aligned rectangle in stage-space pixels.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn from_min_size(min: Vec2, size: Vec2) -> Self {
        Self {
            min,
            max: min + size,
        }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }
}

/// Divider position as a percentage of stage width given to player A.
#[derive(Clone, Copy, Debug)]
pub struct ScreenSplit {
    percent: f32,
}

impl Default for ScreenSplit {
    fn default() -> Self {
        Self {
            percent: SPLIT_DEFAULT_PERCENT,
        }
    }
}

impl ScreenSplit {
    pub fn new() -> Self {
        Self::default()
    }

    /// The one mutator for the split. Input is clamped to 0..=100; returns
    /// whether the stored value changed, so callers can skip redundant style
    /// writes.
    pub fn update(&mut self, percent: f32) -> bool {
        let clamped = clamp_percent(percent);
        if clamped == self.percent {
            return false;
        }
        self.percent = clamped;
        true
    }

    pub fn percent(&self) -> f32 {
        self.percent
    }

    /// Divider x in stage pixels.
    pub fn divider_x(&self, stage_width: f32) -> f32 {
        stage_width * self.percent / 100.0
    }

    /// Which side of the divider a stage x coordinate falls on.
    pub fn side_of(&self, x: f32, stage_width: f32) -> Player {
        if x < self.divider_x(stage_width) {
            Player::A
        } else {
            Player::B
        }
    }

    /// How strongly a note of `width` at `left` straddles the divider, in
    /// 0..=1. Zero when the note is fully on one side, one when it is
    /// centered on the divider, monotone in between on both approaches.
    pub fn overlap_fraction(&self, left: f32, width: f32, stage_width: f32) -> f32 {
        if width <= 0.0 {
            return 0.0;
        }
        let divider = self.divider_x(stage_width);
        let right = left + width;
        let penetration = (right - divider).min(divider - left);
        if penetration <= 0.0 {
            0.0
        } else {
            (2.0 * penetration / width).min(1.0)
        }
    }
}

/// Stage size plus the fixed rectangles of every sequencer cell.
pub struct StageGeometry {
    size: Vec2,
    cell_rects: FnvHashMap<CellKey, Rect>,
}

impl StageGeometry {
    pub fn new(size: Vec2, cells: &[CellKey]) -> Self {
        let mut geometry = Self {
            size,
            cell_rects: FnvHashMap::default(),
        };
        geometry.layout_cells(cells);
        geometry
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn resize(&mut self, size: Vec2, cells: &[CellKey]) {
        self.size = size;
        self.layout_cells(cells);
    }

    pub fn cell_rect(&self, key: CellKey) -> Option<Rect> {
        self.cell_rects.get(&key).copied()
    }

    /// Cell containing a stage point, if any.
    pub fn cell_at(&self, p: Vec2) -> Option<CellKey> {
        self.cell_rects
            .iter()
            .find(|(_, rect)| rect.contains(p))
            .map(|(key, _)| *key)
    }

    // Player A's row grows from the left edge, player B's ends at the right
    // edge, both reading left to right. Anchoring to the outer edges keeps
    // every cell on its own side's visible area for any divider position the
    // drag clamp allows.
    fn layout_cells(&mut self, cells: &[CellKey]) {
        self.cell_rects.clear();
        let y = self.size.y - CELL_ROW_INSET_Y;
        let count_b = cells.iter().filter(|key| key.player == Player::B).count();
        let row_width_b = count_b as f32 * CELL_STEP_X - (CELL_STEP_X - CELL_SIZE_PX);
        let start_b = self.size.x - CELL_ROW_MARGIN_X - row_width_b.max(0.0);

        let mut index_a = 0usize;
        let mut index_b = 0usize;
        for &key in cells {
            let x = match key.player {
                Player::A => {
                    let x = CELL_ROW_MARGIN_X + index_a as f32 * CELL_STEP_X;
                    index_a += 1;
                    x
                }
                Player::B => {
                    let x = start_b + index_b as f32 * CELL_STEP_X;
                    index_b += 1;
                    x
                }
            };
            self.cell_rects.insert(
                key,
                Rect::from_min_size(Vec2::new(x, y), Vec2::splat(CELL_SIZE_PX)),
            );
        }
    }
}
