//! DOM projection of the session model.
//!
//! The view keeps element handles and writes styles and classes; every
//! visual is derived from core state on the frame it is drawn, so there is
//! no view-side state to drift. Containers are assumed to cover the stage,
//! making stage-space pixel positions usable directly.

use web_sys as web;

use seq_core::constants::{NESTED_BADGE_SIZE_PX, NOTE_SIZE_PX};
use seq_core::note::{portal_clip_insets, portal_opacity};
use seq_core::{CellKey, DragFrame, Player, PulseOp, Session, Shape, ShapePreset};

use crate::constants::{DIVIDER_LAYER, NOTE_LAYER, NOTE_LIFTED_LAYER, PORTAL_LAYER};
use crate::dom::{append_div, StageDom};

struct BadgeDom {
    child: u32,
    on_body: web::Element,
    on_portal: web::Element,
}

struct NoteDom {
    number: u32,
    body: web::Element,
    /// Non-interactive counterpart in the opposite half.
    portal: web::Element,
    /// One badge per initially attached child. Attachment only shrinks, so
    /// extracted children simply stop being shown.
    badges: Vec<BadgeDom>,
    /// Half the body currently lives in.
    side: Player,
}

struct CellDom {
    key: CellKey,
    el: web::Element,
    /// Geometry portion of the style attribute. Pulse styling is layered on
    /// top of this string and a clear restores it exactly.
    base_style: String,
}

pub struct View {
    document: web::Document,
    dom: StageDom,
    notes: Vec<NoteDom>,
    cells: Vec<CellDom>,
}

impl View {
    /// Create the cell and note elements for a freshly built session.
    pub fn build(
        document: &web::Document,
        dom: &StageDom,
        session: &Session,
    ) -> anyhow::Result<Self> {
        let mut cells = Vec::new();
        for &key in session.grid.cell_keys() {
            let parent = match key.player {
                Player::A => &dom.grid_a,
                Player::B => &dom.grid_b,
            };
            let el = append_div(document, parent, "seq-cell")?;
            cells.push(CellDom {
                key,
                el,
                base_style: String::new(),
            });
        }

        let mut notes = Vec::new();
        for &number in session.notes.numbers() {
            let Some(note) = session.notes.get(number) else {
                continue;
            };
            let body = append_div(
                document,
                half_of(dom, note.current),
                &note_class("seq-note", note.shape, number),
            )?;
            body.set_text_content(Some(&number.to_string()));
            let portal = append_div(
                document,
                half_of(dom, note.current.opposite()),
                &note_class("seq-portal", note.shape, number),
            )?;
            portal.set_text_content(Some(&number.to_string()));

            let mut badges = Vec::new();
            for &child in session.notes.attached_children(number) {
                let class = badge_class(session, child);
                badges.push(BadgeDom {
                    child,
                    on_body: append_div(document, &body, &class)?,
                    on_portal: append_div(document, &portal, &class)?,
                });
            }
            notes.push(NoteDom {
                number,
                body,
                portal,
                badges,
                side: note.current,
            });
        }

        let mut view = Self {
            document: document.clone(),
            dom: dom.clone(),
            notes,
            cells,
        };
        view.apply_cell_geometry(session);
        Ok(view)
    }

    /// Remove every element this view created. Host-owned elements (special
    /// effects, the halves themselves) are left alone.
    pub fn teardown(&self) {
        for cell in &self.cells {
            cell.el.remove();
        }
        for entry in &self.notes {
            entry.body.remove();
            entry.portal.remove();
        }
    }

    /// Re-read cell rectangles from the stage geometry. Called after a
    /// resize and once at build.
    pub fn apply_cell_geometry(&mut self, session: &Session) {
        for cell in self.cells.iter_mut() {
            let Some(rect) = session.stage.cell_rect(cell.key) else {
                continue;
            };
            cell.base_style = format!(
                "position:absolute;left:{:.1}px;top:{:.1}px;width:{:.1}px;height:{:.1}px;",
                rect.min.x,
                rect.min.y,
                rect.width(),
                rect.max.y - rect.min.y,
            );
            _ = cell.el.set_attribute("style", &cell.base_style);
        }
    }

    /// Project the whole model onto the DOM. Called once per animation frame.
    pub fn sync(&mut self, session: &Session, drag: Option<&DragFrame>) {
        self.sync_split(session);
        self.sync_notes(session);
        self.sync_cells(session, drag);
    }

    /// Apply pulse ops in order. Style ops layer a transform and a glow var
    /// on top of the cell's base geometry; a clear restores the base exactly,
    /// leaving no override behind.
    pub fn apply_pulse_ops(&self, ops: &[PulseOp]) {
        for &op in ops {
            match op {
                PulseOp::Style { cell, preset } => {
                    if let Some(entry) = self.cell(cell) {
                        _ = entry
                            .el
                            .set_attribute("style", &styled(&entry.base_style, preset));
                    }
                }
                PulseOp::ClearStyle { cell } => {
                    if let Some(entry) = self.cell(cell) {
                        _ = entry.el.set_attribute("style", &entry.base_style);
                    }
                }
                PulseOp::ShowEffect { note } => self.set_effect_visible(note, true),
                PulseOp::HideEffect { note } => self.set_effect_visible(note, false),
            }
        }
    }

    fn sync_split(&self, session: &Session) {
        let percent = session.split.percent();
        // Each half is a full-size layer; the inset reveals its side of the
        // divider.
        _ = self.dom.half_a.set_attribute(
            "style",
            &format!("clip-path:inset(0 {:.2}% 0 0);", 100.0 - percent),
        );
        _ = self.dom.half_b.set_attribute(
            "style",
            &format!("clip-path:inset(0 0 0 {:.2}%);", percent),
        );
        let x = session.split.divider_x(session.stage.size().x);
        _ = self
            .dom
            .divider
            .set_attribute("style", &format!("left:{x:.1}px;z-index:{DIVIDER_LAYER};"));
    }

    fn sync_notes(&mut self, session: &Session) {
        let stage_width = session.stage.size().x;
        let divider_x = session.split.divider_x(stage_width);
        for entry in self.notes.iter_mut() {
            let Some(note) = session.notes.get(entry.number) else {
                continue;
            };

            // Sequenced notes are represented by their cell; a child hidden
            // by the side rule travels invisibly inside its holder.
            let visible = note.is_free() && !session.notes.hidden_by_side(entry.number);
            if !visible {
                hide(&entry.body);
                hide(&entry.portal);
                continue;
            }

            if entry.side != note.current {
                _ = half_of(&self.dom, note.current).append_child(&entry.body);
                _ = half_of(&self.dom, note.current.opposite()).append_child(&entry.portal);
                entry.side = note.current;
            }

            // Resting notes render hollow; lifting fills them in and raises
            // them above everything until release.
            let layer = if note.lifted {
                _ = entry.body.class_list().add_1("note-lifted");
                NOTE_LIFTED_LAYER
            } else {
                _ = entry.body.class_list().remove_1("note-lifted");
                NOTE_LAYER
            };
            _ = entry.body.set_attribute(
                "style",
                &format!(
                    "position:absolute;left:{:.1}px;top:{:.1}px;width:{:.0}px;height:{:.0}px;z-index:{layer};",
                    note.pos.x, note.pos.y, NOTE_SIZE_PX, NOTE_SIZE_PX,
                ),
            );

            let overlap = session
                .split
                .overlap_fraction(note.pos.x, NOTE_SIZE_PX, stage_width);
            let opacity = portal_opacity(overlap);
            if opacity <= f32::EPSILON {
                hide(&entry.portal);
            } else {
                let (clip_left, clip_right) =
                    portal_clip_insets(note.pos.x, NOTE_SIZE_PX, divider_x, note.current.opposite());
                _ = entry.portal.set_attribute(
                    "style",
                    &format!(
                        "position:absolute;left:{:.1}px;top:{:.1}px;width:{:.0}px;height:{:.0}px;\
                         z-index:{PORTAL_LAYER};opacity:{:.3};clip-path:inset(0 {:.1}px 0 {:.1}px);\
                         pointer-events:none;",
                        note.pos.x, note.pos.y, NOTE_SIZE_PX, NOTE_SIZE_PX, opacity, clip_right,
                        clip_left,
                    ),
                );
            }

            let attached = session.notes.attached_children(entry.number);
            let mut slot = 0usize;
            for badge in entry.badges.iter() {
                let shown = attached.contains(&badge.child)
                    && !note.lifted
                    && !session.notes.indicator_suppressed(badge.child);
                if !shown {
                    hide(&badge.on_body);
                    hide(&badge.on_portal);
                    continue;
                }
                let offset = note.badge_rect(slot).min - note.pos;
                slot += 1;
                let style = format!(
                    "position:absolute;left:{:.1}px;top:{:.1}px;width:{:.0}px;height:{:.0}px;",
                    offset.x, offset.y, NESTED_BADGE_SIZE_PX, NESTED_BADGE_SIZE_PX,
                );
                _ = badge.on_body.set_attribute("style", &style);
                _ = badge.on_portal.set_attribute("style", &style);
            }
        }
    }

    fn sync_cells(&self, session: &Session, drag: Option<&DragFrame>) {
        let highlight = drag.and_then(|frame| frame.highlight);
        let playing = session.tracks.is_playing();
        let step_position = session.current_step() + 1;
        for cell in self.cells.iter() {
            let cl = cell.el.class_list();
            match session.grid.occupant(cell.key) {
                Some(state) if state.active => {
                    _ = cl.add_1("cell-filled");
                    _ = cl.remove_1("cell-muted");
                }
                Some(_) => {
                    _ = cl.add_1("cell-filled");
                    _ = cl.add_1("cell-muted");
                }
                None => {
                    _ = cl.remove_1("cell-filled");
                    _ = cl.remove_1("cell-muted");
                }
            }
            if highlight == Some(cell.key) {
                _ = cl.add_1("cell-highlight");
            } else {
                _ = cl.remove_1("cell-highlight");
            }
            if playing && cell.key.position == step_position {
                _ = cl.add_1("cell-step");
            } else {
                _ = cl.remove_1("cell-step");
            }
        }
    }

    fn cell(&self, key: CellKey) -> Option<&CellDom> {
        self.cells.iter().find(|cell| cell.key == key)
    }

    /// Special-effect elements belong to the host page, one per note number.
    /// A missing element is simply skipped.
    fn set_effect_visible(&self, note: u32, visible: bool) {
        let id = format!("note-effect-{note}");
        let Some(el) = self.document.get_element_by_id(&id) else {
            return;
        };
        let cl = el.class_list();
        if visible {
            _ = cl.remove_1("hidden");
            _ = el.set_attribute("style", "");
        } else {
            _ = cl.add_1("hidden");
            _ = el.set_attribute("style", "display:none");
        }
    }
}

fn half_of(dom: &StageDom, side: Player) -> &web::Element {
    match side {
        Player::A => &dom.half_a,
        Player::B => &dom.half_b,
    }
}

fn note_class(kind: &str, shape: Shape, number: u32) -> String {
    format!("{kind} {} note-{number}", shape.css_class())
}

fn badge_class(session: &Session, child: u32) -> String {
    match session.notes.get(child) {
        Some(note) => format!("seq-badge {}", note.shape.css_class()),
        None => "seq-badge".to_owned(),
    }
}

fn styled(base: &str, preset: ShapePreset) -> String {
    format!(
        "{base}transform:scale({:.3}) rotate({:.1}deg);--pulse-glow:{:.2};",
        preset.scale, preset.rotation_deg, preset.glow,
    )
}

#[inline]
fn hide(el: &web::Element) {
    _ = el.set_attribute("style", "display:none");
}
