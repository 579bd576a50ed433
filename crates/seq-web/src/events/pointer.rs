use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

use glam::Vec2;
use instant::Instant;
use seq_core::constants::{SPLIT_DRAG_MAX_PERCENT, SPLIT_DRAG_MIN_PERCENT};
use seq_core::{CellKey, DropOutcome, Throttle};

use super::{apply_ops, Wiring};
use crate::constants::{CLICK_MAX_DRIFT_PX, CLICK_MAX_DURATION_MS, SPLIT_MOVE_MIN_GAP_MS};
use crate::dom;

/// What the active pointer is committed to. One pointer interaction at a
/// time; a second pointer going down mid-gesture is ignored.
#[derive(Clone, Copy)]
enum PointerMode {
    Idle,
    NoteDrag,
    DividerDrag,
    /// Went down on an occupied cell; becomes a mute toggle if released
    /// quickly and nearby.
    CellPress {
        cell: CellKey,
        start: Vec2,
        pressed: Instant,
    },
}

pub fn wire_pointer_handlers(w: &Wiring) {
    let mode = Rc::new(RefCell::new(PointerMode::Idle));
    // Divider moves arrive per pointer sample; one split update per frame
    // is plenty, the release handler lands the exact final position.
    let split_throttle = Rc::new(RefCell::new(Throttle::new(SPLIT_MOVE_MIN_GAP_MS)));
    wire_stage_pointerdown(w, &mode);
    wire_divider_pointerdown(w, &mode, &split_throttle);
    wire_pointermove(w, &mode, &split_throttle);
    wire_pointerup(w, &mode);
    wire_pointercancel(w, &mode);
}

fn wire_stage_pointerdown(w: &Wiring, mode: &Rc<RefCell<PointerMode>>) {
    let w = w.clone();
    let mode = mode.clone();
    let stage_for_listener = w.dom.stage.clone();

    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        if !matches!(*mode.borrow(), PointerMode::Idle) {
            return;
        }
        let pos = dom::pointer_stage_px(&ev, &w.dom.stage);

        let next = {
            let mut session = w.session.borrow_mut();
            if let Some(number) = session.notes.hit_test(pos) {
                if session.begin_drag(number, pos) {
                    log::info!("[pointer] begin drag on note {number}");
                    Some(PointerMode::NoteDrag)
                } else {
                    None
                }
            } else if let Some(cell) = session.stage.cell_at(pos) {
                // Arm a click only on occupied cells; empty ones have
                // nothing to toggle.
                session.grid.occupant(cell).is_some().then(|| PointerMode::CellPress {
                    cell,
                    start: pos,
                    pressed: Instant::now(),
                })
            } else {
                None
            }
        };

        if let Some(next) = next {
            *mode.borrow_mut() = next;
            _ = w.dom.stage.set_pointer_capture(ev.pointer_id());
        }
        ev.prevent_default();
    }) as Box<dyn FnMut(_)>);
    _ = stage_for_listener
        .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
    closure.forget();
}

// The divider sits inside the stage, so this handler must win over the stage
// one: it claims the gesture and stops the event from bubbling up.
fn wire_divider_pointerdown(
    w: &Wiring,
    mode: &Rc<RefCell<PointerMode>>,
    split_throttle: &Rc<RefCell<Throttle>>,
) {
    let mode = mode.clone();
    let split_throttle = split_throttle.clone();
    let divider = w.dom.divider.clone();
    let divider_for_listener = w.dom.divider.clone();

    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        ev.stop_propagation();
        if !matches!(*mode.borrow(), PointerMode::Idle) {
            return;
        }
        *mode.borrow_mut() = PointerMode::DividerDrag;
        split_throttle.borrow_mut().reset();
        _ = divider.set_pointer_capture(ev.pointer_id());
        ev.prevent_default();
        log::info!("[pointer] begin divider drag");
    }) as Box<dyn FnMut(_)>);
    _ = divider_for_listener
        .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
    closure.forget();
}

fn wire_pointermove(
    w: &Wiring,
    mode: &Rc<RefCell<PointerMode>>,
    split_throttle: &Rc<RefCell<Throttle>>,
) {
    let w = w.clone();
    let mode = mode.clone();
    let split_throttle = split_throttle.clone();

    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        let pos = dom::pointer_stage_px(&ev, &w.dom.stage);
        match *mode.borrow() {
            PointerMode::NoteDrag => {
                w.session.borrow_mut().drag_pointer(pos);
            }
            PointerMode::DividerDrag => {
                if !split_throttle.borrow_mut().ready(dom::now_ms()) {
                    return;
                }
                apply_divider_position(&w, pos.x);
            }
            PointerMode::CellPress { .. } | PointerMode::Idle => {}
        }
    }) as Box<dyn FnMut(_)>);

    if let Some(wnd) = web::window() {
        _ = wnd.add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}

fn apply_divider_position(w: &Wiring, stage_x: f32) {
    let width = w.session.borrow().stage.size().x;
    if width > 0.0 {
        let percent =
            (stage_x / width * 100.0).clamp(SPLIT_DRAG_MIN_PERCENT, SPLIT_DRAG_MAX_PERCENT);
        w.session.borrow_mut().set_split(percent);
    }
}

fn wire_pointerup(w: &Wiring, mode: &Rc<RefCell<PointerMode>>) {
    let w = w.clone();
    let mode = mode.clone();

    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        let prev = std::mem::replace(&mut *mode.borrow_mut(), PointerMode::Idle);
        match prev {
            PointerMode::NoteDrag => {
                let resolution = w.session.borrow_mut().release_drag();
                if let Some(res) = resolution {
                    match res.outcome {
                        DropOutcome::InCell(cell) => log::info!(
                            "[pointer] note {} sequenced into cell {} ({})",
                            res.note,
                            cell.position,
                            cell.player
                        ),
                        DropOutcome::CrossedSides { from, to } => {
                            log::info!("[pointer] note {} migrated {from} -> {to}", res.note)
                        }
                        DropOutcome::SnappedBack => {
                            log::info!("[pointer] note {} released free", res.note)
                        }
                    }
                    apply_ops(&w, &res.ops);
                }
            }
            PointerMode::DividerDrag => {
                // The last few moves may have been throttled away; land the
                // divider exactly where the pointer let go.
                let pos = dom::pointer_stage_px(&ev, &w.dom.stage);
                apply_divider_position(&w, pos.x);
                let percent = w.session.borrow().split.percent();
                log::info!("[pointer] divider released at {percent:.1}%");
            }
            PointerMode::CellPress { cell, start, pressed } => {
                let pos = dom::pointer_stage_px(&ev, &w.dom.stage);
                let drift = pos.distance(start);
                let held_ms = pressed.elapsed().as_secs_f64() * 1000.0;
                if drift <= CLICK_MAX_DRIFT_PX && held_ms <= CLICK_MAX_DURATION_MS {
                    let ops = w.session.borrow_mut().toggle_cell(cell);
                    log::info!("[click] toggle cell {} ({})", cell.position, cell.player);
                    apply_ops(&w, &ops);
                }
            }
            PointerMode::Idle => {}
        }
        ev.prevent_default();
    }) as Box<dyn FnMut(_)>);

    if let Some(wnd) = web::window() {
        _ = wnd.add_event_listener_with_callback("pointerup", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}

// A canceled pointer still has to resolve a live drag; an armed cell press
// is simply dropped.
fn wire_pointercancel(w: &Wiring, mode: &Rc<RefCell<PointerMode>>) {
    let w = w.clone();
    let mode = mode.clone();

    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |_ev: web::PointerEvent| {
        let prev = std::mem::replace(&mut *mode.borrow_mut(), PointerMode::Idle);
        match prev {
            PointerMode::NoteDrag => {
                if let Some(res) = w.session.borrow_mut().release_drag() {
                    log::info!("[pointer] drag of note {} canceled", res.note);
                    apply_ops(&w, &res.ops);
                }
            }
            PointerMode::DividerDrag => log::info!("[pointer] divider drag canceled"),
            PointerMode::CellPress { .. } | PointerMode::Idle => {}
        }
    }) as Box<dyn FnMut(_)>);

    if let Some(wnd) = web::window() {
        _ = wnd.add_event_listener_with_callback("pointercancel", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}
