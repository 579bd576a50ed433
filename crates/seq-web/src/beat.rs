//! The beat interval timer.
//!
//! A `setInterval` at the configured tempo drives `Session::beat_tick`; the
//! core clock decides how many beats are actually due each firing, so a
//! starved timer catches up smoothly instead of bursting.

use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

use seq_core::timing::beat_interval_ms;
use seq_core::{BeatClock, Session};

use crate::dom;
use crate::render::View;

#[derive(Default)]
pub struct BeatTimer {
    handle: Option<i32>,
    closure: Option<Closure<dyn FnMut()>>,
}

impl BeatTimer {
    pub fn new() -> Self {
        Self {
            handle: None,
            closure: None,
        }
    }

    /// Begin ticking at `bpm`. Restarts cleanly if already running, which is
    /// how a config switch picks up its new tempo.
    pub fn start(&mut self, bpm: f32, session: Rc<RefCell<Session>>, view: Rc<RefCell<View>>) {
        self.stop();
        let Some(window) = web::window() else {
            return;
        };
        let mut clock = BeatClock::new(bpm, dom::now_ms());
        let closure = Closure::wrap(Box::new(move || {
            let due = clock.due_beats(dom::now_ms());
            for _ in 0..due {
                let ops = session.borrow_mut().beat_tick();
                view.borrow().apply_pulse_ops(&ops.pulse_ops);
            }
        }) as Box<dyn FnMut()>);
        let interval = (beat_interval_ms(bpm).round() as i32).max(1);
        match window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            interval,
        ) {
            Ok(handle) => {
                self.handle = Some(handle);
                self.closure = Some(closure);
            }
            Err(e) => log::error!("beat timer start failed: {:?}", e),
        }
    }

    /// Cancel the interval. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Some(window) = web::window() {
                window.clear_interval_with_handle(handle);
            }
        }
        self.closure = None;
    }
}

impl Drop for BeatTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
