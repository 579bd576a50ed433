//! Event wiring: transport controls plus the pointer and page-level
//! integration handlers in the submodules.

pub mod custom;
pub mod pointer;

use std::cell::RefCell;
use std::rc::Rc;
use web_sys as web;

use seq_core::{Session, SessionOps};

use crate::audio::AudioEngine;
use crate::beat::BeatTimer;
use crate::configs;
use crate::dom::{self, StageDom};
use crate::render::View;

/// Shared handles every event handler closes over.
#[derive(Clone)]
pub struct Wiring {
    pub document: web::Document,
    pub dom: StageDom,
    pub session: Rc<RefCell<Session>>,
    pub view: Rc<RefCell<View>>,
    pub audio: Rc<RefCell<Option<AudioEngine>>>,
    pub beat: Rc<RefCell<BeatTimer>>,
}

/// Push one mutation's effects out to the audio layer and the DOM, in the
/// order the session recorded them.
pub fn apply_ops(w: &Wiring, ops: &SessionOps) {
    if let Some(audio) = w.audio.borrow().as_ref() {
        for &effect in &ops.track_effects {
            audio.apply(effect);
        }
    }
    w.view.borrow().apply_pulse_ops(&ops.pulse_ops);
}

/// Start playback. The first start of a page load always begins from zero;
/// later starts re-align every track to the shared transport position.
pub fn start_transport(w: &Wiring) {
    let mut session = w.session.borrow_mut();
    if session.tracks.is_playing() {
        return;
    }
    let from_beginning = !session.tracks.started_once();
    session.start_playback(from_beginning);
    let bpm = session.config().bpm;
    drop(session);
    if let Some(audio) = w.audio.borrow().as_ref() {
        audio.start(from_beginning);
    }
    w.beat
        .borrow_mut()
        .start(bpm, w.session.clone(), w.view.clone());
    log::info!("transport started (from_beginning={from_beginning})");
}

pub fn stop_transport(w: &Wiring) {
    let ops = w.session.borrow_mut().stop_playback();
    apply_ops(w, &ops);
    if let Some(audio) = w.audio.borrow().as_ref() {
        audio.stop();
    }
    w.beat.borrow_mut().stop();
    log::info!("transport stopped");
}

/// Stop everything and put the session back to the config's initial layout,
/// nesting included.
pub fn reset_all(w: &Wiring) {
    w.beat.borrow_mut().stop();
    if let Some(audio) = w.audio.borrow().as_ref() {
        audio.stop();
    }
    let ops = w.session.borrow_mut().reset();
    apply_ops(w, &ops);
    rebuild_view(w);
    log::info!("session reset");
}

/// Swap to a named configuration, tearing down and rebuilding every
/// subsystem, then restart playback. An unknown name or an invalid config
/// leaves the current one running untouched.
pub fn switch_config(w: &Wiring, name: &str) {
    let Some(config) = configs::by_name(name) else {
        log::warn!("unknown music config '{name}'");
        return;
    };
    let ops = match w.session.borrow_mut().apply_config(config) {
        Ok(ops) => ops,
        Err(e) => {
            log::error!("music config '{name}' rejected: {e}");
            return;
        }
    };
    w.beat.borrow_mut().stop();
    // Hide the old config's special effects before the old view goes away.
    w.view.borrow().apply_pulse_ops(&ops.pulse_ops);

    {
        let mut audio = w.audio.borrow_mut();
        if let Some(old) = audio.take() {
            old.teardown();
        }
        if let Some(container) = w.document.get_element_by_id("audio-container") {
            let session = w.session.borrow();
            match AudioEngine::create(session.config(), &container) {
                Ok(engine) => {
                    engine.set_global_volume(session.tracks.master_volume());
                    *audio = Some(engine);
                }
                Err(e) => log::error!("audio rebuild failed; continuing silent: {:?}", e),
            }
        }
    }

    rebuild_view(w);
    log::info!("music config switched to '{name}'");
    start_transport(w);
}

pub fn set_master_volume(w: &Wiring, volume: f32) {
    w.session.borrow_mut().set_master_volume(volume);
    let clamped = w.session.borrow().tracks.master_volume();
    if let Some(audio) = w.audio.borrow().as_ref() {
        audio.set_global_volume(clamped);
    }
}

/// Hook up the transport buttons and the optional volume slider. Missing
/// controls degrade to a warning; the rest of the page keeps working.
pub fn wire_controls(w: &Wiring) {
    for (id, action) in [
        ("play-button", ControlAction::Play),
        ("stop-button", ControlAction::Stop),
        ("reset-button", ControlAction::Reset),
    ] {
        let w_click = w.clone();
        let wired = dom::add_click_listener(&w.document, id, move || match action {
            ControlAction::Play => start_transport(&w_click),
            ControlAction::Stop => stop_transport(&w_click),
            ControlAction::Reset => reset_all(&w_click),
        });
        if !wired {
            log::warn!("control #{id} missing; not wired");
        }
    }
    wire_volume_slider(w);
}

#[derive(Clone, Copy)]
enum ControlAction {
    Play,
    Stop,
    Reset,
}

fn wire_volume_slider(w: &Wiring) {
    use wasm_bindgen::JsCast;

    let Some(el) = w.document.get_element_by_id("volume-slider") else {
        log::info!("no #volume-slider; master volume fixed");
        return;
    };
    let Ok(input) = el.dyn_into::<web::HtmlInputElement>() else {
        log::warn!("#volume-slider is not an input element");
        return;
    };
    let w = w.clone();
    let input_read = input.clone();
    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move || {
        let volume = input_read
            .value()
            .parse::<f32>()
            .unwrap_or(seq_core::constants::DEFAULT_MASTER_VOLUME);
        set_master_volume(&w, volume);
    }) as Box<dyn FnMut()>);
    _ = input.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
    closure.forget();
}

fn rebuild_view(w: &Wiring) {
    let session = w.session.borrow();
    match View::build(&w.document, &w.dom, &session) {
        Ok(new_view) => {
            let mut view = w.view.borrow_mut();
            view.teardown();
            *view = new_view;
        }
        Err(e) => log::error!("view rebuild failed: {:?}", e),
    }
}
