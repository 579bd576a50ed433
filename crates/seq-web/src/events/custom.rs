//! Integration events dispatched by the host page.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys as web;

use super::{start_transport, switch_config, Wiring};

/// Listen for the page-level custom events.
///
/// `tutorial-closed` fires when the intro overlay is dismissed and should
/// kick off playback, but only the first time. `track-selected` carries the
/// chosen config name as its string detail.
pub fn wire_custom_events(w: &Wiring) {
    let w_tutorial = w.clone();
    let on_tutorial = Closure::wrap(Box::new(move |_ev: web::CustomEvent| {
        if w_tutorial.session.borrow().tracks.started_once() {
            log::info!("[custom] tutorial-closed ignored; playback already started");
            return;
        }
        log::info!("[custom] tutorial-closed; starting playback");
        start_transport(&w_tutorial);
    }) as Box<dyn FnMut(_)>);
    _ = w
        .document
        .add_event_listener_with_callback("tutorial-closed", on_tutorial.as_ref().unchecked_ref());
    on_tutorial.forget();

    let w_track = w.clone();
    let on_track = Closure::wrap(Box::new(move |ev: web::CustomEvent| {
        let Some(name) = ev.detail().as_string() else {
            log::warn!("[custom] track-selected without a string detail; ignored");
            return;
        };
        log::info!("[custom] track-selected '{name}'");
        switch_config(&w_track, &name);
    }) as Box<dyn FnMut(_)>);
    _ = w
        .document
        .add_event_listener_with_callback("track-selected", on_track.as_ref().unchecked_ref());
    on_track.forget();
}
