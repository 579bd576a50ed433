#![cfg(target_arch = "wasm32")]
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

use seq_core::{Debounce, Session};

mod audio;
mod beat;
mod configs;
mod constants;
mod dom;
mod events;
mod frame;
mod render;

use crate::constants::RESIZE_DEBOUNCE_MS;

// Re-measure the stage only after resize events go quiet; the frame loop
// polls the debounce.
fn wire_stage_resize(resize: &Rc<RefCell<Debounce>>) {
    let resize = resize.clone();
    let closure = Closure::wrap(Box::new(move || {
        resize.borrow_mut().trigger(dom::now_ms());
    }) as Box<dyn FnMut()>);
    if let Some(window) = web::window() {
        _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("seq-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;
    let stage_dom = dom::StageDom::find(&document)?;

    let config = configs::by_name(configs::DEFAULT_CONFIG)
        .ok_or_else(|| anyhow::anyhow!("default config '{}' missing", configs::DEFAULT_CONFIG))?;
    log::info!("configs available: {:?}", configs::names());

    let stage_size = dom::stage_size(&stage_dom.stage);
    let session = Session::new(config, stage_size)?;
    log::info!(
        "[session] config '{}' bpm={} cells={} notes={}",
        session.config().name,
        session.config().bpm,
        session.config().total_cells,
        session.notes.len()
    );
    let session = Rc::new(RefCell::new(session));

    let view = render::View::build(&document, &stage_dom, &session.borrow())?;
    let view = Rc::new(RefCell::new(view));

    // Audio is optional: without a container (or with a refused context) the
    // page still sequences, it just runs silent.
    let audio: Rc<RefCell<Option<audio::AudioEngine>>> = Rc::new(RefCell::new(None));
    match document.get_element_by_id("audio-container") {
        Some(container) => match audio::AudioEngine::create(session.borrow().config(), &container)
        {
            Ok(engine) => *audio.borrow_mut() = Some(engine),
            Err(e) => log::error!("audio unavailable; running silent: {:?}", e),
        },
        None => log::warn!("no #audio-container; running silent"),
    }

    let wiring = events::Wiring {
        document: document.clone(),
        dom: stage_dom.clone(),
        session: session.clone(),
        view: view.clone(),
        audio: audio.clone(),
        beat: Rc::new(RefCell::new(beat::BeatTimer::new())),
    };
    events::wire_controls(&wiring);
    events::pointer::wire_pointer_handlers(&wiring);
    events::custom::wire_custom_events(&wiring);

    let resize = Rc::new(RefCell::new(Debounce::new(RESIZE_DEBOUNCE_MS)));
    wire_stage_resize(&resize);

    let frame_ctx = Rc::new(RefCell::new(frame::FrameContext {
        session: session.clone(),
        view: view.clone(),
        stage: stage_dom.stage.clone(),
        resize,
    }));
    frame::start_loop(frame_ctx);

    log::info!("seq-web ready");
    Ok(())
}
