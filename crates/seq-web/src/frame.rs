//! Per-frame driver: settled resizes, drag easing and DOM sync.

use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

use seq_core::{Debounce, Session};

use crate::dom;
use crate::render::View;

pub struct FrameContext {
    pub session: Rc<RefCell<Session>>,
    pub view: Rc<RefCell<View>>,
    pub stage: web::Element,
    pub resize: Rc<RefCell<Debounce>>,
}

impl FrameContext {
    /// One animation frame: apply a settled resize, advance the drag easing,
    /// then mirror the model into the DOM.
    fn frame(&mut self) {
        if self.resize.borrow_mut().poll(dom::now_ms()) {
            let size = dom::stage_size(&self.stage);
            self.session.borrow_mut().set_stage_size(size);
            self.view
                .borrow_mut()
                .apply_cell_geometry(&self.session.borrow());
            log::info!("[frame] stage resized to {:.0}x{:.0}", size.x, size.y);
        }

        let drag = self.session.borrow_mut().drag_frame();
        let session = self.session.borrow();
        self.view.borrow_mut().sync(&session, drag.as_ref());
    }
}

/// Drive [`FrameContext::frame`] from requestAnimationFrame until the page
/// goes away.
pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    let frame_ctx_tick = frame_ctx.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame_ctx_tick.borrow_mut().frame();
        if let Some(w) = web::window() {
            _ = w.request_animation_frame(
                tick_clone
                    .borrow()
                    .as_ref()
                    .unwrap()
                    .as_ref()
                    .unchecked_ref(),
            );
        }
    }) as Box<dyn FnMut()>));
    if let Some(w) = web::window() {
        _ = w.request_animation_frame(tick.borrow().as_ref().unwrap().as_ref().unchecked_ref());
    }
}
