//! Small DOM helpers shared by the wiring code.

use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys as web;

/// The fixed elements the sequencer page must provide. Everything else
/// (controls, audio container, volume slider) is optional and degrades.
#[derive(Clone)]
pub struct StageDom {
    /// Outer container; the coordinate space for every position we compute.
    pub stage: web::Element,
    pub half_a: web::Element,
    pub half_b: web::Element,
    pub divider: web::Element,
    pub grid_a: web::Element,
    pub grid_b: web::Element,
}

impl StageDom {
    pub fn find(document: &web::Document) -> anyhow::Result<Self> {
        Ok(Self {
            stage: require_element(document, "split-stage")?,
            half_a: require_element(document, "screen-a")?,
            half_b: require_element(document, "screen-b")?,
            divider: require_element(document, "split-divider")?,
            grid_a: require_element(document, "grid-a")?,
            grid_b: require_element(document, "grid-b")?,
        })
    }
}

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

pub fn require_element(document: &web::Document, id: &str) -> anyhow::Result<web::Element> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| anyhow::anyhow!("required element #{id} missing"))
}

/// Wire a click handler if the element exists; reports whether it did so the
/// caller can log the degraded path.
#[inline]
pub fn add_click_listener(
    document: &web::Document,
    element_id: &str,
    mut handler: impl FnMut() + 'static,
) -> bool {
    let Some(el) = document.get_element_by_id(element_id) else {
        return false;
    };
    let closure =
        wasm_bindgen::closure::Closure::wrap(Box::new(move || handler()) as Box<dyn FnMut()>);
    _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
    closure.forget();
    true
}

/// Pointer position in stage space.
pub fn pointer_stage_px(ev: &web::PointerEvent, stage: &web::Element) -> Vec2 {
    let rect = stage.get_bounding_client_rect();
    Vec2::new(
        ev.client_x() as f32 - rect.left() as f32,
        ev.client_y() as f32 - rect.top() as f32,
    )
}

pub fn stage_size(stage: &web::Element) -> Vec2 {
    let rect = stage.get_bounding_client_rect();
    Vec2::new(rect.width() as f32, rect.height() as f32)
}

/// Create a div with the given class and append it to `parent`.
pub fn append_div(
    document: &web::Document,
    parent: &web::Element,
    class: &str,
) -> anyhow::Result<web::Element> {
    let el = document
        .create_element("div")
        .map_err(|e| anyhow::anyhow!("create_element: {e:?}"))?;
    el.set_class_name(class);
    parent
        .append_child(&el)
        .map_err(|e| anyhow::anyhow!("append_child: {e:?}"))?;
    Ok(el)
}

/// Monotonic page time in milliseconds.
pub fn now_ms() -> f64 {
    web::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}
