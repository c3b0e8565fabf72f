use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

#[inline]
pub fn add_click_listener(
    document: &web::Document,
    element_id: &str,
    mut handler: impl FnMut() + 'static,
) {
    if let Some(el) = document.get_element_by_id(element_id) {
        let closure =
            wasm_bindgen::closure::Closure::wrap(Box::new(move || handler()) as Box<dyn FnMut()>);
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[inline]
pub fn query(root: &web::Element, selector: &str) -> Option<web::HtmlElement> {
    root.query_selector(selector)
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<web::HtmlElement>().ok())
}

pub fn set_text_by_id(document: &web::Document, element_id: &str, text: &str) {
    if let Some(el) = document.get_element_by_id(element_id) {
        el.set_text_content(Some(text));
    }
}

pub fn rotate(el: &web::HtmlElement, degrees: f64) {
    _ = el
        .style()
        .set_property("transform", &format!("rotate({:.3}deg)", degrees));
}

/// Centre of an element's box in client coordinates.
pub fn element_center(el: &web::Element) -> Vec2 {
    let rect = el.get_bounding_client_rect();
    Vec2::new(
        (rect.left() + rect.width() * 0.5) as f32,
        (rect.top() + rect.height() * 0.5) as f32,
    )
}

#[inline]
pub fn pointer_client_px(ev: &web::PointerEvent) -> Vec2 {
    Vec2::new(ev.client_x() as f32, ev.client_y() as f32)
}

/// Closest ancestor of the event target matching `selector`.
pub fn closest_target(ev: &web::Event, selector: &str) -> Option<web::Element> {
    ev.target()
        .and_then(|t| t.dyn_into::<web::Element>().ok())
        .and_then(|el| el.closest(selector).ok().flatten())
}
