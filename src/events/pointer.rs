use super::WheelWiring;
use crate::constants::{INNER_CIRCLE_SELECTOR, LABEL_FREQUENCY_ATTR, LABEL_SELECTOR};
use crate::dom;
use twinwheels_core::gesture::{pointer_angle_deg, scroll_step};
use twinwheels_core::{GestureDelta, GestureKind};
use wasm_bindgen::JsCast;
use web_sys as web;

pub fn wire_wheel_handlers(w: WheelWiring) {
    wire_pointerdown(&w);
    wire_pointermove(&w);
    wire_pointerup(&w);
    wire_pointercancel(&w);
    wire_scroll(&w);
}

fn pointer_angle(w: &WheelWiring, ev: &web::PointerEvent) -> f64 {
    pointer_angle_deg(dom::element_center(&w.root), dom::pointer_client_px(ev))
}

fn wire_pointerdown(w: &WheelWiring) {
    let w = w.clone();
    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        w.focus.set(w.channel);
        w.graph.resume();

        if let Some(label) = dom::closest_target(&ev, LABEL_SELECTOR) {
            select_label(&w, &label);
            return;
        }

        let kind = if dom::closest_target(&ev, INNER_CIRCLE_SELECTOR).is_some() {
            GestureKind::Fine
        } else {
            GestureKind::Main
        };
        let angle = pointer_angle(&w, &ev);
        if w.gesture.borrow_mut().begin(kind, ev.pointer_id(), angle) {
            _ = w.root.set_pointer_capture(ev.pointer_id());
            ev.prevent_default();
        }
    }) as Box<dyn FnMut(_)>);
    _ = w
        .root
        .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
    closure.forget();
}

fn select_label(w: &WheelWiring, label: &web::Element) {
    let Some(hz) = label
        .get_attribute(LABEL_FREQUENCY_ATTR)
        .and_then(|v| v.trim().parse::<f64>().ok())
    else {
        return;
    };
    let mut session = w.session.borrow_mut();
    let index = session
        .mapper()
        .anchors()
        .iter()
        .position(|a| (a - hz).abs() < 1e-9);
    let applied = match index {
        Some(i) => session.select_anchor(w.channel, i),
        None => session.set_frequency(w.channel, hz),
    };
    log::info!("[pointer] {:?} label -> {:.3} Hz", w.channel, applied);
}

fn wire_pointermove(w: &WheelWiring) {
    let w = w.clone();
    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        if !w.gesture.borrow().is_dragging() {
            return;
        }
        let angle = pointer_angle(&w, &ev);
        let delta = w.gesture.borrow_mut().pointer_moved(ev.pointer_id(), angle);
        match delta {
            Some(GestureDelta::Main(d)) => {
                w.session.borrow_mut().drag(w.channel, d);
            }
            Some(GestureDelta::Fine(d)) => {
                w.session.borrow_mut().fine_rotation(w.channel, d);
            }
            None => {}
        }
    }) as Box<dyn FnMut(_)>);
    _ = w
        .root
        .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
    closure.forget();
}

fn wire_pointerup(w: &WheelWiring) {
    let w = w.clone();
    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        if w.gesture.borrow_mut().end(ev.pointer_id()) {
            _ = w.root.release_pointer_capture(ev.pointer_id());
        }
    }) as Box<dyn FnMut(_)>);
    _ = w
        .root
        .add_event_listener_with_callback("pointerup", closure.as_ref().unchecked_ref());
    closure.forget();
}

fn wire_pointercancel(w: &WheelWiring) {
    let w = w.clone();
    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |_ev: web::PointerEvent| {
        w.gesture.borrow_mut().cancel();
    }) as Box<dyn FnMut(_)>);
    _ = w
        .root
        .add_event_listener_with_callback("pointercancel", closure.as_ref().unchecked_ref());
    closure.forget();
}

/// Mouse wheel nudges the wheel under the cursor. Ignored mid-drag.
fn wire_scroll(w: &WheelWiring) {
    let w = w.clone();
    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::WheelEvent| {
        if w.gesture.borrow().is_dragging() {
            return;
        }
        if let Some(step) = scroll_step(ev.delta_y()) {
            ev.prevent_default();
            w.focus.set(w.channel);
            w.session.borrow_mut().nudge(w.channel, step);
        }
    }) as Box<dyn FnMut(_)>);
    _ = w
        .root
        .add_event_listener_with_callback("wheel", closure.as_ref().unchecked_ref());
    closure.forget();
}
