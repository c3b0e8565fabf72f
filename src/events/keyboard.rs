use crate::audio::{SharedSession, WebGraph};
use crate::keymap::{key_action, KeyAction};
use std::cell::Cell;
use std::rc::Rc;
use twinwheels_core::gesture::keyboard_step;
use twinwheels_core::Channel;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Skip shortcuts while the user is typing into a form field.
fn typing_into_field(ev: &web::KeyboardEvent) -> bool {
    ev.target()
        .and_then(|t| t.dyn_into::<web::Element>().ok())
        .map(|el| matches!(el.tag_name().as_str(), "INPUT" | "TEXTAREA" | "SELECT"))
        .unwrap_or(false)
}

pub fn handle_global_keydown(
    ev: &web::KeyboardEvent,
    session: &SharedSession,
    graph: &WebGraph,
    focus: &Rc<Cell<Channel>>,
) {
    if typing_into_field(ev) {
        return;
    }
    let Some(action) = key_action(&ev.key()) else {
        return;
    };
    ev.prevent_default();
    let channel = focus.get();
    match action {
        KeyAction::Step(direction) => {
            let step = keyboard_step(direction, ev.alt_key(), ev.shift_key());
            graph.resume();
            session.borrow_mut().nudge(channel, step);
        }
        KeyAction::TogglePlay => {
            let mut s = session.borrow_mut();
            if s.is_playing() {
                s.stop();
                log::info!("[keyboard] stop");
            } else {
                graph.resume();
                s.play();
                log::info!("[keyboard] play");
            }
        }
        KeyAction::Stop => {
            session.borrow_mut().stop();
        }
        KeyAction::ResetWheel => {
            let hz = session.borrow_mut().reset_wheel(channel);
            log::info!("[keyboard] {:?} reset to {:.3} Hz", channel, hz);
        }
    }
}

pub fn wire_global_keydown(session: SharedSession, graph: WebGraph, focus: Rc<Cell<Channel>>) {
    if let Some(window) = web::window() {
        let closure =
            wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::KeyboardEvent| {
                handle_global_keydown(&ev, &session, &graph, &focus);
            }) as Box<dyn FnMut(_)>);
        _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}
