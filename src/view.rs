//! Keeps the wheel readouts in step with the session.

use crate::audio::WebGraph;
use crate::constants::{
    BEAT_READOUT_ID, HUB_SELECTOR, INNER_POINTER_SELECTOR, LEFT_PAN_READOUT_ID, NOTE_SELECTOR,
    POINTER_SELECTOR, RIGHT_PAN_READOUT_ID,
};
use crate::dom;
use crate::labels;
use std::cell::Cell;
use std::rc::Rc;
use twinwheels_core::{frequency_to_note, Channel, NoteSystem, Session, WheelState};
use web_sys as web;

pub struct WheelView {
    pointer: Option<web::HtmlElement>,
    inner_pointer: Option<web::HtmlElement>,
    hub: Option<web::HtmlElement>,
    note: Option<web::HtmlElement>,
}

impl WheelView {
    pub fn find(root: &web::Element) -> Self {
        Self {
            pointer: dom::query(root, POINTER_SELECTOR),
            inner_pointer: dom::query(root, INNER_POINTER_SELECTOR),
            hub: dom::query(root, HUB_SELECTOR),
            note: dom::query(root, NOTE_SELECTOR),
        }
    }

    /// Main pointer follows the wheel angle only; fine offsets turn the
    /// inner pointer.
    pub fn show_wheel(&self, hz: f64, state: &WheelState) {
        if let Some(p) = &self.pointer {
            dom::rotate(p, state.angle_deg);
        }
        if let Some(p) = &self.inner_pointer {
            dom::rotate(p, state.fine_rotation_deg);
        }
        if let Some(h) = &self.hub {
            h.set_text_content(Some(&labels::format_hz(hz)));
        }
        if let Some(n) = &self.note {
            let reading = frequency_to_note(hz, NoteSystem::Alphabetical);
            n.set_text_content(Some(&labels::format_note(&reading)));
        }
    }

}

/// Install change listeners that redraw each wheel and the beat readout.
/// Listeners run inside session calls, so they only touch the DOM.
pub fn attach(
    session: &mut Session<WebGraph>,
    document: &web::Document,
    views: [Option<WheelView>; 2],
) {
    let last_hz = Rc::new(Cell::new([
        session.frequency(Channel::Left),
        session.frequency(Channel::Right),
    ]));
    for (slot, (channel, view)) in Channel::BOTH.into_iter().zip(views).enumerate() {
        let last_hz = last_hz.clone();
        let document = document.clone();
        if let Some(v) = &view {
            v.show_wheel(session.frequency(channel), &session.wheel(channel).state());
        }
        session.set_on_change(
            channel,
            Box::new(move |hz, state: &WheelState| {
                if let Some(v) = &view {
                    v.show_wheel(hz, state);
                }
                let mut pair = last_hz.get();
                pair[slot] = hz;
                last_hz.set(pair);
                let beat = (pair[1] - pair[0]).abs();
                let text = format!("{} Hz", labels::format_hz(beat));
                dom::set_text_by_id(&document, BEAT_READOUT_ID, &text);
            }),
        );
    }
    show_pans(document, session);
}

pub fn show_pans(document: &web::Document, session: &Session<WebGraph>) {
    for channel in Channel::BOTH {
        show_pan(document, channel, session.pan(channel));
    }
}

pub fn show_pan(document: &web::Document, channel: Channel, pan: f32) {
    let id = match channel {
        Channel::Left => LEFT_PAN_READOUT_ID,
        Channel::Right => RIGHT_PAN_READOUT_ID,
    };
    dom::set_text_by_id(document, id, &labels::format_pan(pan as f64));
}
