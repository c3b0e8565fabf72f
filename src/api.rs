//! JavaScript handle over one session.

use crate::audio::{self, SharedSession, WebGraph};
use crate::constants::{
    FINE_TUNE_READOUT_ID, LEFT_WHEEL_ID, PLAY_BUTTON_ID, RESET_BUTTON_ID, RIGHT_WHEEL_ID,
    STOP_BUTTON_ID,
};
use crate::dom;
use crate::events::{self, WheelWiring};
use crate::frame::{self, Clock, FrameContext, SequenceCallbacks};
use crate::labels;
use crate::view::{self, WheelView};
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use twinwheels_core::{
    frequency_to_note, Channel, GestureState, NoteSystem, Sequence, SequenceOptions, Session,
    SessionConfig,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys as web;

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn channel(side: &str) -> Result<Channel, JsValue> {
    match side {
        "left" | "L" | "l" => Ok(Channel::Left),
        "right" | "R" | "r" => Ok(Channel::Right),
        other => Err(JsValue::from_str(&format!("unknown wheel '{}'", other))),
    }
}

#[derive(Serialize)]
struct ProgressJs {
    elapsed_seconds: f64,
    phase_index: usize,
    phase_label: String,
    fraction_complete: f64,
}

#[wasm_bindgen]
pub struct TwinWheels {
    session: SharedSession,
    graph: WebGraph,
    clock: Clock,
}

#[wasm_bindgen]
impl TwinWheels {
    /// Build a session from optional JSON configuration and attach it to the
    /// wheels on the page, if any.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<TwinWheels, JsValue> {
        build(config_json.as_deref()).map_err(js_error)
    }

    pub fn set_hz(&self, side: &str, hz: f64) -> Result<f64, JsValue> {
        let ch = channel(side)?;
        Ok(self.session.borrow_mut().set_frequency(ch, hz))
    }

    pub fn nudge(&self, side: &str, delta_hz: f64) -> Result<f64, JsValue> {
        let ch = channel(side)?;
        Ok(self.session.borrow_mut().nudge(ch, delta_hz))
    }

    pub fn get_hz(&self, side: &str) -> Result<f64, JsValue> {
        let ch = channel(side)?;
        Ok(self.session.borrow().frequency(ch))
    }

    pub fn beat_hz(&self) -> f64 {
        self.session.borrow().beat_frequency()
    }

    pub fn reset_wheel(&self, side: &str) -> Result<f64, JsValue> {
        let ch = channel(side)?;
        Ok(self.session.borrow_mut().reset_wheel(ch))
    }

    /// Start a sequence from `{ name, phases }` JSON. Returns the run id.
    /// Callbacks run after each frame, outside any session borrow.
    pub fn start_sequence(
        &self,
        sequence_json: &str,
        on_phase_change: Option<js_sys::Function>,
        on_complete: Option<js_sys::Function>,
        fade_out_on_complete: Option<f64>,
    ) -> Result<f64, JsValue> {
        let sequence = Sequence::from_json(sequence_json).map_err(js_error)?;
        let options = SequenceOptions {
            fade_out_on_complete,
        };
        self.graph.resume();
        let run = self
            .session
            .borrow_mut()
            .start_sequence(sequence, options, self.clock.now())
            .map_err(js_error)?;
        log::info!("[api] started {}", run);
        if let Some(document) = dom::window_document() {
            view::show_pans(&document, &self.session.borrow());
        }
        frame::start_loop(FrameContext {
            session: self.session.clone(),
            document: dom::window_document(),
            run,
            clock: self.clock,
            callbacks: SequenceCallbacks {
                on_phase_change,
                on_complete,
            },
        });
        Ok(run.get() as f64)
    }

    pub fn stop_sequence(&self, immediate: bool) {
        let tickets = self.session.borrow_mut().stop_sequence(immediate);
        if let Some(t) = tickets {
            audio::finish_fade(self.session.clone(), t);
        }
    }

    /// `{ elapsed_seconds, phase_index, phase_label, fraction_complete }`,
    /// or `null` when no sequence has run.
    pub fn progress(&self) -> Result<JsValue, JsValue> {
        let Some(p) = self.session.borrow().progress() else {
            return Ok(JsValue::NULL);
        };
        let json = serde_json::to_string(&ProgressJs {
            elapsed_seconds: p.elapsed_seconds,
            phase_index: p.phase_index,
            phase_label: p.phase_label,
            fraction_complete: p.fraction_complete,
        })
        .map_err(js_error)?;
        js_sys::JSON::parse(&json)
    }

    pub fn play(&self) {
        self.graph.resume();
        self.session.borrow_mut().play();
    }

    pub fn stop(&self) {
        self.session.borrow_mut().stop();
    }

    /// Suspend the audio clock without touching session state.
    pub fn pause(&self) {
        self.graph.suspend();
    }

    pub fn resume(&self) {
        self.graph.resume();
    }

    pub fn is_paused(&self) -> bool {
        self.graph.is_suspended()
    }

    pub fn is_playing(&self) -> bool {
        self.session.borrow().is_playing()
    }

    pub fn reset(&self) {
        self.session.borrow_mut().reset();
    }

    pub fn set_pan(&self, side: &str, pan: f64) -> Result<f32, JsValue> {
        let ch = channel(side)?;
        let applied = self.session.borrow_mut().set_pan(ch, pan);
        if let Some(document) = dom::window_document() {
            view::show_pan(&document, ch, applied);
        }
        Ok(applied)
    }

    pub fn toggle_mute(&self, side: &str) -> Result<bool, JsValue> {
        let ch = channel(side)?;
        Ok(self.session.borrow_mut().toggle_mute(ch))
    }

    pub fn set_mono_volume(&self, percent: f64) -> f64 {
        self.session.borrow_mut().set_mono_volume(percent)
    }

    /// Apply a preset pair. Returns the applied `[left, right]`.
    pub fn apply_preset(&self, left_hz: f64, right_hz: f64) -> Box<[f64]> {
        let (l, r) = self.session.borrow_mut().apply_pair(left_hz, right_hz);
        Box::new([l, r])
    }

    /// Move both wheels by the same delta. Returns the accumulated offset.
    pub fn stereo_fine_tune(&self, delta_hz: f64) -> f64 {
        let offset = {
            let mut session = self.session.borrow_mut();
            session.apply_stereo_fine_tune(delta_hz);
            session.stereo_fine_offset()
        };
        if let Some(document) = dom::window_document() {
            let text = labels::format_offset_hz(offset);
            dom::set_text_by_id(&document, FINE_TUNE_READOUT_ID, &text);
        }
        offset
    }

    /// `[{ hz, label, angle }]` for every anchor, lowest first. The page lays
    /// out its own label ring from this.
    pub fn anchor_labels(&self) -> js_sys::Array {
        let session = self.session.borrow();
        let mapper = session.mapper();
        let out = js_sys::Array::new();
        for (i, hz) in mapper.anchors().iter().enumerate() {
            let entry = js_sys::Object::new();
            _ = js_sys::Reflect::set(&entry, &"hz".into(), &JsValue::from_f64(*hz));
            _ = js_sys::Reflect::set(
                &entry,
                &"label".into(),
                &JsValue::from_str(&labels::format_frequency_label(*hz)),
            );
            let angle = JsValue::from_f64(mapper.anchor_angle(i));
            _ = js_sys::Reflect::set(&entry, &"angle".into(), &angle);
            out.push(&entry);
        }
        out
    }

    pub fn note_name(&self, hz: f64) -> String {
        labels::format_note(&frequency_to_note(hz, NoteSystem::Alphabetical))
    }
}

fn build(config_json: Option<&str>) -> anyhow::Result<TwinWheels> {
    let config = match config_json {
        Some(json) => SessionConfig::from_json(json)?,
        None => SessionConfig::default(),
    };
    let graph = WebGraph::new()?;
    let session: SharedSession = Rc::new(RefCell::new(Session::new(config, graph.clone())?));
    let clock = Clock::new();

    let document = dom::window_document();
    let roots = [LEFT_WHEEL_ID, RIGHT_WHEEL_ID].map(|id| {
        document
            .as_ref()
            .and_then(|d| d.get_element_by_id(id))
            .and_then(|el| el.dyn_into::<web::HtmlElement>().ok())
    });

    if let Some(document) = &document {
        let views = [0, 1].map(|i| roots[i].as_ref().map(|r| WheelView::find(r)));
        view::attach(&mut session.borrow_mut(), document, views);
        let focus = Rc::new(Cell::new(Channel::Left));
        for (channel, root) in Channel::BOTH.into_iter().zip(roots) {
            if let Some(root) = root {
                events::pointer::wire_wheel_handlers(WheelWiring {
                    session: session.clone(),
                    graph: graph.clone(),
                    channel,
                    root,
                    gesture: Rc::new(RefCell::new(GestureState::default())),
                    focus: focus.clone(),
                });
            }
        }
        events::keyboard::wire_global_keydown(session.clone(), graph.clone(), focus);
        wire_transport_buttons(document, &session, &graph);
    }

    log::info!(
        "[api] ready: {} anchors, ceiling {:.0} Hz",
        session.borrow().mapper().anchors().len(),
        session.borrow().mapper().max_hz()
    );
    Ok(TwinWheels {
        session,
        graph,
        clock,
    })
}

fn wire_transport_buttons(document: &web::Document, session: &SharedSession, graph: &WebGraph) {
    let (s, g) = (session.clone(), graph.clone());
    dom::add_click_listener(document, PLAY_BUTTON_ID, move || {
        g.resume();
        s.borrow_mut().play();
    });
    let s = session.clone();
    dom::add_click_listener(document, STOP_BUTTON_ID, move || {
        s.borrow_mut().stop();
    });
    let s = session.clone();
    dom::add_click_listener(document, RESET_BUTTON_ID, move || {
        s.borrow_mut().reset();
    });
}
