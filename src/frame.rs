//! requestAnimationFrame driver for a running sequence.
//!
//! One loop per run. The loop stops itself when the session reports the run
//! finished or superseded, so stale loops never write to the voices.

use crate::audio::{self, SharedSession};
use crate::view;
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use twinwheels_core::{NextTick, RunId, SequenceEvent};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Wall clock shared by sequence start and ticks.
#[derive(Clone, Copy)]
pub struct Clock {
    epoch: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }

    pub fn now(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
pub struct SequenceCallbacks {
    pub on_phase_change: Option<js_sys::Function>,
    pub on_complete: Option<js_sys::Function>,
}

pub struct FrameContext {
    pub session: SharedSession,
    pub document: Option<web::Document>,
    pub run: RunId,
    pub clock: Clock,
    pub callbacks: SequenceCallbacks,
}

impl FrameContext {
    pub fn frame(&mut self) -> NextTick {
        let tick = self.session.borrow_mut().tick(self.run, self.clock.now());
        let pans_moved = tick
            .report
            .frame
            .is_some_and(|f| f.left_pan.is_some() || f.right_pan.is_some());
        if let (true, Some(document)) = (pans_moved, &self.document) {
            view::show_pans(document, &self.session.borrow());
        }
        if let Some(tickets) = tick.fade {
            audio::finish_fade(self.session.clone(), tickets);
        }
        // The borrow is released here; callbacks may call back into the api.
        for event in &tick.report.events {
            self.dispatch(event);
        }
        tick.report.next
    }

    fn dispatch(&self, event: &SequenceEvent) {
        match event {
            SequenceEvent::PhaseChanged { index, name } => {
                log::info!("[frame] {} phase {} '{}'", self.run, index, name);
                if let Some(f) = &self.callbacks.on_phase_change {
                    if let Err(e) = f.call2(
                        &JsValue::NULL,
                        &JsValue::from(*index as u32),
                        &JsValue::from_str(name),
                    ) {
                        log::warn!("[frame] on_phase_change threw: {:?}", e);
                    }
                }
            }
            SequenceEvent::Completed { .. } => {
                log::info!("[frame] {} complete", self.run);
                if let Some(f) = &self.callbacks.on_complete {
                    if let Err(e) = f.call0(&JsValue::NULL) {
                        log::warn!("[frame] on_complete threw: {:?}", e);
                    }
                }
            }
        }
    }
}

pub fn start_loop(mut frame_ctx: FrameContext) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        if frame_ctx.frame() == NextTick::Stop {
            // Drop our handle so the closure is freed once it returns.
            _ = tick_clone.borrow_mut().take();
            return;
        }
        request_frame(&tick_clone);
    }) as Box<dyn FnMut()>));
    request_frame(&tick);
}

fn request_frame(tick: &Rc<RefCell<Option<Closure<dyn FnMut()>>>>) {
    if let (Some(w), Some(cb)) = (web::window(), tick.borrow().as_ref()) {
        _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}
