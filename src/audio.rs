//! WebAudio backend for the core voice traits.
//!
//! Each chain is `OscillatorNode(sine) -> GainNode -> StereoPannerNode ->
//! destination`. Platform failures come back as `AudioError` and are
//! swallowed by the voice layer.

use std::cell::RefCell;
use std::rc::Rc;
use twinwheels_core::{AudioError, AudioGraph, FadeTickets, Session, VoiceChain, VoiceParam};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

pub type SharedSession = Rc<RefCell<Session<WebGraph>>>;

#[inline]
fn js_err(e: JsValue) -> AudioError {
    AudioError(format!("{:?}", e))
}

#[derive(Clone)]
pub struct WebGraph {
    ctx: web::AudioContext,
}

impl WebGraph {
    pub fn new() -> anyhow::Result<Self> {
        let ctx = web::AudioContext::new().map_err(|e| anyhow::anyhow!("{:?}", e))?;
        Ok(Self { ctx })
    }

    /// Browsers keep a fresh context suspended until a user gesture.
    pub fn resume(&self) {
        if self.ctx.state() != web::AudioContextState::Running {
            _ = self.ctx.resume();
        }
    }

    pub fn suspend(&self) {
        _ = self.ctx.suspend();
    }

    pub fn is_suspended(&self) -> bool {
        self.ctx.state() == web::AudioContextState::Suspended
    }
}

pub struct WebChain {
    osc: web::OscillatorNode,
    gain: web::GainNode,
    panner: web::StereoPannerNode,
}

impl WebChain {
    fn param(&self, param: VoiceParam) -> web::AudioParam {
        match param {
            VoiceParam::Frequency => self.osc.frequency(),
            VoiceParam::Gain => self.gain.gain(),
            VoiceParam::Pan => self.panner.pan(),
        }
    }
}

impl AudioGraph for WebGraph {
    type Chain = WebChain;

    fn create_chain(&self) -> Result<WebChain, AudioError> {
        let osc = web::OscillatorNode::new(&self.ctx).map_err(js_err)?;
        osc.set_type(web::OscillatorType::Sine);
        let gain = web::GainNode::new(&self.ctx).map_err(js_err)?;
        gain.gain().set_value(0.0);
        let panner = web::StereoPannerNode::new(&self.ctx).map_err(js_err)?;
        osc.connect_with_audio_node(&gain).map_err(js_err)?;
        gain.connect_with_audio_node(&panner).map_err(js_err)?;
        panner
            .connect_with_audio_node(&self.ctx.destination())
            .map_err(js_err)?;
        Ok(WebChain { osc, gain, panner })
    }

    fn now(&self) -> f64 {
        self.ctx.current_time()
    }
}

impl VoiceChain for WebChain {
    fn start(&self, when: f64) -> Result<(), AudioError> {
        self.osc.start_with_when(when).map_err(js_err)
    }

    fn stop(&self) -> Result<(), AudioError> {
        self.osc.stop().map_err(js_err)
    }

    fn set_target(
        &self,
        param: VoiceParam,
        value: f32,
        at: f64,
        time_constant: f64,
    ) -> Result<(), AudioError> {
        self.param(param)
            .set_target_at_time(value, at, time_constant)
            .map(|_| ())
            .map_err(js_err)
    }

    fn ramp_linear(
        &self,
        param: VoiceParam,
        from: f32,
        to: f32,
        at: f64,
        duration: f64,
    ) -> Result<(), AudioError> {
        let p = self.param(param);
        p.cancel_scheduled_values(at).map_err(js_err)?;
        p.set_value_at_time(from, at).map_err(js_err)?;
        p.linear_ramp_to_value_at_time(to, at + duration)
            .map(|_| ())
            .map_err(js_err)
    }

    fn release(&self) {
        _ = self.osc.disconnect();
        _ = self.gain.disconnect();
        _ = self.panner.disconnect();
    }
}

/// Resolve after `seconds` of wall time.
pub async fn sleep(seconds: f64) {
    let ms = (seconds.max(0.0) * 1000.0).round() as i32;
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        if let Some(w) = web::window() {
            _ = w.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms);
        }
    });
    _ = JsFuture::from(promise).await;
}

/// Stop the voices once their fade-out has run. Tickets from an older chain
/// generation are ignored by the session.
pub fn finish_fade(session: SharedSession, tickets: FadeTickets) {
    spawn_local(async move {
        sleep(tickets.duration_sec).await;
        session.borrow_mut().complete_fade(tickets);
        log::debug!("[audio] fade complete");
    });
}
