//! Per-channel oscillator -> gain -> panner voice with a safe node lifecycle.
//!
//! Oscillators are single-use on the platform: once stopped they cannot be
//! restarted. `AudioVoice` therefore never stops twice, never writes to a
//! stopped chain and builds a fresh chain on the next start. Parameter values
//! written while no chain exists are kept and applied on start.

use crate::constants::{FADE_IN_SEC, NOMINAL_GAIN, PARAM_TIME_CONSTANT_SEC, START_LEAD_SEC};
use crate::error::AudioError;

/// Automatable parameter on a voice chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VoiceParam {
    Frequency,
    Gain,
    Pan,
}

/// One oscillator -> gain -> stereo panner chain, as built by the platform.
pub trait VoiceChain {
    fn start(&self, when: f64) -> Result<(), AudioError>;
    fn stop(&self) -> Result<(), AudioError>;
    /// Exponential approach to `value` starting at `at`.
    fn set_target(
        &self,
        param: VoiceParam,
        value: f32,
        at: f64,
        time_constant: f64,
    ) -> Result<(), AudioError>;
    /// Linear ramp from `from` to `to` over `[at, at + duration]`.
    fn ramp_linear(
        &self,
        param: VoiceParam,
        from: f32,
        to: f32,
        at: f64,
        duration: f64,
    ) -> Result<(), AudioError>;
    /// Disconnect the chain from the output. Best effort.
    fn release(&self);
}

/// Factory for voice chains plus the audio clock they are scheduled against.
pub trait AudioGraph {
    type Chain: VoiceChain;

    fn create_chain(&self) -> Result<Self::Chain, AudioError>;
    fn now(&self) -> f64;
}

/// Smoothing and level settings shared by all voices of a session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoiceTuning {
    pub nominal_gain: f32,
    pub fade_in_sec: f64,
    pub time_constant_sec: f64,
}

impl Default for VoiceTuning {
    fn default() -> Self {
        Self {
            nominal_gain: NOMINAL_GAIN,
            fade_in_sec: FADE_IN_SEC,
            time_constant_sec: PARAM_TIME_CONSTANT_SEC,
        }
    }
}

/// Proof that a fade-out was started on a particular chain generation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FadeTicket {
    pub generation: u64,
    pub duration_sec: f64,
}

struct LiveChain<C> {
    chain: C,
    started: bool,
    fading: bool,
}

pub struct AudioVoice<G: AudioGraph> {
    graph: G,
    label: &'static str,
    tuning: VoiceTuning,
    live: Option<LiveChain<G::Chain>>,
    generation: u64,
    frequency_hz: f32,
    gain: f32,
    pan: f32,
    muted: bool,
}

impl<G: AudioGraph> AudioVoice<G> {
    pub fn new(graph: G, label: &'static str, tuning: VoiceTuning, pan: f32) -> Self {
        Self {
            graph,
            label,
            tuning,
            live: None,
            generation: 0,
            frequency_hz: 0.0,
            gain: tuning.nominal_gain,
            pan: pan.clamp(-1.0, 1.0),
            muted: false,
        }
    }

    pub fn is_started(&self) -> bool {
        self.live.as_ref().map(|l| l.started).unwrap_or(false)
    }

    pub fn is_fading(&self) -> bool {
        self.live.as_ref().map(|l| l.fading).unwrap_or(false)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn frequency(&self) -> f32 {
        self.frequency_hz
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn pan(&self) -> f32 {
        self.pan
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    fn effective_gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.gain
        }
    }

    /// Build the chain if needed and start the oscillator.
    pub fn start(&mut self, fade_in: bool) {
        if self.is_started() && !self.is_fading() {
            return;
        }
        if self.is_fading() {
            // A fade-out in flight would stop this chain; retire it now and
            // start over so the pending completion finds a stale generation.
            self.stop();
        }
        let chain = match self.graph.create_chain() {
            Ok(c) => c,
            Err(e) => {
                log::warn!("[voice:{}] chain creation failed: {}", self.label, e);
                return;
            }
        };
        self.generation += 1;
        let now = self.graph.now();
        let when = now + START_LEAD_SEC;
        let tc = self.tuning.time_constant_sec;
        swallow(
            self.label,
            chain.set_target(VoiceParam::Frequency, self.frequency_hz, now, tc),
        );
        swallow(self.label, chain.set_target(VoiceParam::Pan, self.pan, now, tc));
        let target_gain = self.effective_gain();
        if fade_in {
            let fade = self.tuning.fade_in_sec;
            swallow(
                self.label,
                chain.ramp_linear(VoiceParam::Gain, 0.0, target_gain, when, fade),
            );
        } else {
            swallow(self.label, chain.set_target(VoiceParam::Gain, target_gain, now, tc));
        }
        let started = match chain.start(when) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("[voice:{}] start failed: {}", self.label, e);
                false
            }
        };
        if !started {
            chain.release();
            return;
        }
        log::debug!(
            "[voice:{}] started gen={} freq={:.3} pan={:.2}",
            self.label,
            self.generation,
            self.frequency_hz,
            self.pan
        );
        self.live = Some(LiveChain {
            chain,
            started: true,
            fading: false,
        });
    }

    /// Stop and release the oscillator. Safe to call repeatedly.
    pub fn stop(&mut self) {
        let Some(live) = self.live.take() else {
            return;
        };
        if live.started {
            swallow(self.label, live.chain.stop());
        }
        live.chain.release();
        log::debug!("[voice:{}] stopped gen={}", self.label, self.generation);
    }

    pub fn set_frequency(&mut self, hz: f32) {
        if !hz.is_finite() {
            return;
        }
        self.frequency_hz = hz.max(0.0);
        self.write(VoiceParam::Frequency, self.frequency_hz);
    }

    pub fn set_gain(&mut self, gain: f32) {
        if !gain.is_finite() {
            return;
        }
        self.gain = gain.max(0.0);
        self.write(VoiceParam::Gain, self.effective_gain());
    }

    pub fn set_pan(&mut self, pan: f32) {
        if !pan.is_finite() {
            return;
        }
        self.pan = pan.clamp(-1.0, 1.0);
        self.write(VoiceParam::Pan, self.pan);
    }

    /// Mute ramps gain only; the oscillator keeps its frequency.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.write(VoiceParam::Gain, self.effective_gain());
    }

    /// Start a linear ramp to silence. The caller waits `duration_sec` and
    /// then hands the ticket back to [`AudioVoice::complete_fade_out`].
    pub fn begin_fade_out(&mut self, duration_sec: f64) -> Option<FadeTicket> {
        let now = self.graph.now();
        let gain = self.effective_gain();
        let live = self.live.as_mut()?;
        if !live.started || live.fading {
            return None;
        }
        live.fading = true;
        let duration_sec = duration_sec.max(0.0);
        swallow(
            self.label,
            live.chain.ramp_linear(VoiceParam::Gain, gain, 0.0, now, duration_sec),
        );
        Some(FadeTicket {
            generation: self.generation,
            duration_sec,
        })
    }

    /// Finish a fade-out. Stops only the chain the ticket was issued for, so a
    /// voice restarted during the fade keeps playing.
    pub fn complete_fade_out(&mut self, ticket: FadeTicket) -> bool {
        if ticket.generation != self.generation || !self.is_fading() {
            return false;
        }
        self.stop();
        true
    }

    fn write(&self, param: VoiceParam, value: f32) {
        let Some(live) = self.live.as_ref() else {
            return;
        };
        // A fading chain still follows frequency and pan, but its gain belongs
        // to the fade ramp.
        if !live.started || (live.fading && param == VoiceParam::Gain) {
            return;
        }
        let now = self.graph.now();
        swallow(
            self.label,
            live.chain
                .set_target(param, value, now, self.tuning.time_constant_sec),
        );
    }
}

impl<G: AudioGraph> Drop for AudioVoice<G> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[inline]
fn swallow(label: &str, result: Result<(), AudioError>) {
    if let Err(e) = result {
        log::debug!("[voice:{}] ignored: {}", label, e);
    }
}
