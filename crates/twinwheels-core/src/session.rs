//! The session owns every piece of mutable instrument state: both wheels,
//! their voices, the mono mix, the sequencer and the active driver.
//!
//! Write authority is explicit. Manual edits take the [`Driver::Manual`] role
//! and cancel a running sequence synchronously before touching anything; a
//! sequence run holds [`Driver::Sequence`] and its ticks are dropped as soon as
//! the driver changes.

use crate::config::SessionConfig;
use crate::constants::{
    FULL_TURN_DEG, MONO_OSC_GAIN, STEREO_FINE_HZ_PER_TURN, STEREO_FINE_MIN_HZ, STOP_FADE_OUT_SEC,
};
use crate::error::ConfigError;
use crate::mapper::FrequencyMapper;
use crate::sequence::{Sequence, SequenceFrame};
use crate::sequencer::{Progress, RunId, SequenceEvent, SequenceOptions, Sequencer, TickReport};
use crate::voice::{AudioGraph, AudioVoice, FadeTicket, VoiceTuning};
use crate::wheel::{ChangeListener, WheelController};
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Left,
    Right,
}

impl Channel {
    pub const BOTH: [Channel; 2] = [Channel::Left, Channel::Right];
}

/// Who may currently write wheel and voice state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Driver {
    #[default]
    None,
    Manual,
    Sequence(RunId),
}

/// Fade-outs in flight. Hand back to [`Session::complete_fade`] once
/// `duration_sec` has passed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FadeTickets {
    pub left: Option<FadeTicket>,
    pub right: Option<FadeTicket>,
    pub mono: [Option<FadeTicket>; 2],
    pub duration_sec: f64,
}

impl FadeTickets {
    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.right.is_none() && self.mono.iter().all(Option::is_none)
    }
}

/// A sequencer tick after it has been applied to the session.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionTick {
    pub report: TickReport,
    /// Started when the run completed with a fade-out option.
    pub fade: Option<FadeTickets>,
}

pub struct Session<G: AudioGraph + Clone> {
    config: SessionConfig,
    mapper: Rc<FrequencyMapper>,
    left: WheelController,
    right: WheelController,
    left_voice: AudioVoice<G>,
    right_voice: AudioVoice<G>,
    mono: [AudioVoice<G>; 2],
    mono_volume: f64,
    sequencer: Sequencer,
    driver: Driver,
    playing: bool,
    stereo_fine_hz: f64,
}

impl<G: AudioGraph + Clone> Session<G> {
    pub fn new(config: SessionConfig, graph: G) -> Result<Self, ConfigError> {
        config.validate()?;
        let mapper = Rc::new(config.mapper()?);
        let sequencer = Sequencer::new(config.crossfade_window_sec, config.library())?;
        let tuning = config.tuning();
        let mono_tuning = VoiceTuning {
            nominal_gain: 0.0,
            ..tuning
        };
        let lowest = mapper.lowest_anchor();
        let mut session = Self {
            left: WheelController::new(mapper.clone(), lowest),
            right: WheelController::new(mapper.clone(), lowest),
            left_voice: AudioVoice::new(graph.clone(), "left", tuning, config.left_pan),
            right_voice: AudioVoice::new(graph.clone(), "right", tuning, config.right_pan),
            mono: [
                AudioVoice::new(graph.clone(), "mono-left", mono_tuning, 0.0),
                AudioVoice::new(graph, "mono-right", mono_tuning, 0.0),
            ],
            mono_volume: 0.0,
            sequencer,
            driver: Driver::None,
            playing: false,
            stereo_fine_hz: 0.0,
            mapper,
            config,
        };
        session.sync_voices();
        log::info!(
            "[session] ready: {} anchors, ceiling {:.0} Hz, wrap {:?}",
            session.mapper.anchors().len(),
            session.mapper.max_hz(),
            session.mapper.wrap()
        );
        Ok(session)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn mapper(&self) -> &FrequencyMapper {
        &self.mapper
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    pub fn driver(&self) -> Driver {
        self.driver
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn wheel(&self, channel: Channel) -> &WheelController {
        match channel {
            Channel::Left => &self.left,
            Channel::Right => &self.right,
        }
    }

    fn wheel_mut(&mut self, channel: Channel) -> &mut WheelController {
        match channel {
            Channel::Left => &mut self.left,
            Channel::Right => &mut self.right,
        }
    }

    pub fn voice(&self, channel: Channel) -> &AudioVoice<G> {
        match channel {
            Channel::Left => &self.left_voice,
            Channel::Right => &self.right_voice,
        }
    }

    fn voice_mut(&mut self, channel: Channel) -> &mut AudioVoice<G> {
        match channel {
            Channel::Left => &mut self.left_voice,
            Channel::Right => &mut self.right_voice,
        }
    }

    pub fn mono_voices(&self) -> &[AudioVoice<G>; 2] {
        &self.mono
    }

    pub fn frequency(&self, channel: Channel) -> f64 {
        self.wheel(channel).current_frequency()
    }

    pub fn beat_frequency(&self) -> f64 {
        (self.right.current_frequency() - self.left.current_frequency()).abs()
    }

    pub fn pan(&self, channel: Channel) -> f32 {
        self.voice(channel).pan()
    }

    pub fn is_muted(&self, channel: Channel) -> bool {
        self.voice(channel).is_muted()
    }

    pub fn mono_volume(&self) -> f64 {
        self.mono_volume
    }

    pub fn stereo_fine_offset(&self) -> f64 {
        self.stereo_fine_hz
    }

    pub fn progress(&self) -> Option<Progress> {
        self.sequencer.progress()
    }

    /// Listener fired with the wheel's frequency after every change, whoever
    /// the driver is.
    pub fn set_on_change(&mut self, channel: Channel, listener: ChangeListener) {
        self.wheel_mut(channel).set_on_change(listener);
    }

    // ---- manual driver ----

    pub fn drag(&mut self, channel: Channel, delta_deg: f64) -> f64 {
        self.take_manual();
        let hz = self.wheel_mut(channel).apply_drag_delta(delta_deg);
        self.after_manual(hz)
    }

    pub fn fine_delta(&mut self, channel: Channel, delta_hz: f64) -> f64 {
        self.take_manual();
        let hz = self.wheel_mut(channel).apply_fine_delta(delta_hz);
        self.after_manual(hz)
    }

    pub fn fine_rotation(&mut self, channel: Channel, delta_deg: f64) -> f64 {
        self.take_manual();
        let hz = self.wheel_mut(channel).apply_fine_rotation(delta_deg);
        self.after_manual(hz)
    }

    pub fn set_frequency(&mut self, channel: Channel, hz: f64) -> f64 {
        self.take_manual();
        let hz = self.wheel_mut(channel).set_frequency(hz);
        self.after_manual(hz)
    }

    pub fn nudge(&mut self, channel: Channel, delta_hz: f64) -> f64 {
        self.take_manual();
        let hz = self.wheel_mut(channel).nudge(delta_hz);
        self.after_manual(hz)
    }

    pub fn select_anchor(&mut self, channel: Channel, index: usize) -> f64 {
        self.take_manual();
        let hz = self.wheel_mut(channel).select_anchor(index);
        self.after_manual(hz)
    }

    pub fn reset_wheel(&mut self, channel: Channel) -> f64 {
        self.take_manual();
        let hz = self.wheel_mut(channel).reset();
        self.after_manual(hz)
    }

    /// Preset: set both wheels at once.
    pub fn apply_pair(&mut self, left_hz: f64, right_hz: f64) -> (f64, f64) {
        self.take_manual();
        let l = self.left.set_frequency(left_hz);
        let r = self.right.set_frequency(right_hz);
        self.after_manual(l);
        (l, r)
    }

    /// Move both wheels together by `delta_hz`, never below
    /// `STEREO_FINE_MIN_HZ`. Returns the delta actually applied.
    pub fn apply_stereo_fine_tune(&mut self, delta_hz: f64) -> f64 {
        if !delta_hz.is_finite() || delta_hz == 0.0 {
            return 0.0;
        }
        self.take_manual();
        let max_hz = self.mapper.max_hz();
        let shift = |hz: f64| {
            if delta_hz < 0.0 {
                (hz + delta_hz).max(STEREO_FINE_MIN_HZ.min(hz))
            } else {
                (hz + delta_hz).min(max_hz)
            }
        };
        let l = self.left.current_frequency();
        let r = self.right.current_frequency();
        let (new_l, new_r) = (shift(l), shift(r));
        let (dl, dr) = (new_l - l, new_r - r);
        let applied = if dl.abs() >= dr.abs() { dl } else { dr };
        self.left.set_frequency(new_l);
        let hz = self.right.set_frequency(new_r);
        self.stereo_fine_hz += applied;
        self.after_manual(hz);
        applied
    }

    pub fn apply_stereo_fine_rotation(&mut self, delta_deg: f64) -> f64 {
        self.apply_stereo_fine_tune(delta_deg / FULL_TURN_DEG * STEREO_FINE_HZ_PER_TURN)
    }

    /// Ownership handoff: a running sequence is cancelled before the edit.
    /// Audio keeps playing; only the writer changes.
    fn take_manual(&mut self) {
        if let Some(id) = self.sequencer.stop() {
            log::info!("[session] manual input took over from {}", id);
        }
        self.driver = Driver::Manual;
    }

    fn after_manual(&mut self, hz: f64) -> f64 {
        self.sync_voices();
        if self.config.auto_play_on_manual && !self.playing {
            self.play();
        }
        hz
    }

    // ---- sequence driver ----

    pub fn start_sequence(
        &mut self,
        sequence: Sequence,
        options: SequenceOptions,
        now: f64,
    ) -> Result<RunId, ConfigError> {
        let started = self.sequencer.start(sequence, options, now)?;
        if let Some(old) = started.replaced {
            log::debug!("[session] {} replaced {}", started.id, old);
        }
        self.driver = Driver::Sequence(started.id);
        self.apply_frame(&started.initial);
        self.play();
        Ok(started.id)
    }

    /// Advance run `id`. Ticks for any run other than the current driver are
    /// ignored and write nothing.
    pub fn tick(&mut self, id: RunId, now: f64) -> SessionTick {
        if self.driver != Driver::Sequence(id) {
            return SessionTick {
                report: TickReport::ignored(),
                fade: None,
            };
        }
        let report = self.sequencer.tick(id, now);
        if let Some(frame) = report.frame {
            self.apply_frame(&frame);
        }
        let mut fade = None;
        for event in &report.events {
            if let SequenceEvent::Completed {
                fade_out: Some(seconds),
            } = event
            {
                fade = self.fade_out(*seconds);
            }
        }
        SessionTick { report, fade }
    }

    /// Cancel the sequence. Immediate stops audio now; otherwise the voices
    /// fade and the caller completes them later. A no-op when no sequence
    /// owns the session.
    pub fn stop_sequence(&mut self, immediate: bool) -> Option<FadeTickets> {
        let cancelled = self.sequencer.stop();
        let owned = matches!(self.driver, Driver::Sequence(_));
        if cancelled.is_none() && !owned {
            return None;
        }
        self.driver = Driver::None;
        if immediate {
            self.stop_voices();
            None
        } else {
            self.fade_out(STOP_FADE_OUT_SEC)
        }
    }

    /// Finish fade-outs started earlier. Voices restarted in the meantime
    /// are left alone.
    pub fn complete_fade(&mut self, tickets: FadeTickets) {
        if let Some(t) = tickets.left {
            self.left_voice.complete_fade_out(t);
        }
        if let Some(t) = tickets.right {
            self.right_voice.complete_fade_out(t);
        }
        for (voice, ticket) in self.mono.iter_mut().zip(tickets.mono) {
            if let Some(t) = ticket {
                voice.complete_fade_out(t);
            }
        }
    }

    fn fade_out(&mut self, seconds: f64) -> Option<FadeTickets> {
        let tickets = FadeTickets {
            left: self.left_voice.begin_fade_out(seconds),
            right: self.right_voice.begin_fade_out(seconds),
            mono: [
                self.mono[0].begin_fade_out(seconds),
                self.mono[1].begin_fade_out(seconds),
            ],
            duration_sec: seconds.max(0.0),
        };
        self.playing = false;
        if tickets.is_empty() {
            None
        } else {
            log::debug!("[session] fading out over {:.2}s", tickets.duration_sec);
            Some(tickets)
        }
    }

    fn apply_frame(&mut self, frame: &SequenceFrame) {
        self.left.set_frequency(frame.left_hz);
        self.right.set_frequency(frame.right_hz);
        if let Some(p) = frame.left_pan {
            self.left_voice.set_pan(p as f32);
        }
        if let Some(p) = frame.right_pan {
            self.right_voice.set_pan(p as f32);
        }
        self.sync_voices();
    }

    // ---- transport ----

    pub fn play(&mut self) {
        self.sync_voices();
        self.left_voice.start(true);
        self.right_voice.start(true);
        for v in &mut self.mono {
            v.start(true);
        }
        if !self.playing {
            log::info!("[session] playing");
        }
        self.playing = true;
    }

    /// Stop everything now, including any sequence.
    pub fn stop(&mut self) {
        if self.sequencer.stop().is_some() {
            log::debug!("[session] transport stop cancelled the sequence");
        }
        self.driver = Driver::None;
        self.stop_voices();
    }

    /// Stop, then return both wheels, the mono mix and the shared fine-tune
    /// to their initial values.
    pub fn reset(&mut self) {
        self.stop();
        self.left.reset();
        self.right.reset();
        self.stereo_fine_hz = 0.0;
        self.set_mono_volume(0.0);
        self.sync_voices();
        log::info!("[session] reset");
    }

    fn stop_voices(&mut self) {
        self.left_voice.stop();
        self.right_voice.stop();
        for v in &mut self.mono {
            v.stop();
        }
        if self.playing {
            log::info!("[session] stopped");
        }
        self.playing = false;
    }

    // ---- mix ----

    pub fn set_pan(&mut self, channel: Channel, pan: f64) -> f32 {
        let voice = self.voice_mut(channel);
        voice.set_pan(pan.clamp(-1.0, 1.0) as f32);
        voice.pan()
    }

    pub fn set_muted(&mut self, channel: Channel, muted: bool) {
        self.voice_mut(channel).set_muted(muted);
    }

    pub fn toggle_mute(&mut self, channel: Channel) -> bool {
        let muted = !self.is_muted(channel);
        self.set_muted(channel, muted);
        muted
    }

    /// Mono mix level in percent.
    pub fn set_mono_volume(&mut self, percent: f64) -> f64 {
        if !percent.is_finite() {
            return self.mono_volume;
        }
        self.mono_volume = percent.clamp(0.0, 100.0);
        let gain = MONO_OSC_GAIN * (self.mono_volume / 100.0) as f32;
        for v in &mut self.mono {
            v.set_gain(gain);
        }
        self.mono_volume
    }

    fn sync_voices(&mut self) {
        let l = self.left.current_frequency() as f32;
        let r = self.right.current_frequency() as f32;
        self.left_voice.set_frequency(l);
        self.right_voice.set_frequency(r);
        self.mono[0].set_frequency(l);
        self.mono[1].set_frequency(r);
    }
}
