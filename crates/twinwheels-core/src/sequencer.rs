//! Phase sequencer: a single cancellable run over a [`Sequence`].
//!
//! The sequencer never owns a timer. The host calls [`Sequencer::tick`] once
//! per animation frame with the run id it was given at start, and the report
//! tells it what to write, which callbacks to fire and whether to schedule
//! another frame. Ticks carrying a stale id are ignored, so a frame callback
//! that outlives its run cannot write anything.

use crate::constants::{CROSSFADE_WINDOW_SEC, TERMINAL_SNAPSHOT_FRACTION};
use crate::easing::Easing;
use crate::error::ConfigError;
use crate::harmonic::ProgressionLibrary;
use crate::sequence::{Sequence, SequenceFrame};
use smallvec::SmallVec;
use std::fmt;

/// Identity of one sequence run. Ids increase monotonically per sequencer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunId(u64);

impl RunId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SequenceOptions {
    /// Fade the voices out over this many seconds once the run completes.
    /// `None` leaves them playing at the final phase's values.
    pub fade_out_on_complete: Option<f64>,
}

/// Read-only snapshot for a progress display.
#[derive(Clone, Debug, PartialEq)]
pub struct Progress {
    pub elapsed_seconds: f64,
    pub phase_index: usize,
    pub phase_label: String,
    pub fraction_complete: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SequenceEvent {
    PhaseChanged { index: usize, name: String },
    Completed { fade_out: Option<f64> },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NextTick {
    Continue,
    Stop,
}

/// Result of one tick. `frame` is `None` only for ignored ticks.
#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    pub frame: Option<SequenceFrame>,
    pub events: SmallVec<[SequenceEvent; 2]>,
    pub next: NextTick,
}

impl TickReport {
    /// Nothing to write and nothing to schedule.
    pub fn ignored() -> Self {
        Self {
            frame: None,
            events: SmallVec::new(),
            next: NextTick::Stop,
        }
    }
}

/// A started run: its id and the frame to apply immediately.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StartedRun {
    pub id: RunId,
    pub initial: SequenceFrame,
    /// Run that was cancelled to make room for this one.
    pub replaced: Option<RunId>,
}

#[derive(Clone, Debug)]
pub struct SequenceRun {
    id: RunId,
    sequence: Sequence,
    options: SequenceOptions,
    start_time: f64,
    current_phase: Option<usize>,
    previous_end: Option<SequenceFrame>,
    transition_start: f64,
    progress: Progress,
}

impl SequenceRun {
    pub fn id(&self) -> RunId {
        self.id
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn current_phase(&self) -> Option<usize> {
        self.current_phase
    }

    pub fn is_crossfading(&self) -> bool {
        self.previous_end.is_some()
    }
}

#[derive(Clone, Debug, Default)]
pub enum SequencerState {
    #[default]
    Idle,
    Running(Box<SequenceRun>),
    Completed(Progress),
}

#[derive(Debug)]
pub struct Sequencer {
    state: SequencerState,
    next_id: u64,
    crossfade_window: f64,
    library: ProgressionLibrary,
}

impl Sequencer {
    pub fn new(crossfade_window: f64, library: ProgressionLibrary) -> Result<Self, ConfigError> {
        if !crossfade_window.is_finite() || crossfade_window <= 0.0 {
            return Err(ConfigError::InvalidCrossfade(crossfade_window));
        }
        Ok(Self {
            state: SequencerState::Idle,
            next_id: 0,
            crossfade_window,
            library,
        })
    }

    pub fn state(&self) -> &SequencerState {
        &self.state
    }

    pub fn library(&self) -> &ProgressionLibrary {
        &self.library
    }

    pub fn library_mut(&mut self) -> &mut ProgressionLibrary {
        &mut self.library
    }

    pub fn crossfade_window(&self) -> f64 {
        self.crossfade_window
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, SequencerState::Running(_))
    }

    pub fn active_run(&self) -> Option<RunId> {
        match &self.state {
            SequencerState::Running(run) => Some(run.id),
            _ => None,
        }
    }

    /// Start a new run, cancelling any active one. Rejected configuration
    /// leaves the current state untouched.
    pub fn start(
        &mut self,
        sequence: Sequence,
        options: SequenceOptions,
        now: f64,
    ) -> Result<StartedRun, ConfigError> {
        sequence.check_progressions(&self.library)?;
        if let Some(f) = options.fade_out_on_complete {
            if !f.is_finite() || f < 0.0 {
                return Err(ConfigError::NonFiniteValue {
                    phase: sequence.name().to_string(),
                    field: "fade_out_on_complete",
                });
            }
        }
        let replaced = self.stop();
        self.next_id += 1;
        let id = RunId(self.next_id);
        let initial = sequence.initial_frame(&self.library);
        log::info!(
            "[sequence] {} started '{}' ({} phases, {:.1}s)",
            id,
            sequence.name(),
            sequence.phases().len(),
            sequence.total_duration()
        );
        let progress = Progress {
            elapsed_seconds: 0.0,
            phase_index: 0,
            phase_label: sequence.phases()[0].name.clone(),
            fraction_complete: 0.0,
        };
        self.state = SequencerState::Running(Box::new(SequenceRun {
            id,
            sequence,
            options,
            start_time: now,
            current_phase: None,
            previous_end: None,
            transition_start: 0.0,
            progress,
        }));
        Ok(StartedRun {
            id,
            initial,
            replaced,
        })
    }

    /// Advance run `id` to `now`.
    pub fn tick(&mut self, id: RunId, now: f64) -> TickReport {
        let window = self.crossfade_window;
        let library = &self.library;
        let SequencerState::Running(run) = &mut self.state else {
            return TickReport::ignored();
        };
        if run.id != id {
            log::debug!("[sequence] ignoring stale tick for {} (active {})", id, run.id);
            return TickReport::ignored();
        }
        let total = run.sequence.total_duration();
        let elapsed = (now - run.start_time).max(0.0);
        let finished = elapsed >= total;
        let mut events = SmallVec::new();
        let frame = advance(run, elapsed.min(total), window, library, &mut events);
        if !finished {
            return TickReport {
                frame: Some(frame),
                events,
                next: NextTick::Continue,
            };
        }
        let mut progress = run.progress.clone();
        progress.elapsed_seconds = total;
        progress.fraction_complete = 1.0;
        let fade_out = run.options.fade_out_on_complete;
        log::info!("[sequence] {} completed '{}'", run.id, run.sequence.name());
        self.state = SequencerState::Completed(progress);
        events.push(SequenceEvent::Completed { fade_out });
        TickReport {
            frame: Some(frame),
            events,
            next: NextTick::Stop,
        }
    }

    /// Cancel whatever is active and return to idle. Returns the cancelled
    /// run, if one was running. Calling it again is a no-op.
    pub fn stop(&mut self) -> Option<RunId> {
        match std::mem::take(&mut self.state) {
            SequencerState::Running(run) => {
                log::info!("[sequence] {} cancelled", run.id);
                Some(run.id)
            }
            _ => None,
        }
    }

    pub fn progress(&self) -> Option<Progress> {
        match &self.state {
            SequencerState::Idle => None,
            SequencerState::Running(run) => Some(run.progress.clone()),
            SequencerState::Completed(p) => Some(p.clone()),
        }
    }
}

fn advance(
    run: &mut SequenceRun,
    elapsed: f64,
    window: f64,
    library: &ProgressionLibrary,
    events: &mut SmallVec<[SequenceEvent; 2]>,
) -> SequenceFrame {
    let sequence = &run.sequence;
    let (index, in_phase) = sequence.phase_at(elapsed);
    let phase = &sequence.phases()[index];
    if run.current_phase != Some(index) {
        if run.current_phase.is_some() && index > 0 {
            // Measure the window from the boundary itself so a late frame
            // does not stretch the blend.
            let boundary = elapsed - in_phase;
            let last = sequence.evaluate(index - 1, TERMINAL_SNAPSHOT_FRACTION, library);
            // A short phase can end mid-blend; carry what was actually sounding.
            let carried = match run.previous_end {
                Some(older) if boundary - run.transition_start < window => {
                    let t = (boundary - run.transition_start) / window;
                    SequenceFrame::blend(&older, &last, Easing::EaseInOutCubic.apply(t))
                }
                _ => last,
            };
            run.previous_end = Some(carried);
            run.transition_start = boundary;
        }
        run.current_phase = Some(index);
        log::debug!("[sequence] {} entering phase {} '{}'", run.id, index, phase.name);
        events.push(SequenceEvent::PhaseChanged {
            index,
            name: phase.name.clone(),
        });
    }
    let raw = sequence.evaluate(index, in_phase / phase.duration_seconds, library);
    let frame = match run.previous_end {
        Some(snapshot) if elapsed - run.transition_start < window => {
            let k = Easing::EaseInOutCubic.apply((elapsed - run.transition_start) / window);
            SequenceFrame::blend(&snapshot, &raw, k)
        }
        Some(_) => {
            run.previous_end = None;
            raw
        }
        None => raw,
    };
    run.progress = Progress {
        elapsed_seconds: elapsed,
        phase_index: index,
        phase_label: phase.name.clone(),
        fraction_complete: (elapsed / sequence.total_duration()).clamp(0.0, 1.0),
    };
    frame
}

impl Default for Sequencer {
    fn default() -> Self {
        Self {
            state: SequencerState::Idle,
            next_id: 0,
            crossfade_window: CROSSFADE_WINDOW_SEC,
            library: ProgressionLibrary::with_defaults(),
        }
    }
}
