//! Sequence and phase configuration plus the per-phase trajectory functions.
//!
//! Sequences are plain data loaded from configuration. The engine treats every
//! table the same way; what a phase sounds like is decided only by its targets,
//! easing and [`ModulationSpec`].

use crate::constants::{DEFAULT_LEFT_PAN, DEFAULT_RIGHT_PAN};
use crate::easing::{lerp, Easing};
use crate::error::ConfigError;
use crate::harmonic::ProgressionLibrary;
use serde::Deserialize;
use std::f64::consts::TAU;

/// How a phase moves between its start and end.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModulationSpec {
    /// Eased interpolation from the previous phase's targets to this one's.
    #[default]
    Glide,
    /// Fixed carrier on the left, carrier + sweeping beat on the right.
    BeatSweep {
        carrier_hz: f64,
        from_beat_hz: f64,
        to_beat_hz: f64,
    },
    /// Left holds the root, right follows a named interval progression.
    Harmonic { progression: String, root_hz: f64 },
    /// Both channels breathe around their targets.
    Breath { period_seconds: f64, depth_hz: f64 },
    /// Targets held while the pans swing in opposite directions.
    PanDrift { cycles: f64, depth: f64 },
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Phase {
    pub name: String,
    pub duration_seconds: f64,
    pub left_hz: f64,
    pub right_hz: f64,
    #[serde(default)]
    pub left_pan: Option<f64>,
    #[serde(default)]
    pub right_pan: Option<f64>,
    #[serde(default)]
    pub easing: Easing,
    #[serde(default)]
    pub modulation: ModulationSpec,
}

impl Phase {
    /// A glide phase with no pan automation.
    pub fn new(name: &str, duration_seconds: f64, left_hz: f64, right_hz: f64) -> Self {
        Self {
            name: name.to_string(),
            duration_seconds,
            left_hz,
            right_hz,
            left_pan: None,
            right_pan: None,
            easing: Easing::default(),
            modulation: ModulationSpec::Glide,
        }
    }

    pub fn with_pans(mut self, left: f64, right: f64) -> Self {
        self.left_pan = Some(left);
        self.right_pan = Some(right);
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn with_modulation(mut self, modulation: ModulationSpec) -> Self {
        self.modulation = modulation;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.duration_seconds.is_finite() || self.duration_seconds <= 0.0 {
            return Err(ConfigError::InvalidDuration {
                phase: self.name.clone(),
                duration: self.duration_seconds,
            });
        }
        let mut fields: Vec<(&'static str, f64)> = vec![
            ("left_hz", self.left_hz),
            ("right_hz", self.right_hz),
        ];
        if let Some(p) = self.left_pan {
            fields.push(("left_pan", p));
        }
        if let Some(p) = self.right_pan {
            fields.push(("right_pan", p));
        }
        match &self.modulation {
            ModulationSpec::Glide => {}
            ModulationSpec::BeatSweep {
                carrier_hz,
                from_beat_hz,
                to_beat_hz,
            } => {
                fields.push(("carrier_hz", *carrier_hz));
                fields.push(("from_beat_hz", *from_beat_hz));
                fields.push(("to_beat_hz", *to_beat_hz));
            }
            ModulationSpec::Harmonic { root_hz, .. } => fields.push(("root_hz", *root_hz)),
            ModulationSpec::Breath {
                period_seconds,
                depth_hz,
            } => {
                if !period_seconds.is_finite() || *period_seconds <= 0.0 {
                    return Err(ConfigError::NonFiniteValue {
                        phase: self.name.clone(),
                        field: "period_seconds",
                    });
                }
                fields.push(("depth_hz", *depth_hz));
            }
            ModulationSpec::PanDrift { cycles, depth } => {
                fields.push(("cycles", *cycles));
                fields.push(("depth", *depth));
            }
        }
        match fields.iter().find(|(_, v)| !v.is_finite()) {
            Some((field, _)) => Err(ConfigError::NonFiniteValue {
                phase: self.name.clone(),
                field: *field,
            }),
            None => Ok(()),
        }
    }
}

/// Output of a phase or of the sequencer at one instant. `None` pans leave the
/// channel's current pan alone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SequenceFrame {
    pub left_hz: f64,
    pub right_hz: f64,
    pub left_pan: Option<f64>,
    pub right_pan: Option<f64>,
}

impl SequenceFrame {
    /// Blend `from` toward `to` by `t` (0 = all `from`).
    pub fn blend(from: &SequenceFrame, to: &SequenceFrame, t: f64) -> SequenceFrame {
        let pan = |a: Option<f64>, b: Option<f64>| match (a, b) {
            (Some(a), Some(b)) => Some(lerp(a, b, t)),
            (_, b) => b,
        };
        SequenceFrame {
            left_hz: lerp(from.left_hz, to.left_hz, t),
            right_hz: lerp(from.right_hz, to.right_hz, t),
            left_pan: pan(from.left_pan, to.left_pan),
            right_pan: pan(from.right_pan, to.right_pan),
        }
    }
}

#[derive(Deserialize)]
struct SequenceSpec {
    name: String,
    phases: Vec<Phase>,
}

/// Ordered, validated phases. Read-only once built.
#[derive(Clone, Debug, PartialEq)]
pub struct Sequence {
    name: String,
    phases: Vec<Phase>,
    total_duration: f64,
}

impl Sequence {
    pub fn new(name: &str, phases: Vec<Phase>) -> Result<Self, ConfigError> {
        if phases.is_empty() {
            return Err(ConfigError::EmptySequence(name.to_string()));
        }
        for phase in &phases {
            phase.validate()?;
        }
        let total_duration = phases.iter().map(|p| p.duration_seconds).sum();
        Ok(Self {
            name: name.to_string(),
            phases,
            total_duration,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let spec: SequenceSpec = serde_json::from_str(json)?;
        Self::new(&spec.name, spec.phases)
    }

    /// Every harmonic phase must name a progression the library knows.
    pub fn check_progressions(&self, library: &ProgressionLibrary) -> Result<(), ConfigError> {
        for phase in &self.phases {
            if let ModulationSpec::Harmonic { progression, .. } = &phase.modulation {
                if !library.contains(progression) {
                    return Err(ConfigError::UnknownProgression(progression.clone()));
                }
            }
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    /// Phase index containing `elapsed` and the time spent inside it.
    /// Past the end resolves to the final phase at its full duration.
    pub fn phase_at(&self, elapsed: f64) -> (usize, f64) {
        let elapsed = elapsed.max(0.0);
        let mut start = 0.0;
        for (i, phase) in self.phases.iter().enumerate() {
            let end = start + phase.duration_seconds;
            if elapsed < end {
                return (i, elapsed - start);
            }
            start = end;
        }
        let last = self.phases.len() - 1;
        (last, self.phases[last].duration_seconds)
    }

    /// Frame at the very start of phase 0, applied without any transition.
    pub fn initial_frame(&self, library: &ProgressionLibrary) -> SequenceFrame {
        self.evaluate(0, 0.0, library)
    }

    /// Raw trajectory of phase `index` at normalized progress `t`.
    pub fn evaluate(&self, index: usize, t: f64, library: &ProgressionLibrary) -> SequenceFrame {
        let index = index.min(self.phases.len() - 1);
        let phase = &self.phases[index];
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let eased = phase.easing.apply(t);
        let targets = SequenceFrame {
            left_hz: phase.left_hz,
            right_hz: phase.right_hz,
            left_pan: phase.left_pan,
            right_pan: phase.right_pan,
        };
        match &phase.modulation {
            ModulationSpec::Glide => {
                let entry = match index.checked_sub(1).map(|i| &self.phases[i]) {
                    Some(prev) => SequenceFrame {
                        left_hz: prev.left_hz,
                        right_hz: prev.right_hz,
                        left_pan: prev.left_pan,
                        right_pan: prev.right_pan,
                    },
                    None => targets,
                };
                SequenceFrame::blend(&entry, &targets, eased)
            }
            ModulationSpec::BeatSweep {
                carrier_hz,
                from_beat_hz,
                to_beat_hz,
            } => {
                let beat = lerp(*from_beat_hz, *to_beat_hz, eased);
                SequenceFrame {
                    left_hz: *carrier_hz,
                    right_hz: carrier_hz + beat,
                    ..targets
                }
            }
            ModulationSpec::Harmonic {
                progression,
                root_hz,
            } => {
                // Unknown names are rejected at start; fall back to unison.
                let ratio = library
                    .get(progression)
                    .map(|p| p.ratio_at(t, phase.easing).ratio)
                    .unwrap_or(1.0);
                SequenceFrame {
                    left_hz: *root_hz,
                    right_hz: root_hz * ratio,
                    ..targets
                }
            }
            ModulationSpec::Breath {
                period_seconds,
                depth_hz,
            } => {
                let seconds = t * phase.duration_seconds;
                let swing = depth_hz * (TAU * seconds / period_seconds).sin();
                SequenceFrame {
                    left_hz: phase.left_hz + swing,
                    right_hz: phase.right_hz + swing,
                    ..targets
                }
            }
            ModulationSpec::PanDrift { cycles, depth } => {
                let swing = depth * (TAU * cycles * t).sin();
                let left = phase.left_pan.unwrap_or(DEFAULT_LEFT_PAN as f64);
                let right = phase.right_pan.unwrap_or(DEFAULT_RIGHT_PAN as f64);
                SequenceFrame {
                    left_pan: Some((left + swing).clamp(-1.0, 1.0)),
                    right_pan: Some((right - swing).clamp(-1.0, 1.0)),
                    ..targets
                }
            }
        }
    }
}
