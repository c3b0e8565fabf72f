//! Harmonic interval progressions.
//!
//! A progression is an ordered list of just-intonation intervals. Sampling it
//! at `t in [0, 1]` finds the segment between two adjacent intervals and
//! interpolates the frequency ratio across it, which keeps left/right pairs
//! harmonically related while a phase moves.

use crate::easing::{lerp, Easing};
use crate::error::ConfigError;
use fnv::FnvHashMap;
use serde::Deserialize;

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Interval {
    pub label: String,
    pub ratio: f64,
}

impl Interval {
    pub fn new(label: &str, ratio: f64) -> Self {
        Self {
            label: label.to_string(),
            ratio,
        }
    }
}

// Just-intonation ratios relative to the root
pub const UNISON: f64 = 1.0;
pub const MINOR_THIRD: f64 = 6.0 / 5.0;
pub const MAJOR_THIRD: f64 = 5.0 / 4.0;
pub const PERFECT_FOURTH: f64 = 4.0 / 3.0;
pub const PERFECT_FIFTH: f64 = 3.0 / 2.0;
pub const MAJOR_SIXTH: f64 = 5.0 / 3.0;
pub const OCTAVE: f64 = 2.0;

#[derive(Clone, Debug, PartialEq)]
pub struct IntervalSample {
    pub ratio: f64,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(try_from = "ProgressionSpec")]
pub struct Progression {
    name: String,
    intervals: Vec<Interval>,
}

#[derive(Deserialize)]
struct ProgressionSpec {
    name: String,
    intervals: Vec<Interval>,
}

impl TryFrom<ProgressionSpec> for Progression {
    type Error = ConfigError;

    fn try_from(spec: ProgressionSpec) -> Result<Self, Self::Error> {
        Progression::new(&spec.name, spec.intervals)
    }
}

impl Progression {
    pub fn new(name: &str, intervals: Vec<Interval>) -> Result<Self, ConfigError> {
        if intervals.is_empty() {
            return Err(ConfigError::EmptyProgression(name.to_string()));
        }
        if let Some(bad) = intervals
            .iter()
            .find(|i| !i.ratio.is_finite() || i.ratio <= 0.0)
        {
            return Err(ConfigError::InvalidRatio {
                label: bad.label.clone(),
                ratio: bad.ratio,
            });
        }
        Ok(Self {
            name: name.to_string(),
            intervals,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// Ratio and nearest interval label at normalized position `t`.
    pub fn ratio_at(&self, t: f64, easing: Easing) -> IntervalSample {
        let n = self.intervals.len();
        if n == 1 {
            let only = &self.intervals[0];
            return IntervalSample {
                ratio: only.ratio,
                label: only.label.clone(),
            };
        }
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let segments = (n - 1) as f64;
        let segment = ((t * segments).floor() as usize).min(n - 2);
        let local = t * segments - segment as f64;
        let a = &self.intervals[segment];
        let b = &self.intervals[segment + 1];
        let ratio = lerp(a.ratio, b.ratio, easing.apply(local));
        let label = if local < 0.5 { &a.label } else { &b.label };
        IntervalSample {
            ratio,
            label: label.clone(),
        }
    }
}

/// Named progressions available to harmonic phases.
#[derive(Clone, Debug, Default)]
pub struct ProgressionLibrary {
    progressions: FnvHashMap<String, Progression>,
}

impl ProgressionLibrary {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut lib = Self::empty();
        let defaults = [
            (
                "ascending_light",
                vec![
                    Interval::new("unison", UNISON),
                    Interval::new("major_third", MAJOR_THIRD),
                    Interval::new("fifth", PERFECT_FIFTH),
                    Interval::new("octave", OCTAVE),
                ],
            ),
            (
                "heart_opening",
                vec![
                    Interval::new("unison", UNISON),
                    Interval::new("fourth", PERFECT_FOURTH),
                    Interval::new("major_sixth", MAJOR_SIXTH),
                    Interval::new("fifth", PERFECT_FIFTH),
                ],
            ),
            (
                "grounding",
                vec![
                    Interval::new("octave", OCTAVE),
                    Interval::new("fifth", PERFECT_FIFTH),
                    Interval::new("minor_third", MINOR_THIRD),
                    Interval::new("unison", UNISON),
                ],
            ),
        ];
        for (name, intervals) in defaults {
            if let Ok(p) = Progression::new(name, intervals) {
                lib.insert(p);
            }
        }
        lib
    }

    /// Add or replace a progression under its own name.
    pub fn insert(&mut self, progression: Progression) {
        self.progressions
            .insert(progression.name().to_string(), progression);
    }

    pub fn get(&self, name: &str) -> Option<&Progression> {
        self.progressions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.progressions.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.progressions.keys().map(|k| k.as_str())
    }

    /// Linear ratio lookup by progression name.
    pub fn interval_ratio_at(&self, name: &str, t: f64) -> Result<IntervalSample, ConfigError> {
        self.get(name)
            .map(|p| p.ratio_at(t, Easing::Linear))
            .ok_or_else(|| ConfigError::UnknownProgression(name.to_string()))
    }
}
