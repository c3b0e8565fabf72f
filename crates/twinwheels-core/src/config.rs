//! Runtime session configuration.
//!
//! Everything here is optional in JSON; missing fields fall back to the
//! constants in [`crate::constants`].

use crate::constants::{
    CROSSFADE_WINDOW_SEC, DEFAULT_ANCHORS_HZ, DEFAULT_LEFT_PAN, DEFAULT_RIGHT_PAN, FADE_IN_SEC,
    MAX_FREQUENCY_HZ, NOMINAL_GAIN, PARAM_TIME_CONSTANT_SEC,
};
use crate::error::ConfigError;
use crate::harmonic::{Progression, ProgressionLibrary};
use crate::mapper::{FrequencyMapper, WrapSector};
use crate::voice::VoiceTuning;
use serde::Deserialize;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub anchors_hz: Vec<f64>,
    pub max_frequency_hz: f64,
    pub wrap: WrapSector,
    pub crossfade_window_sec: f64,
    pub nominal_gain: f32,
    pub fade_in_sec: f64,
    pub time_constant_sec: f64,
    pub left_pan: f32,
    pub right_pan: f32,
    /// Start audio when a wheel is edited by hand while stopped.
    pub auto_play_on_manual: bool,
    /// Extra progressions on top of the built-in ones.
    pub progressions: Vec<Progression>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            anchors_hz: DEFAULT_ANCHORS_HZ.to_vec(),
            max_frequency_hz: MAX_FREQUENCY_HZ,
            wrap: WrapSector::default(),
            crossfade_window_sec: CROSSFADE_WINDOW_SEC,
            nominal_gain: NOMINAL_GAIN,
            fade_in_sec: FADE_IN_SEC,
            time_constant_sec: PARAM_TIME_CONSTANT_SEC,
            left_pan: DEFAULT_LEFT_PAN,
            right_pan: DEFAULT_RIGHT_PAN,
            auto_play_on_manual: false,
            progressions: Vec::new(),
        }
    }
}

impl SessionConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SessionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.mapper()?;
        if !self.crossfade_window_sec.is_finite() || self.crossfade_window_sec <= 0.0 {
            return Err(ConfigError::InvalidCrossfade(self.crossfade_window_sec));
        }
        let voice_fields = [
            ("nominal_gain", self.nominal_gain as f64),
            ("fade_in_sec", self.fade_in_sec),
            ("time_constant_sec", self.time_constant_sec),
            ("left_pan", self.left_pan as f64),
            ("right_pan", self.right_pan as f64),
        ];
        if let Some((field, _)) = voice_fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::NonFiniteValue {
                phase: "session".to_string(),
                field: *field,
            });
        }
        Ok(())
    }

    pub fn mapper(&self) -> Result<FrequencyMapper, ConfigError> {
        FrequencyMapper::new(self.anchors_hz.clone(), self.max_frequency_hz, self.wrap)
    }

    pub fn tuning(&self) -> VoiceTuning {
        VoiceTuning {
            nominal_gain: self.nominal_gain.max(0.0),
            fade_in_sec: self.fade_in_sec.max(0.0),
            time_constant_sec: self.time_constant_sec.max(0.0),
        }
    }

    /// Built-in progressions plus the configured ones, which win on name clashes.
    pub fn library(&self) -> ProgressionLibrary {
        let mut lib = ProgressionLibrary::with_defaults();
        for p in &self.progressions {
            lib.insert(p.clone());
        }
        lib
    }
}
