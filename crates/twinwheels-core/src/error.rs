use thiserror::Error;

/// Rejected configuration. Surfaced synchronously to whoever constructed the
/// mapper, sequence or session; never coerced into something valid.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("anchor set needs at least 2 frequencies, got {0}")]
    TooFewAnchors(usize),

    #[error("anchor {index} ({value} Hz) must be finite and positive")]
    InvalidAnchor { index: usize, value: f64 },

    #[error("anchors must be strictly ascending: {prev} Hz followed by {next} Hz")]
    AnchorsNotAscending { prev: f64, next: f64 },

    #[error("maximum frequency {max_hz} Hz is below the top anchor {top_anchor} Hz")]
    CeilingBelowTopAnchor { max_hz: f64, top_anchor: f64 },

    #[error("sequence '{0}' has no phases")]
    EmptySequence(String),

    #[error("phase '{phase}' has invalid duration {duration}s")]
    InvalidDuration { phase: String, duration: f64 },

    #[error("phase '{phase}' has a non-finite {field}")]
    NonFiniteValue { phase: String, field: &'static str },

    #[error("unknown progression '{0}'")]
    UnknownProgression(String),

    #[error("progression '{0}' has no intervals")]
    EmptyProgression(String),

    #[error("interval '{label}' has invalid ratio {ratio}")]
    InvalidRatio { label: String, ratio: f64 },

    #[error("crossfade window must be positive, got {0}s")]
    InvalidCrossfade(f64),

    #[error("invalid configuration json: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure reported by an audio backend. Only ever logged and swallowed at the
/// voice boundary: parameter writes racing a node teardown are expected.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("audio platform error: {0}")]
pub struct AudioError(pub String);
