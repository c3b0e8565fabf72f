// Shared tuning constants for the wheels, voices and sequencer.

// Frequency range
pub const MAX_FREQUENCY_HZ: f64 = 4200.0; // top piano key (C8 ~4186 Hz) rounded up

/// Default labeled anchors around the wheel: brainwave, earth, solfeggio and
/// chakra frequencies followed by an extended piano range.
pub const DEFAULT_ANCHORS_HZ: &[f64] = &[
    0.1, 3.0, 7.83, 8.0, 12.0, 40.0, 62.0, 136.0, 174.0, 256.0, 285.0, 288.0, 320.0, 341.0,
    384.0, 396.0, 417.0, 426.0, 480.0, 528.0, 639.0, 693.0, 741.0, 852.0, 963.0, 1056.0,
    1200.0, 1500.0, 1800.0, 2100.0, 2500.0, 3000.0, 3500.0, 4000.0,
];

// Wheel geometry
pub const FULL_TURN_DEG: f64 = 360.0;
pub const ZERO_POSITION_DEG: f64 = 0.0; // 12 o'clock
pub const MAX_ANGLE_DEG: f64 = FULL_TURN_DEG - 1e-9; // last representable angle before the seam
pub const DRAG_JUMP_REJECT_DEG: f64 = 90.0; // pointer jumps this large are discarded
pub const FINE_HZ_PER_TURN: f64 = 0.1; // inner dial: one full turn moves 0.1 Hz

// Keyboard / scroll step policy (Hz)
pub const KEYBOARD_STEP_FINE: f64 = 0.1;
pub const KEYBOARD_STEP_DEFAULT: f64 = 0.5;
pub const KEYBOARD_STEP_COARSE: f64 = 1.0;
pub const SCROLL_BASE_STEP: f64 = 0.25;
pub const SCROLL_SCALE: f64 = 0.0025;
pub const SCROLL_MAX_EXTRA: f64 = 3.0;

// Shared fine-tune dial acting on both wheels
pub const STEREO_FINE_HZ_PER_TURN: f64 = 10.0;
pub const STEREO_FINE_MIN_HZ: f64 = 0.1;

// Voice levels and smoothing
pub const NOMINAL_GAIN: f32 = 0.25;
pub const MONO_OSC_GAIN: f32 = 0.125; // each of the two mono-mix oscillators
pub const PARAM_TIME_CONSTANT_SEC: f64 = 0.015;
pub const FADE_IN_SEC: f64 = 0.08;
pub const START_LEAD_SEC: f64 = 0.01; // schedule oscillator start slightly ahead of now
pub const STOP_FADE_OUT_SEC: f64 = 1.5; // graceful sequence stop
pub const DEFAULT_LEFT_PAN: f32 = -1.0;
pub const DEFAULT_RIGHT_PAN: f32 = 1.0;

// Sequencer
pub const CROSSFADE_WINDOW_SEC: f64 = 8.0;
pub const TERMINAL_SNAPSHOT_FRACTION: f64 = 0.99; // where a finished phase is sampled for blending

// Notes
pub const A4_HZ: f64 = 440.0;
pub const A4_MIDI: i32 = 69;
pub const BELOW_HEARING_HZ: f64 = 15.0;
pub const PIANO_KEY_COUNT: usize = 88;
pub const PIANO_START_MIDI: i32 = 21; // A0
