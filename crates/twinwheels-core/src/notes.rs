use crate::constants::{A4_HZ, A4_MIDI, BELOW_HEARING_HZ, PIANO_KEY_COUNT, PIANO_START_MIDI};

const ALPHABETICAL: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];
const SOLFEGE: [&str; 12] = [
    "Do", "Do#", "Re", "Re#", "Mi", "Fa", "Fa#", "Sol", "Sol#", "La", "La#", "Si",
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NoteSystem {
    #[default]
    Alphabetical,
    Solfege,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NoteReading {
    Silent,
    BelowHearing,
    Note {
        name: &'static str,
        octave: i32,
        /// Deviation from the nearest equal-tempered note, in `[-50, 50]`.
        cents: i32,
    },
}

pub fn midi_to_hz(midi: f32) -> f32 {
    A4_HZ as f32 * (2.0_f32).powf((midi - A4_MIDI as f32) / 12.0)
}

/// Nearest equal-tempered note for `hz`.
pub fn frequency_to_note(hz: f64, system: NoteSystem) -> NoteReading {
    if !hz.is_finite() || hz <= 0.0 {
        return NoteReading::Silent;
    }
    if hz < BELOW_HEARING_HZ {
        return NoteReading::BelowHearing;
    }
    let exact = A4_MIDI as f64 + 12.0 * (hz / A4_HZ).log2();
    let midi = exact.round();
    let cents = ((exact - midi) * 100.0).round().clamp(-50.0, 50.0) as i32;
    let midi = midi as i32;
    let names = match system {
        NoteSystem::Alphabetical => &ALPHABETICAL,
        NoteSystem::Solfege => &SOLFEGE,
    };
    NoteReading::Note {
        name: names[midi.rem_euclid(12) as usize],
        octave: midi.div_euclid(12) - 1,
        cents,
    }
}

/// Frequency of piano key `index` (0 = A0, 87 = C8).
pub fn piano_key_frequency(index: usize) -> Option<f64> {
    (index < PIANO_KEY_COUNT).then(|| midi_to_hz((PIANO_START_MIDI + index as i32) as f32) as f64)
}
