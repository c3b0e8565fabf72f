// Text formatting for wheel labels and readouts. Pure, host-testable.

use crate::constants::{HZ_DECIMALS, PAN_CENTER_BAND, PAN_HARD_SIDE};
use twinwheels_core::NoteReading;

/// Anchor label text: `528`, `7.83`, `1.2k`, `2k`.
pub fn format_frequency_label(hz: f64) -> String {
    if hz >= 1000.0 {
        let k = hz / 1000.0;
        if k.fract() == 0.0 {
            format!("{}k", k)
        } else {
            format!("{:.1}k", k)
        }
    } else {
        format!("{}", hz)
    }
}

pub fn format_hz(hz: f64) -> String {
    format!("{:.*}", HZ_DECIMALS, hz)
}

/// Signed fine-tune readout, e.g. `+0.050 Hz`.
pub fn format_offset_hz(hz: f64) -> String {
    let sign = if hz >= 0.0 { "+" } else { "" };
    format!("{}{} Hz", sign, format_hz(hz))
}

pub fn format_pan(pan: f64) -> String {
    if pan < -PAN_HARD_SIDE {
        "L".to_string()
    } else if pan > PAN_HARD_SIDE {
        "R".to_string()
    } else if pan.abs() < PAN_CENTER_BAND {
        "C".to_string()
    } else if pan < 0.0 {
        format!("L{}", (pan.abs() * 100.0).round() as i32)
    } else {
        format!("R{}", (pan * 100.0).round() as i32)
    }
}

pub fn format_note(reading: &NoteReading) -> String {
    match reading {
        NoteReading::Silent => "\u{2014}".to_string(),
        NoteReading::BelowHearing => "below hearing".to_string(),
        NoteReading::Note {
            name,
            octave,
            cents,
        } => match cents {
            0 => format!("{}{}", name, octave),
            c if *c > 0 => format!("{}{} +{}\u{a2}", name, octave, c),
            c => format!("{}{} {}\u{a2}", name, octave, c),
        },
    }
}
