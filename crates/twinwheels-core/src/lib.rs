pub mod config;
pub mod constants;
pub mod easing;
pub mod error;
pub mod gesture;
pub mod harmonic;
pub mod mapper;
pub mod notes;
pub mod sequence;
pub mod sequencer;
pub mod session;
pub mod voice;
pub mod wheel;

pub use config::SessionConfig;
pub use easing::Easing;
pub use error::{AudioError, ConfigError};
pub use gesture::{GestureDelta, GestureKind, GestureState, StepDirection};
pub use harmonic::{Interval, IntervalSample, Progression, ProgressionLibrary};
pub use mapper::{FrequencyMapper, MappedFrequency, WrapSector};
pub use notes::{frequency_to_note, midi_to_hz, piano_key_frequency, NoteReading, NoteSystem};
pub use sequence::{ModulationSpec, Phase, Sequence, SequenceFrame};
pub use sequencer::{
    NextTick, Progress, RunId, SequenceEvent, SequenceOptions, Sequencer, SequencerState,
    TickReport,
};
pub use session::{Channel, Driver, FadeTickets, Session, SessionTick};
pub use voice::{AudioGraph, AudioVoice, FadeTicket, VoiceChain, VoiceParam, VoiceTuning};
pub use wheel::{ChangeListener, WheelController, WheelState};
