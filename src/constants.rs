/// DOM hooks and front-end tuning for the wheel page.
///
/// The page owns its markup; these are the ids and selectors the front-end
/// looks for. Missing elements are skipped, not treated as errors.
pub const LEFT_WHEEL_ID: &str = "wheelL";
pub const RIGHT_WHEEL_ID: &str = "wheelR";

// Children looked up inside each wheel root
pub const POINTER_SELECTOR: &str = ".pointer";
pub const INNER_CIRCLE_SELECTOR: &str = ".inner-circle";
pub const INNER_POINTER_SELECTOR: &str = ".inner-pointer";
pub const HUB_SELECTOR: &str = ".hub-hz";
pub const NOTE_SELECTOR: &str = ".hub-note";
pub const LABEL_SELECTOR: &str = ".labels [data-frequency]";
pub const LABEL_FREQUENCY_ATTR: &str = "data-frequency";

// Readouts outside the wheels
pub const BEAT_READOUT_ID: &str = "frequencyDiff";
pub const FINE_TUNE_READOUT_ID: &str = "fineTuneValue";
pub const LEFT_PAN_READOUT_ID: &str = "wheelLValue";
pub const RIGHT_PAN_READOUT_ID: &str = "wheelRValue";
pub const PLAY_BUTTON_ID: &str = "play";
pub const STOP_BUTTON_ID: &str = "stop";
pub const RESET_BUTTON_ID: &str = "reset";

// Pan readout thresholds
pub const PAN_CENTER_BAND: f64 = 0.1; // |pan| below this reads as centre
pub const PAN_HARD_SIDE: f64 = 0.8; // |pan| above this reads as hard left/right

pub const HZ_DECIMALS: usize = 3;
