use crate::constants::{FINE_HZ_PER_TURN, FULL_TURN_DEG, MAX_ANGLE_DEG, ZERO_POSITION_DEG};
use crate::mapper::{normalize_angle, FrequencyMapper, WrapSector};
use std::fmt;
use std::rc::Rc;

/// Mutable state of one wheel.
///
/// `continuous_hz` is re-derived from `angle_deg` after every rotation. Only
/// `set_frequency`, `select_anchor` and the fine-dial zero snap write it
/// directly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WheelState {
    pub angle_deg: f64,
    pub fine_offset_hz: f64,
    pub continuous_hz: f64,
    /// Inner dial angle, display only.
    pub fine_rotation_deg: f64,
}

/// Change listener: the resulting frequency plus the state that produced it.
pub type ChangeListener = Box<dyn FnMut(f64, &WheelState)>;

/// Rotary input controller for one channel.
///
/// Pointer drags, keyboard steps, scroll steps and label clicks all reduce to
/// the operations below. Every mutation fires the change listener with the
/// resulting frequency.
pub struct WheelController {
    mapper: Rc<FrequencyMapper>,
    state: WheelState,
    on_change: Option<ChangeListener>,
}

impl fmt::Debug for WheelController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WheelController")
            .field("state", &self.state)
            .field("has_listener", &self.on_change.is_some())
            .finish()
    }
}

impl WheelController {
    pub fn new(mapper: Rc<FrequencyMapper>, initial_hz: f64) -> Self {
        let mut wheel = Self {
            mapper,
            state: WheelState {
                angle_deg: ZERO_POSITION_DEG,
                fine_offset_hz: 0.0,
                continuous_hz: 0.0,
                fine_rotation_deg: 0.0,
            },
            on_change: None,
        };
        wheel.write_frequency(initial_hz);
        wheel
    }

    pub fn state(&self) -> WheelState {
        self.state
    }

    pub fn mapper(&self) -> &FrequencyMapper {
        &self.mapper
    }

    /// Register the change listener, replacing any previous one.
    pub fn set_on_change(&mut self, listener: ChangeListener) {
        self.on_change = Some(listener);
    }

    pub fn clear_on_change(&mut self) {
        self.on_change = None;
    }

    /// `continuous + fine`, clamped to `[0, max]`.
    pub fn current_frequency(&self) -> f64 {
        (self.state.continuous_hz + self.state.fine_offset_hz).clamp(0.0, self.mapper.max_hz())
    }

    /// Rotate the main pointer by `delta_deg`.
    pub fn apply_drag_delta(&mut self, delta_deg: f64) -> f64 {
        if !delta_deg.is_finite() {
            return self.current_frequency();
        }
        let proposed = self.state.angle_deg + delta_deg;
        match self.mapper.wrap() {
            WrapSector::CeilingRamp => {
                if proposed < ZERO_POSITION_DEG {
                    // Past 12 o'clock backwards would continue below the
                    // lowest anchor: pin to the zero position.
                    self.state.angle_deg = ZERO_POSITION_DEG;
                    self.state.fine_offset_hz = 0.0;
                    self.state.fine_rotation_deg = 0.0;
                } else if proposed >= FULL_TURN_DEG {
                    self.state.angle_deg = MAX_ANGLE_DEG;
                } else {
                    self.state.angle_deg = proposed;
                }
            }
            WrapSector::BackToFirst => {
                self.state.angle_deg = normalize_angle(proposed);
            }
        }
        self.rederive();
        if self.state.continuous_hz <= 0.0 {
            self.state.angle_deg = ZERO_POSITION_DEG;
            self.state.fine_offset_hz = 0.0;
            self.state.fine_rotation_deg = 0.0;
            self.rederive();
        }
        if self.state.continuous_hz >= self.mapper.max_hz() {
            self.state.angle_deg = self.ceiling_angle();
            self.state.fine_offset_hz = 0.0;
            self.rederive();
        }
        self.notify()
    }

    /// Adjust the fine offset only. The angle is untouched.
    pub fn apply_fine_delta(&mut self, delta_hz: f64) -> f64 {
        if !delta_hz.is_finite() {
            return self.current_frequency();
        }
        let max_hz = self.mapper.max_hz();
        let mut offset = self.state.fine_offset_hz + delta_hz;
        if self.state.continuous_hz + offset > max_hz {
            offset = max_hz - self.state.continuous_hz;
        }
        if self.state.continuous_hz + offset >= 0.0 {
            self.state.fine_offset_hz = offset;
        } else {
            // Snap to exactly zero rather than a small negative.
            self.state.continuous_hz = 0.0;
            self.state.fine_offset_hz = 0.0;
            self.state.fine_rotation_deg = 0.0;
            self.state.angle_deg = ZERO_POSITION_DEG;
        }
        self.notify()
    }

    /// Rotate the inner dial by `delta_deg`, one turn per `FINE_HZ_PER_TURN`.
    pub fn apply_fine_rotation(&mut self, delta_deg: f64) -> f64 {
        if !delta_deg.is_finite() {
            return self.current_frequency();
        }
        self.state.fine_rotation_deg += delta_deg;
        self.apply_fine_delta(delta_deg / FULL_TURN_DEG * FINE_HZ_PER_TURN)
    }

    pub fn set_frequency(&mut self, hz: f64) -> f64 {
        self.write_frequency(hz);
        self.notify()
    }

    pub fn nudge(&mut self, delta_hz: f64) -> f64 {
        if delta_hz == 0.0 || !delta_hz.is_finite() {
            return self.current_frequency();
        }
        self.set_frequency(self.current_frequency() + delta_hz)
    }

    /// Jump to an anchor label. Out-of-range indexes are ignored.
    pub fn select_anchor(&mut self, index: usize) -> f64 {
        let Some(&hz) = self.mapper.anchors().get(index) else {
            return self.current_frequency();
        };
        self.state.angle_deg = self.mapper.anchor_angle(index);
        self.state.continuous_hz = hz;
        self.state.fine_offset_hz = 0.0;
        self.state.fine_rotation_deg = 0.0;
        self.notify()
    }

    pub fn reset(&mut self) -> f64 {
        self.set_frequency(self.mapper.lowest_anchor())
    }

    fn write_frequency(&mut self, hz: f64) {
        let target = if hz.is_finite() {
            hz.clamp(0.0, self.mapper.max_hz())
        } else {
            0.0
        };
        self.state.fine_offset_hz = 0.0;
        self.state.fine_rotation_deg = 0.0;
        self.state.angle_deg = self.mapper.frequency_to_angle(target);
        // Forward and inverse agree within rounding for every value the wheel
        // can show; keep the exact request so sub-anchor values survive.
        self.state.continuous_hz = target;
    }

    fn rederive(&mut self) {
        self.state.continuous_hz = self.mapper.angle_to_frequency(self.state.angle_deg).hz;
    }

    /// Angle inside the current sector at which the mapping reaches the ceiling.
    fn ceiling_angle(&self) -> f64 {
        let width = self.mapper.sector_width();
        let angle = normalize_angle(self.state.angle_deg);
        let sector = ((angle / width).floor() as usize).min(self.mapper.anchors().len() - 1);
        let start_hz = self.mapper.anchors()[sector];
        let end_hz = self
            .mapper
            .anchors()
            .get(sector + 1)
            .copied()
            .unwrap_or_else(|| self.mapper.top_frequency());
        let span = end_hz - start_hz;
        let ratio = if span != 0.0 {
            ((self.mapper.max_hz() - start_hz) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        (sector as f64 * width + ratio * width).min(MAX_ANGLE_DEG)
    }

    fn notify(&mut self) -> f64 {
        let hz = self.current_frequency();
        if let Some(listener) = self.on_change.as_mut() {
            listener(hz, &self.state);
        }
        hz
    }
}
