//! Pointer gesture tracking and step policy for wheel input.
//!
//! A wheel can be dragged by its main pointer or by the inner fine dial, never
//! both at once. Each gesture owns the pointer id that started it.

use crate::constants::{
    DRAG_JUMP_REJECT_DEG, FULL_TURN_DEG, KEYBOARD_STEP_COARSE, KEYBOARD_STEP_DEFAULT,
    KEYBOARD_STEP_FINE, SCROLL_BASE_STEP, SCROLL_MAX_EXTRA, SCROLL_SCALE,
};
use glam::Vec2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureKind {
    Main,
    Fine,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum GestureState {
    #[default]
    Idle,
    DraggingMain { pointer_id: i32, last_angle: f64 },
    DraggingFine { pointer_id: i32, last_angle: f64 },
}

/// Rotation produced by a pointer move, routed to the gesture that owns it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureDelta {
    Main(f64),
    Fine(f64),
}

impl GestureState {
    pub fn is_dragging(&self) -> bool {
        !matches!(self, GestureState::Idle)
    }

    pub fn owner(&self) -> Option<i32> {
        match *self {
            GestureState::Idle => None,
            GestureState::DraggingMain { pointer_id, .. }
            | GestureState::DraggingFine { pointer_id, .. } => Some(pointer_id),
        }
    }

    /// Start a drag. Refused while another gesture holds the wheel.
    pub fn begin(&mut self, kind: GestureKind, pointer_id: i32, angle_deg: f64) -> bool {
        if self.is_dragging() {
            return false;
        }
        *self = match kind {
            GestureKind::Main => GestureState::DraggingMain {
                pointer_id,
                last_angle: angle_deg,
            },
            GestureKind::Fine => GestureState::DraggingFine {
                pointer_id,
                last_angle: angle_deg,
            },
        };
        true
    }

    /// Feed a pointer position (as an angle around the wheel center).
    ///
    /// Returns `None` for foreign pointers, for idle state and for jumps of
    /// `DRAG_JUMP_REJECT_DEG` or more. The reference angle always advances so a
    /// rejected jump does not accumulate.
    pub fn pointer_moved(&mut self, pointer_id: i32, angle_deg: f64) -> Option<GestureDelta> {
        let (owner, last, kind) = match *self {
            GestureState::Idle => return None,
            GestureState::DraggingMain {
                pointer_id,
                last_angle,
            } => (pointer_id, last_angle, GestureKind::Main),
            GestureState::DraggingFine {
                pointer_id,
                last_angle,
            } => (pointer_id, last_angle, GestureKind::Fine),
        };
        if owner != pointer_id {
            return None;
        }
        let diff = normalize_angle_diff(angle_deg - last);
        match self {
            GestureState::DraggingMain { last_angle, .. }
            | GestureState::DraggingFine { last_angle, .. } => *last_angle = angle_deg,
            GestureState::Idle => {}
        }
        if diff.abs() >= DRAG_JUMP_REJECT_DEG {
            return None;
        }
        Some(match kind {
            GestureKind::Main => GestureDelta::Main(diff),
            GestureKind::Fine => GestureDelta::Fine(diff),
        })
    }

    /// Release on pointer up. Only the owning pointer ends the gesture.
    pub fn end(&mut self, pointer_id: i32) -> bool {
        if self.owner() == Some(pointer_id) {
            *self = GestureState::Idle;
            true
        } else {
            false
        }
    }

    /// Pointer cancel / lost capture: drop whatever is active.
    pub fn cancel(&mut self) {
        *self = GestureState::Idle;
    }
}

/// Fold an angle difference into `(-180, 180]`.
#[inline]
pub fn normalize_angle_diff(diff: f64) -> f64 {
    let d = diff.rem_euclid(FULL_TURN_DEG);
    if d > 180.0 {
        d - FULL_TURN_DEG
    } else {
        d
    }
}

/// Screen-space angle of `point` around `center`, in degrees.
#[inline]
pub fn pointer_angle_deg(center: Vec2, point: Vec2) -> f64 {
    let d = point - center;
    (d.y as f64).atan2(d.x as f64).to_degrees()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepDirection {
    Up,
    Down,
}

/// Arrow-key step: alt is fine, shift is coarse.
#[inline]
pub fn keyboard_step(direction: StepDirection, alt: bool, shift: bool) -> f64 {
    let base = if alt {
        KEYBOARD_STEP_FINE
    } else if shift {
        KEYBOARD_STEP_COARSE
    } else {
        KEYBOARD_STEP_DEFAULT
    };
    match direction {
        StepDirection::Up => base,
        StepDirection::Down => -base,
    }
}

/// Scroll step in Hz. Scrolling up (negative `delta_y`) raises the frequency.
#[inline]
pub fn scroll_step(delta_y: f64) -> Option<f64> {
    if !delta_y.is_finite() || delta_y == 0.0 {
        return None;
    }
    let direction = if delta_y < 0.0 { 1.0 } else { -1.0 };
    let magnitude = (delta_y.abs() * SCROLL_SCALE).min(SCROLL_MAX_EXTRA);
    Some(direction * (SCROLL_BASE_STEP + magnitude))
}
