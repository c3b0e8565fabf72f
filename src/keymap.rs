// Keyboard shortcuts for the focused wheel. Pure, host-testable.

use twinwheels_core::StepDirection;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Step(StepDirection),
    TogglePlay,
    Stop,
    ResetWheel,
}

#[inline]
pub fn key_action(key: &str) -> Option<KeyAction> {
    match key {
        "ArrowUp" | "ArrowRight" => Some(KeyAction::Step(StepDirection::Up)),
        "ArrowDown" | "ArrowLeft" => Some(KeyAction::Step(StepDirection::Down)),
        " " => Some(KeyAction::TogglePlay),
        "Escape" => Some(KeyAction::Stop),
        "0" => Some(KeyAction::ResetWheel),
        _ => None,
    }
}
