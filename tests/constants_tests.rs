// Host-side sanity checks for front-end constants.

#![allow(dead_code)]
mod constants {
    include!("../src/constants.rs");
}

use constants::*;

#[test]
#[allow(clippy::assertions_on_constants)]
fn pan_bands_are_ordered() {
    assert!(PAN_CENTER_BAND > 0.0);
    assert!(PAN_CENTER_BAND < PAN_HARD_SIDE);
    assert!(PAN_HARD_SIDE < 1.0);
}

#[test]
fn selectors_are_well_formed() {
    for sel in [
        POINTER_SELECTOR,
        INNER_CIRCLE_SELECTOR,
        INNER_POINTER_SELECTOR,
        HUB_SELECTOR,
        NOTE_SELECTOR,
    ] {
        assert!(sel.starts_with('.'), "{sel}");
    }
    assert!(LABEL_SELECTOR.contains(LABEL_FREQUENCY_ATTR));
    assert_ne!(LEFT_WHEEL_ID, RIGHT_WHEEL_ID);
}
