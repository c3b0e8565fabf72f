use std::cell::RefCell;
use std::rc::Rc;
use twinwheels_core::constants::{DEFAULT_ANCHORS_HZ, MAX_FREQUENCY_HZ};
use twinwheels_core::{FrequencyMapper, WheelController, WheelState, WrapSector};

fn default_wheel() -> WheelController {
    let mapper = FrequencyMapper::new(
        DEFAULT_ANCHORS_HZ.to_vec(),
        MAX_FREQUENCY_HZ,
        WrapSector::CeilingRamp,
    )
    .unwrap();
    WheelController::new(Rc::new(mapper), DEFAULT_ANCHORS_HZ[0])
}

fn small_wheel(wrap: WrapSector) -> WheelController {
    let mapper = FrequencyMapper::new(vec![100.0, 200.0, 400.0], 800.0, wrap).unwrap();
    WheelController::new(Rc::new(mapper), 100.0)
}

#[test]
fn set_frequency_clamps_to_range() {
    let mut w = default_wheel();
    w.set_frequency(-50.0);
    assert_eq!(w.current_frequency(), 0.0);
    w.set_frequency(9999.0);
    assert_eq!(w.current_frequency(), 4200.0);
    w.set_frequency(f64::NAN);
    assert_eq!(w.current_frequency(), 0.0);
}

#[test]
fn set_frequency_resolves_angle_and_clears_fine() {
    let mut w = small_wheel(WrapSector::CeilingRamp);
    w.apply_fine_delta(3.0);
    w.set_frequency(150.0);
    let s = w.state();
    assert!((s.angle_deg - 60.0).abs() < 1e-9);
    assert_eq!(s.fine_offset_hz, 0.0);
    assert_eq!(s.continuous_hz, 150.0);
    assert_eq!(w.current_frequency(), 150.0);
}

#[test]
fn reset_always_returns_to_lowest_anchor() {
    let mut w = default_wheel();
    for hz in [0.0, 3.3, 528.0, 4200.0] {
        w.set_frequency(hz);
        w.apply_fine_delta(0.05);
        w.apply_drag_delta(17.0);
        assert_eq!(w.reset(), DEFAULT_ANCHORS_HZ[0]);
        assert_eq!(w.state().fine_offset_hz, 0.0);
        assert_eq!(w.state().angle_deg, 0.0);
    }
}

#[test]
fn drag_follows_the_mapping() {
    let mut w = small_wheel(WrapSector::CeilingRamp);
    let hz = w.apply_drag_delta(60.0);
    assert!((hz - 150.0).abs() < 1e-9);
    let hz = w.apply_drag_delta(240.0);
    assert!((hz - 600.0).abs() < 1e-9);
}

#[test]
fn drag_backwards_past_zero_pins_to_zero_position() {
    let mut w = small_wheel(WrapSector::CeilingRamp);
    w.apply_drag_delta(30.0);
    w.apply_fine_delta(2.0);
    let hz = w.apply_drag_delta(-70.0);
    assert_eq!(w.state().angle_deg, 0.0);
    assert_eq!(w.state().fine_offset_hz, 0.0);
    assert!((hz - 100.0).abs() < 1e-9);
}

#[test]
fn drag_forward_past_seam_holds_the_ceiling() {
    let mut w = small_wheel(WrapSector::CeilingRamp);
    w.set_frequency(790.0);
    let hz = w.apply_drag_delta(45.0);
    assert!((hz - 800.0).abs() < 1e-6);
    assert!(w.state().angle_deg < 360.0);
    let hz = w.apply_drag_delta(10.0);
    assert!(hz <= 800.0 && (hz - 800.0).abs() < 1e-6);
}

#[test]
fn back_to_first_wraps_through_the_seam() {
    let mut w = small_wheel(WrapSector::BackToFirst);
    w.set_frequency(400.0);
    let hz = w.apply_drag_delta(130.0);
    assert!((w.state().angle_deg - 10.0).abs() < 1e-9);
    assert!((hz - (100.0 + 100.0 * 10.0 / 120.0)).abs() < 1e-9);
}

#[test]
fn drag_never_leaves_the_range() {
    let mut w = default_wheel();
    let mut seed: u64 = 0x2545_F491_4F6C_DD1D;
    for _ in 0..5000 {
        seed = seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let delta = ((seed >> 33) as f64 / (1u64 << 31) as f64 - 0.5) * 170.0;
        let hz = w.apply_drag_delta(delta);
        assert!((0.0..=MAX_FREQUENCY_HZ).contains(&hz), "hz {hz} after {delta}");
        if seed % 7 == 0 {
            let hz = w.apply_fine_delta(delta);
            assert!((0.0..=MAX_FREQUENCY_HZ).contains(&hz));
        }
    }
}

#[test]
fn fine_delta_snaps_to_exact_zero() {
    let mut w = small_wheel(WrapSector::CeilingRamp);
    let hz = w.apply_fine_delta(-150.0);
    assert_eq!(hz, 0.0);
    let s = w.state();
    assert_eq!(s.continuous_hz, 0.0);
    assert_eq!(s.fine_offset_hz, 0.0);
    assert_eq!(s.angle_deg, 0.0);
}

#[test]
fn fine_delta_is_bounded_above() {
    let mut w = small_wheel(WrapSector::CeilingRamp);
    w.set_frequency(799.5);
    let hz = w.apply_fine_delta(5.0);
    assert_eq!(hz, 800.0);
    assert!((w.state().fine_offset_hz - 0.5).abs() < 1e-9);
}

#[test]
fn fine_delta_keeps_angle() {
    let mut w = small_wheel(WrapSector::CeilingRamp);
    w.apply_drag_delta(60.0);
    let angle = w.state().angle_deg;
    let hz = w.apply_fine_delta(1.25);
    assert_eq!(w.state().angle_deg, angle);
    assert!((hz - 151.25).abs() < 1e-9);
}

#[test]
fn fine_rotation_is_a_tenth_per_turn() {
    let mut w = small_wheel(WrapSector::CeilingRamp);
    let hz = w.apply_fine_rotation(360.0);
    assert!((hz - 100.1).abs() < 1e-9);
    assert!((w.state().fine_rotation_deg - 360.0).abs() < 1e-12);
}

#[test]
fn nudge_and_select_anchor() {
    let mut w = small_wheel(WrapSector::CeilingRamp);
    assert!((w.nudge(0.5) - 100.5).abs() < 1e-9);
    assert_eq!(w.select_anchor(2), 400.0);
    assert!((w.state().angle_deg - 240.0).abs() < 1e-9);
    // Out of range is ignored.
    assert_eq!(w.select_anchor(9), 400.0);
}

#[test]
fn listener_fires_after_every_mutation() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut w = small_wheel(WrapSector::CeilingRamp);
    let sink = seen.clone();
    w.set_on_change(Box::new(move |hz, _: &WheelState| sink.borrow_mut().push(hz)));
    w.set_frequency(200.0);
    w.nudge(1.0);
    w.apply_drag_delta(5.0);
    w.apply_fine_delta(0.5);
    w.reset();
    let seen = seen.borrow();
    assert_eq!(seen.len(), 5);
    assert_eq!(seen[0], 200.0);
    assert_eq!(*seen.last().unwrap(), 100.0);
}

#[test]
fn listener_sees_fine_offset_without_pointer_motion() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut w = small_wheel(WrapSector::CeilingRamp);
    w.set_frequency(150.0);
    let angle = w.state().angle_deg;
    let sink = seen.clone();
    w.set_on_change(Box::new(move |hz, state: &WheelState| {
        sink.borrow_mut().push((hz, state.angle_deg, state.fine_offset_hz))
    }));
    w.apply_fine_delta(0.05);
    w.apply_fine_rotation(180.0);
    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    for (hz, a, _) in seen.iter() {
        assert_eq!(*a, angle, "main pointer moved with the fine dial");
        assert!(*hz > 150.0);
    }
    assert!((seen[1].2 - 0.1).abs() < 1e-12);
}
