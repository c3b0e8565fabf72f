use twinwheels_core::{
    ConfigError, Easing, ModulationSpec, NextTick, Phase, ProgressionLibrary, Sequence,
    SequenceEvent, SequenceOptions, Sequencer, SequencerState,
};

fn sequencer() -> Sequencer {
    Sequencer::new(8.0, ProgressionLibrary::with_defaults()).unwrap()
}

fn two_phase() -> Sequence {
    Sequence::new(
        "two",
        vec![
            Phase::new("settle", 10.0, 100.0, 110.0),
            Phase::new("rise", 10.0, 200.0, 220.0),
        ],
    )
    .unwrap()
}

#[test]
fn total_duration_is_the_exact_sum() {
    let phases = vec![
        Phase::new("a", 1.5, 100.0, 100.0),
        Phase::new("b", 2.25, 100.0, 100.0),
        Phase::new("c", 60.0, 100.0, 100.0),
    ];
    let expected: f64 = phases.iter().map(|p| p.duration_seconds).sum();
    let seq = Sequence::new("sum", phases).unwrap();
    assert_eq!(seq.total_duration(), expected);
    assert_eq!(seq.phase_at(0.0), (0, 0.0));
    assert_eq!(seq.phase_at(1.5), (1, 0.0));
    assert_eq!(seq.phase_at(100.0), (2, 60.0));
}

#[test]
fn invalid_sequences_are_rejected() {
    assert!(matches!(
        Sequence::new("empty", vec![]),
        Err(ConfigError::EmptySequence(_))
    ));
    assert!(matches!(
        Sequence::new("zero", vec![Phase::new("z", 0.0, 1.0, 1.0)]),
        Err(ConfigError::InvalidDuration { .. })
    ));
    assert!(matches!(
        Sequence::new("neg", vec![Phase::new("n", -3.0, 1.0, 1.0)]),
        Err(ConfigError::InvalidDuration { .. })
    ));
    assert!(matches!(
        Sequence::new("nan", vec![Phase::new("n", 3.0, f64::NAN, 1.0)]),
        Err(ConfigError::NonFiniteValue { field: "left_hz", .. })
    ));
    let breath = Phase::new("b", 3.0, 1.0, 1.0).with_modulation(ModulationSpec::Breath {
        period_seconds: 0.0,
        depth_hz: 1.0,
    });
    assert!(Sequence::new("breath", vec![breath]).is_err());
    assert!(Sequencer::new(0.0, ProgressionLibrary::empty()).is_err());
}

#[test]
fn crossfade_blends_into_the_second_phase() {
    let mut s = sequencer();
    let run = s
        .start(two_phase(), SequenceOptions::default(), 0.0)
        .unwrap();
    assert_eq!(run.initial.left_hz, 100.0);
    assert_eq!(run.initial.right_hz, 110.0);

    let f = s.tick(run.id, 5.0).frame.unwrap();
    assert_eq!(f.left_hz, 100.0);

    let mut prev = 100.0;
    for t in [10.5, 11.0, 12.0, 14.0, 17.0] {
        let f = s.tick(run.id, t).frame.unwrap();
        assert!(
            f.left_hz > 100.0 && f.left_hz < 200.0,
            "left {} at {t}",
            f.left_hz
        );
        assert!(f.left_hz > prev, "not rising at {t}");
        prev = f.left_hz;
    }

    // Past the window the raw glide takes over.
    let f = s.tick(run.id, 18.5).frame.unwrap();
    let raw = 100.0 + 100.0 * Easing::EaseInOutCubic.apply(0.85);
    assert!((f.left_hz - raw).abs() < 1e-9);
}

#[test]
fn crossfade_is_continuous_at_the_boundary() {
    // Phase one sweeps its own trajectory; phase two's entry values differ,
    // so without blending the right channel would jump by ~60 Hz.
    let sweep = Phase::new("sweep", 10.0, 0.0, 150.0).with_modulation(ModulationSpec::BeatSweep {
        carrier_hz: 200.0,
        from_beat_hz: 0.0,
        to_beat_hz: 10.0,
    });
    let glide = Phase::new("glide", 10.0, 200.0, 300.0);
    let seq = Sequence::new("cont", vec![sweep, glide]).unwrap();
    let mut s = sequencer();
    let run = s.start(seq, SequenceOptions::default(), 0.0).unwrap();

    let before = s.tick(run.id, 9.999).frame.unwrap();
    let at = s.tick(run.id, 10.0).frame.unwrap();
    let after = s.tick(run.id, 10.001).frame.unwrap();
    assert!((at.right_hz - before.right_hz).abs() < 0.05);
    assert!((after.right_hz - at.right_hz).abs() < 0.05);
    assert!((after.left_hz - at.left_hz).abs() < 0.05);
}

#[test]
fn short_phase_ending_mid_blend_stays_continuous() {
    // The 2 s phase ends while its own 8 s blend is still running.
    let seq = Sequence::new(
        "short",
        vec![
            Phase::new("a", 10.0, 100.0, 100.0),
            Phase::new("b", 2.0, 200.0, 200.0),
            Phase::new("c", 10.0, 300.0, 300.0),
        ],
    )
    .unwrap();
    let mut s = Sequencer::default();
    let run = s.start(seq, SequenceOptions::default(), 0.0).unwrap();

    let mut prev = run.initial.left_hz;
    let mut worst = (0.0, 0.0);
    for ms in 1..22_000 {
        let t = ms as f64 / 1000.0;
        let f = s.tick(run.id, t).frame.unwrap();
        let step = (f.left_hz - prev).abs();
        if step > worst.0 {
            worst = (step, t);
        }
        prev = f.left_hz;
    }
    assert!(worst.0 < 0.5, "step of {:.3} Hz at t={:.3}", worst.0, worst.1);
}

#[test]
fn completion_is_exact_and_final() {
    let mut s = sequencer();
    let run = s
        .start(two_phase(), SequenceOptions::default(), 100.0)
        .unwrap();
    assert_eq!(s.tick(run.id, 110.0).next, NextTick::Continue);
    let report = s.tick(run.id, 120.0);
    assert_eq!(report.next, NextTick::Stop);
    assert!(report
        .events
        .iter()
        .any(|e| matches!(e, SequenceEvent::Completed { fade_out: None })));
    assert_eq!(report.frame.unwrap().left_hz, 200.0);
    assert!(matches!(s.state(), SequencerState::Completed(_)));

    let p = s.progress().unwrap();
    assert_eq!(p.fraction_complete, 1.0);
    assert_eq!(p.elapsed_seconds, 20.0);
    assert_eq!(p.phase_index, 1);

    let again = s.tick(run.id, 121.0);
    assert!(again.frame.is_none());
    assert!(again.events.is_empty());
    assert_eq!(again.next, NextTick::Stop);
}

#[test]
fn late_frame_completes_without_overshoot() {
    let mut s = sequencer();
    let run = s
        .start(two_phase(), SequenceOptions::default(), 0.0)
        .unwrap();
    let report = s.tick(run.id, 500.0);
    assert_eq!(report.next, NextTick::Stop);
    assert_eq!(s.progress().unwrap().elapsed_seconds, 20.0);
}

#[test]
fn starting_again_supersedes_the_first_run() {
    let mut s = sequencer();
    let first = s
        .start(two_phase(), SequenceOptions::default(), 0.0)
        .unwrap();
    let second = s
        .start(two_phase(), SequenceOptions::default(), 3.0)
        .unwrap();
    assert_eq!(second.replaced, Some(first.id));
    assert!(second.id > first.id);
    assert_eq!(s.active_run(), Some(second.id));

    let stale = s.tick(first.id, 5.0);
    assert!(stale.frame.is_none());
    assert_eq!(stale.next, NextTick::Stop);
    assert_eq!(s.progress().unwrap().elapsed_seconds, 0.0);

    let live = s.tick(second.id, 5.0);
    assert!(live.frame.is_some());
    assert_eq!(s.progress().unwrap().elapsed_seconds, 2.0);
}

#[test]
fn stop_is_idempotent() {
    let mut s = sequencer();
    let run = s
        .start(two_phase(), SequenceOptions::default(), 0.0)
        .unwrap();
    assert_eq!(s.stop(), Some(run.id));
    assert_eq!(s.stop(), None);
    assert!(matches!(s.state(), SequencerState::Idle));
    assert!(s.tick(run.id, 1.0).frame.is_none());
    assert!(s.progress().is_none());
}

#[test]
fn stop_after_completion_returns_to_idle() {
    let mut s = sequencer();
    let run = s
        .start(two_phase(), SequenceOptions::default(), 0.0)
        .unwrap();
    s.tick(run.id, 25.0);
    assert_eq!(s.stop(), None);
    assert!(matches!(s.state(), SequencerState::Idle));
}

#[test]
fn phase_changes_are_reported() {
    let seq = Sequence::new(
        "three",
        vec![
            Phase::new("a", 5.0, 100.0, 100.0),
            Phase::new("b", 5.0, 100.0, 100.0),
            Phase::new("c", 5.0, 100.0, 100.0),
        ],
    )
    .unwrap();
    let mut s = sequencer();
    let run = s.start(seq, SequenceOptions::default(), 0.0).unwrap();
    let r = s.tick(run.id, 0.0);
    assert_eq!(
        r.events.as_slice(),
        &[SequenceEvent::PhaseChanged {
            index: 0,
            name: "a".into()
        }]
    );
    assert!(s.tick(run.id, 1.0).events.is_empty());
    // A long stall skips phase b entirely.
    let r = s.tick(run.id, 11.0);
    assert_eq!(
        r.events.as_slice(),
        &[SequenceEvent::PhaseChanged {
            index: 2,
            name: "c".into()
        }]
    );
    assert_eq!(s.progress().unwrap().phase_label, "c");
}

#[test]
fn completion_carries_the_fade_option() {
    let mut s = sequencer();
    let opts = SequenceOptions {
        fade_out_on_complete: Some(3.0),
    };
    let run = s.start(two_phase(), opts, 0.0).unwrap();
    let r = s.tick(run.id, 20.0);
    assert!(r
        .events
        .contains(&SequenceEvent::Completed { fade_out: Some(3.0) }));
}

#[test]
fn unknown_progression_is_rejected_without_disturbing_the_run() {
    let mut s = sequencer();
    let run = s
        .start(two_phase(), SequenceOptions::default(), 0.0)
        .unwrap();
    let bad = Sequence::new(
        "bad",
        vec![
            Phase::new("h", 5.0, 0.0, 0.0).with_modulation(ModulationSpec::Harmonic {
                progression: "nope".into(),
                root_hz: 200.0,
            }),
        ],
    )
    .unwrap();
    assert!(matches!(
        s.start(bad, SequenceOptions::default(), 1.0),
        Err(ConfigError::UnknownProgression(_))
    ));
    assert_eq!(s.active_run(), Some(run.id));
}

#[test]
fn harmonic_phase_follows_its_progression() {
    let seq = Sequence::new(
        "journey",
        vec![Phase::new("h", 30.0, 0.0, 0.0)
            .with_easing(Easing::Linear)
            .with_modulation(ModulationSpec::Harmonic {
                progression: "ascending_light".into(),
                root_hz: 200.0,
            })],
    )
    .unwrap();
    let mut s = sequencer();
    let run = s.start(seq, SequenceOptions::default(), 0.0).unwrap();
    assert_eq!(run.initial.left_hz, 200.0);
    assert_eq!(run.initial.right_hz, 200.0);
    let f = s.tick(run.id, 20.0).frame.unwrap();
    assert_eq!(f.left_hz, 200.0);
    assert!((f.right_hz - 300.0).abs() < 1e-9, "fifth at t=2/3");
    let f = s.tick(run.id, 30.0).frame.unwrap();
    assert!((f.right_hz - 400.0).abs() < 1e-9);
}

#[test]
fn breath_and_pan_drift_shapes() {
    let breath = Phase::new("breath", 8.0, 200.0, 210.0).with_modulation(ModulationSpec::Breath {
        period_seconds: 8.0,
        depth_hz: 5.0,
    });
    let drift = Phase::new("drift", 4.0, 200.0, 210.0)
        .with_pans(-0.5, 0.5)
        .with_modulation(ModulationSpec::PanDrift {
            cycles: 1.0,
            depth: 0.4,
        });
    let seq = Sequence::new("shapes", vec![breath, drift]).unwrap();
    let lib = ProgressionLibrary::empty();
    let quarter = seq.evaluate(0, 0.25, &lib);
    assert!((quarter.left_hz - 205.0).abs() < 1e-9);
    assert!((quarter.right_hz - 215.0).abs() < 1e-9);
    assert!(((quarter.right_hz - quarter.left_hz) - 10.0).abs() < 1e-9);

    let f = seq.evaluate(1, 0.25, &lib);
    assert_eq!(f.left_hz, 200.0);
    assert!((f.left_pan.unwrap() + 0.1).abs() < 1e-9);
    assert!((f.right_pan.unwrap() - 0.1).abs() < 1e-9);
}

#[test]
fn sequences_load_from_json() {
    let json = r#"{
        "name": "evening",
        "phases": [
            { "name": "arrive", "duration_seconds": 30, "left_hz": 200, "right_hz": 210 },
            { "name": "deepen", "duration_seconds": 60, "left_hz": 180, "right_hz": 184,
              "left_pan": -0.8, "right_pan": 0.8, "easing": "ease_in_out_sine" },
            { "name": "sweep", "duration_seconds": 45, "left_hz": 0, "right_hz": 0,
              "modulation": { "type": "beat_sweep", "carrier_hz": 180, "from_beat_hz": 4, "to_beat_hz": 2 } }
        ]
    }"#;
    let seq = Sequence::from_json(json).unwrap();
    assert_eq!(seq.name(), "evening");
    assert_eq!(seq.total_duration(), 135.0);
    assert_eq!(seq.phases()[1].easing, Easing::EaseInOutSine);
    assert_eq!(seq.phases()[1].left_pan, Some(-0.8));
    assert_eq!(seq.phases()[0].modulation, ModulationSpec::Glide);
    assert!(matches!(
        seq.phases()[2].modulation,
        ModulationSpec::BeatSweep { carrier_hz, .. } if carrier_hz == 180.0
    ));

    assert!(matches!(
        Sequence::from_json("{ \"name\": 3 }"),
        Err(ConfigError::Parse(_))
    ));
    assert!(matches!(
        Sequence::from_json(r#"{ "name": "x", "phases": [] }"#),
        Err(ConfigError::EmptySequence(_))
    ));
}
