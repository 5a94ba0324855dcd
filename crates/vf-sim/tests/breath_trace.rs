//! End-to-end bench traces of the assembled machine.

use vf_controls::{BreathPhase, ControlEvent, VentilatorMachine};
use vf_sim::{BenchOptions, ScheduledEvent, run_bench};

fn start_event() -> ScheduledEvent {
    ScheduledEvent {
        at: 0.0,
        event: ControlEvent::RunToggled { on: true },
    }
}

#[test]
fn full_volume_breath_reaches_calibrated_endpoints() {
    let mut machine = VentilatorMachine::new();
    let events = vec![
        ScheduledEvent {
            at: 0.0,
            event: ControlEvent::VolumeChanged { value: 800.0 },
        },
        start_event(),
    ];
    let opts = BenchOptions {
        t_end: 6.5,
        ..BenchOptions::default()
    };
    let trace = run_bench(&mut machine, &events, &opts).unwrap();

    let home = machine.calibration().home();
    let inhale_end = machine.calibration().inhale_end();
    let deepest = trace
        .samples
        .iter()
        .map(|s| s.drive)
        .fold(f64::INFINITY, f64::min);

    // Rate-limited drive tracks the target closely enough to come
    // within a few steps of the calibrated endpoint, then return home.
    assert!(deepest < inhale_end + 100.0);
    assert!(
        trace
            .samples
            .iter()
            .any(|s| s.phase == BreathPhase::Exhale && s.drive > home - 30.0)
    );
    assert!(trace.breaths >= 1);
}

#[test]
fn partial_volume_shortens_the_stroke() {
    let deepest_at = |volume: f64| {
        let mut machine = VentilatorMachine::new();
        let events = vec![
            ScheduledEvent {
                at: 0.0,
                event: ControlEvent::VolumeChanged { value: volume },
            },
            start_event(),
        ];
        let opts = BenchOptions {
            t_end: 3.0,
            ..BenchOptions::default()
        };
        let trace = run_bench(&mut machine, &events, &opts).unwrap();
        trace
            .samples
            .iter()
            .map(|s| s.drive)
            .fold(f64::INFINITY, f64::min)
    };

    let deep_min = deepest_at(200.0);
    let deep_max = deepest_at(800.0);
    // Smaller tidal volume, shorter stroke; but never zero motion.
    assert!(deep_min > deep_max);
    let home = VentilatorMachine::new().calibration().home();
    assert!(deep_min < home - 50.0);
}

#[test]
fn mid_run_rate_edit_takes_effect_at_phase_boundary() {
    let mut machine = VentilatorMachine::new();
    let events = vec![
        start_event(),
        // Land mid-inhale; the running phase must finish its 1.0 s.
        ScheduledEvent {
            at: 0.5,
            event: ControlEvent::TiChanged { value: 0.5 },
        },
    ];
    let opts = BenchOptions {
        t_end: 1.0,
        ..BenchOptions::default()
    };
    let trace = run_bench(&mut machine, &events, &opts).unwrap();
    // Still inhaling right up to the original boundary.
    assert!(
        trace
            .samples
            .iter()
            .filter(|s| s.t < 0.99)
            .all(|s| s.phase == BreathPhase::Inhale)
    );
}

#[test]
fn stop_mid_breath_settles_at_home() {
    let mut machine = VentilatorMachine::new();
    let events = vec![
        start_event(),
        ScheduledEvent {
            at: 0.6,
            event: ControlEvent::RunToggled { on: false },
        },
    ];
    let opts = BenchOptions {
        t_end: 4.0,
        ..BenchOptions::default()
    };
    let trace = run_bench(&mut machine, &events, &opts).unwrap();
    let home = machine.calibration().home();

    let last = trace.final_sample().unwrap();
    assert_eq!(last.phase, BreathPhase::Stopped);
    assert_eq!(last.drive, home);

    // The return is rate-limited: no sample-to-sample jump exceeds the
    // default step limit.
    let max_jump = trace
        .samples
        .windows(2)
        .map(|w| (w[1].drive - w[0].drive).abs())
        .fold(0.0, f64::max);
    assert!(max_jump <= vf_controls::DEFAULT_MAX_STEP + 1e-12);
}
