//! Bench loop and trace recording.
//!
//! The runner reproduces the firmware's cooperative tick discipline:
//! scheduled events are applied strictly between ticks, in time order,
//! and the machine reads its parameter snapshot only at tick start.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use vf_controls::{BreathPhase, ControlEvent, VentilatorMachine};

use crate::error::{SimError, SimResult};

/// Options for bench runs.
#[derive(Clone, Debug)]
pub struct BenchOptions {
    /// Fixed tick period (seconds)
    pub dt: f64,
    /// Final bench time (seconds)
    pub t_end: f64,
    /// Maximum number of ticks (safety limit)
    pub max_steps: usize,
    /// Record every N-th tick (decimation)
    pub record_every: usize,
}

impl Default for BenchOptions {
    fn default() -> Self {
        Self {
            dt: 0.02,
            t_end: 10.0,
            max_steps: 1_000_000,
            record_every: 1,
        }
    }
}

/// An event applied at a scheduled bench time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    /// Bench time at which the event lands (seconds).
    pub at: f64,
    pub event: ControlEvent,
}

/// One recorded tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TickSample {
    /// Bench time (seconds).
    pub t: f64,
    /// Drive signal after the tick (command units).
    pub drive: f64,
    /// Controller target (command units).
    pub target: f64,
    pub phase: BreathPhase,
}

/// Recorded bench trace.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BenchTrace {
    pub samples: Vec<TickSample>,
    /// Breath cycles completed (exhale-to-inhale transitions).
    pub breaths: usize,
    /// Ticks executed.
    pub ticks: usize,
}

impl BenchTrace {
    pub fn final_sample(&self) -> Option<&TickSample> {
        self.samples.last()
    }
}

/// Progress callback payload.
#[derive(Clone, Copy, Debug)]
pub struct BenchProgress {
    pub t: f64,
    pub t_end: f64,
    pub fraction_complete: f64,
    pub step: usize,
}

/// Run a bench loop with default (no) progress reporting.
pub fn run_bench(
    machine: &mut VentilatorMachine,
    events: &[ScheduledEvent],
    opts: &BenchOptions,
) -> SimResult<BenchTrace> {
    run_bench_with_progress(machine, events, opts, None)
}

/// Run a bench loop, streaming completion fractions to `progress`.
pub fn run_bench_with_progress(
    machine: &mut VentilatorMachine,
    events: &[ScheduledEvent],
    opts: &BenchOptions,
    mut progress: Option<&mut dyn FnMut(BenchProgress)>,
) -> SimResult<BenchTrace> {
    if opts.dt <= 0.0 {
        return Err(SimError::InvalidArg {
            what: "dt must be positive",
        });
    }
    if opts.t_end < 0.0 {
        return Err(SimError::InvalidArg {
            what: "t_end must be non-negative",
        });
    }
    if opts.max_steps == 0 {
        return Err(SimError::InvalidArg {
            what: "max_steps must be positive",
        });
    }
    if opts.record_every == 0 {
        return Err(SimError::InvalidArg {
            what: "record_every must be positive",
        });
    }

    // Apply in time order regardless of script order.
    let mut queue: Vec<&ScheduledEvent> = events.iter().collect();
    queue.sort_by(|a, b| a.at.partial_cmp(&b.at).unwrap_or(std::cmp::Ordering::Equal));
    let mut next_event = 0;

    info!(dt = opts.dt, t_end = opts.t_end, events = queue.len(), "bench run start");

    let mut trace = BenchTrace::default();
    let mut t = 0.0;
    let mut step = 0;
    let mut last_phase = machine.phase();
    let mut last_recorded = None;

    while t < opts.t_end && step < opts.max_steps {
        // Events land between ticks, never mid-tick.
        while next_event < queue.len() && queue[next_event].at <= t {
            let scheduled = queue[next_event];
            debug!(at = scheduled.at, event = ?scheduled.event, "apply scheduled event");
            machine.handle_event(t, scheduled.event);
            next_event += 1;
        }
        // Stand in for the dashboard: consume the per-parameter
        // notifications the edits produced.
        for (param, value) in machine.take_parameter_changes() {
            debug!(?param, value, "parameter notification");
        }

        let drive = machine.tick(t);
        let phase = machine.phase();
        if phase == BreathPhase::Inhale && last_phase == BreathPhase::Exhale {
            trace.breaths += 1;
        }
        last_phase = phase;

        if step % opts.record_every == 0 {
            trace.samples.push(TickSample {
                t,
                drive,
                target: machine.target(),
                phase,
            });
            last_recorded = Some(step);
        }

        step += 1;
        t += opts.dt;

        if let Some(cb) = progress.as_deref_mut() {
            if step % 256 == 0 {
                cb(BenchProgress {
                    t,
                    t_end: opts.t_end,
                    fraction_complete: (t / opts.t_end).min(1.0),
                    step,
                });
            }
        }
    }
    trace.ticks = step;

    // Always record final state
    if step > 0 && last_recorded != Some(step - 1) {
        trace.samples.push(TickSample {
            t: t - opts.dt,
            drive: machine.position(),
            target: machine.target(),
            phase: machine.phase(),
        });
    }

    info!(ticks = trace.ticks, breaths = trace.breaths, "bench run complete");
    Ok(trace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bench_options_defaults() {
        let opts = BenchOptions::default();
        assert_eq!(opts.dt, 0.02);
        assert_eq!(opts.t_end, 10.0);
        assert_eq!(opts.record_every, 1);
    }

    #[test]
    fn invalid_options_are_rejected() {
        let mut machine = VentilatorMachine::new();
        let bad_dt = BenchOptions {
            dt: 0.0,
            ..BenchOptions::default()
        };
        assert!(run_bench(&mut machine, &[], &bad_dt).is_err());

        let bad_decimation = BenchOptions {
            record_every: 0,
            ..BenchOptions::default()
        };
        assert!(run_bench(&mut machine, &[], &bad_decimation).is_err());
    }

    #[test]
    fn idle_machine_traces_home() {
        let mut machine = VentilatorMachine::new();
        let opts = BenchOptions {
            t_end: 1.0,
            ..BenchOptions::default()
        };
        let trace = run_bench(&mut machine, &[], &opts).unwrap();
        assert_eq!(trace.breaths, 0);
        let home = machine.calibration().home();
        assert!(trace.samples.iter().all(|s| s.drive == home));
    }

    #[test]
    fn scripted_run_counts_breaths() {
        let mut machine = VentilatorMachine::new();
        let events = vec![ScheduledEvent {
            at: 0.0,
            event: ControlEvent::RunToggled { on: true },
        }];
        // Defaults: Ti=1.0, Te=2.0 -> one full cycle every 3.0 s.
        let opts = BenchOptions {
            t_end: 9.5,
            ..BenchOptions::default()
        };
        let trace = run_bench(&mut machine, &events, &opts).unwrap();
        assert!(trace.breaths >= 2);
        assert!(trace.samples.iter().any(|s| s.phase == BreathPhase::Exhale));
    }

    #[test]
    fn events_apply_in_time_order() {
        let mut machine = VentilatorMachine::new();
        // Scripted out of order; the late rate edit must win.
        let events = vec![
            ScheduledEvent {
                at: 2.0,
                event: ControlEvent::RateChanged { value: 12.0 },
            },
            ScheduledEvent {
                at: 1.0,
                event: ControlEvent::RateChanged { value: 35.0 },
            },
        ];
        let opts = BenchOptions {
            t_end: 3.0,
            ..BenchOptions::default()
        };
        run_bench(&mut machine, &events, &opts).unwrap();
        assert_eq!(machine.parameters().rate, 12.0);
    }

    #[test]
    fn final_state_is_always_recorded() {
        let mut machine = VentilatorMachine::new();
        let opts = BenchOptions {
            t_end: 1.0,
            record_every: 6,
            ..BenchOptions::default()
        };
        let trace = run_bench(&mut machine, &[], &opts).unwrap();
        let last = trace.final_sample().unwrap();
        // 50 ticks; the last tick (t = 0.98) misses the decimation grid
        // but is recorded anyway.
        assert!((last.t - 0.98).abs() < 1e-9);
    }

    #[test]
    fn progress_reports_monotonic_fractions() {
        let mut machine = VentilatorMachine::new();
        let events = vec![ScheduledEvent {
            at: 0.0,
            event: ControlEvent::RunToggled { on: true },
        }];
        let opts = BenchOptions {
            dt: 0.002,
            t_end: 2.0,
            ..BenchOptions::default()
        };
        let mut fractions = Vec::new();
        let mut cb = |p: BenchProgress| fractions.push(p.fraction_complete);
        run_bench_with_progress(&mut machine, &events, &opts, Some(&mut cb)).unwrap();
        assert!(!fractions.is_empty());
        assert!(fractions.windows(2).all(|w| w[0] <= w[1]));
    }
}
