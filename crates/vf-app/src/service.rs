//! Scenario execution service.

use tracing::{info, warn};
use vf_controls::{CalibrationPoint, ControlEvent, VentilatorMachine};
use vf_sim::{BenchOptions, BenchProgress, BenchTrace, ScheduledEvent, run_bench_with_progress};

use crate::error::AppResult;
use crate::scenario::Scenario;

/// Outcome of a scenario run.
#[derive(Debug, Clone)]
pub struct BenchReport {
    pub scenario_name: Option<String>,
    pub trace: BenchTrace,
    /// Validation warnings surfaced before the run.
    pub warnings: Vec<String>,
    /// Machine state after the run, for summaries.
    pub final_parameters: vf_controls::BreathParameters,
    pub final_position: f64,
}

/// Build a power-on machine and apply the scenario's initial overrides.
pub fn build_machine(scenario: &Scenario) -> AppResult<VentilatorMachine> {
    let mut machine = match scenario.run.max_step {
        Some(step) => VentilatorMachine::with_max_step(step)?,
        None => VentilatorMachine::new(),
    };
    if let Some(cal) = &scenario.calibration {
        let pairs = [
            (CalibrationPoint::Home, cal.home),
            (CalibrationPoint::InhaleEnd, cal.inhale_end),
            (CalibrationPoint::ExhaleEnd, cal.exhale_end),
        ];
        for (point, value) in pairs {
            if let Some(value) = value {
                machine.handle_event(0.0, ControlEvent::Calibrated { point, value });
            }
        }
    }
    if let Some(p) = &scenario.parameters {
        // Same edit order an operator would use: schedule first, then
        // phase times, so Ti/Te overrides are authoritative.
        if let Some(value) = p.rate {
            machine.handle_event(0.0, ControlEvent::RateChanged { value });
        }
        if let Some(value) = p.ti {
            machine.handle_event(0.0, ControlEvent::TiChanged { value });
        }
        if let Some(value) = p.te {
            machine.handle_event(0.0, ControlEvent::TeChanged { value });
        }
        if let Some(value) = p.volume {
            machine.handle_event(0.0, ControlEvent::VolumeChanged { value });
        }
    }
    // Overrides are power-on setup, not dashboard traffic.
    machine.take_parameter_changes();
    Ok(machine)
}

/// Validate and run a scenario to completion.
pub fn run_scenario(scenario: &Scenario) -> AppResult<BenchReport> {
    run_scenario_with_progress(scenario, None)
}

/// Validate and run a scenario, streaming bench progress events.
pub fn run_scenario_with_progress(
    scenario: &Scenario,
    progress: Option<&mut dyn FnMut(BenchProgress)>,
) -> AppResult<BenchReport> {
    let warnings = crate::scenario::validate_scenario(scenario)?;
    for warning in &warnings {
        warn!(%warning, "scenario warning");
    }

    let mut machine = build_machine(scenario)?;
    let events: Vec<ScheduledEvent> = scenario
        .events
        .iter()
        .map(|e| ScheduledEvent {
            at: e.at_s,
            event: e.event,
        })
        .collect();
    let opts = BenchOptions {
        dt: scenario.run.dt_s,
        t_end: scenario.run.t_end_s,
        record_every: scenario.run.record_every,
        ..BenchOptions::default()
    };

    let trace = run_bench_with_progress(&mut machine, &events, &opts, progress)?;
    info!(
        ticks = trace.ticks,
        breaths = trace.breaths,
        "scenario complete"
    );

    Ok(BenchReport {
        scenario_name: scenario.name.clone(),
        trace,
        warnings,
        final_parameters: machine.parameters(),
        final_position: machine.position(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::parse_scenario;

    #[test]
    fn overrides_apply_before_the_run() {
        let scenario = parse_scenario(
            r#"
parameters:
  rate: 15.0
  ti: 1.5
calibration:
  home: 1900.0
run:
  t_end_s: 1.0
"#,
        )
        .unwrap();
        let machine = build_machine(&scenario).unwrap();
        let p = machine.parameters();
        assert_eq!(p.rate, 15.0);
        assert_eq!(p.ti, 1.5);
        assert_eq!(machine.calibration().home(), 1900.0);
    }

    #[test]
    fn bad_step_limit_fails_at_build() {
        let scenario = parse_scenario("run:\n  t_end_s: 1.0\n  max_step: 0.0\n").unwrap();
        let err = run_scenario(&scenario).unwrap_err();
        assert!(format!("{err}").contains("max_step"));
    }

    #[test]
    fn scripted_scenario_breathes() {
        let scenario = parse_scenario(
            r#"
run:
  t_end_s: 7.0
events:
  - at_s: 0.0
    type: RunToggled
    on: true
"#,
        )
        .unwrap();
        let report = run_scenario(&scenario).unwrap();
        assert!(report.trace.breaths >= 1);
        assert!(report.warnings.is_empty());
    }
}
