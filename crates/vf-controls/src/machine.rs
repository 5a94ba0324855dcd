//! The assembled ventilator control core.
//!
//! [`VentilatorMachine`] owns the parameter store, calibration
//! registry, cycle controller, and actuator driver, and exposes the
//! two entry points the firmware loop calls:
//!
//! - [`VentilatorMachine::handle_event`] for debounced input events,
//!   applied strictly between ticks;
//! - [`VentilatorMachine::tick`] for the fixed-period tick, which reads
//!   a parameter snapshot once at tick start and returns the new drive
//!   signal.

use crate::actuator::ActuatorDriver;
use crate::calibration::CalibrationPositions;
use crate::cycle::{BreathPhase, CycleController};
use crate::error::ControlResult;
use crate::event::{CalibrationPoint, ControlEvent};
use crate::params::{BreathParameters, Param, ParameterStore};

/// Complete control core wired together.
#[derive(Debug, Clone)]
pub struct VentilatorMachine {
    store: ParameterStore,
    calibration: CalibrationPositions,
    cycle: CycleController,
    driver: ActuatorDriver,
}

impl Default for VentilatorMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl VentilatorMachine {
    /// Power-on state: default parameters, default calibration, driver
    /// resting at home, not running.
    pub fn new() -> Self {
        let calibration = CalibrationPositions::default();
        let driver = ActuatorDriver::with_default_step(calibration.home());
        Self {
            store: ParameterStore::new(),
            calibration,
            cycle: CycleController::new(),
            driver,
        }
    }

    /// Power-on state with a bench-tuned driver step limit.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_step` is not positive.
    pub fn with_max_step(max_step: f64) -> ControlResult<Self> {
        let calibration = CalibrationPositions::default();
        let driver = ActuatorDriver::new(calibration.home(), max_step)?;
        Ok(Self {
            store: ParameterStore::new(),
            calibration,
            cycle: CycleController::new(),
            driver,
        })
    }

    /// Apply one input event. `now` is the tick-clock time; run toggles
    /// restart the phase clock from here.
    pub fn handle_event(&mut self, now: f64, event: ControlEvent) {
        match event {
            ControlEvent::RateChanged { value } => self.store.set(Param::Rate, value),
            ControlEvent::VolumeChanged { value } => self.store.set(Param::Volume, value),
            ControlEvent::TiChanged { value } => self.store.set(Param::InspiratoryTime, value),
            ControlEvent::TeChanged { value } => self.store.set(Param::ExpiratoryTime, value),
            ControlEvent::RunToggled { on } => {
                if on && self.driver.override_active() {
                    // Starting therapy ends any bench override.
                    self.driver.release_override();
                }
                let params = self.store.snapshot();
                self.cycle.set_running(on, now, &params, &self.calibration);
            }
            ControlEvent::Calibrated { point, value } => match point {
                CalibrationPoint::Home => self.calibration.calibrate_home(value),
                CalibrationPoint::InhaleEnd => self.calibration.calibrate_inhale_end(value),
                CalibrationPoint::ExhaleEnd => self.calibration.calibrate_exhale_end(value),
            },
            ControlEvent::PulseWidth { value } => self.driver.set_pulse_width(value),
        }
    }

    /// Advance one fixed-period tick and return the drive signal.
    pub fn tick(&mut self, now: f64) -> f64 {
        // Single tick-start read; edits landed between ticks.
        let params = self.store.snapshot();
        let target = self.cycle.tick(now, &params, &self.calibration);
        self.driver.set_target(target);
        self.driver.tick()
    }

    /// Drain per-parameter change notifications for the dashboard.
    pub fn take_parameter_changes(&mut self) -> Vec<(Param, f64)> {
        self.store.take_changes()
    }

    pub fn parameters(&self) -> BreathParameters {
        self.store.snapshot()
    }

    pub fn calibration(&self) -> &CalibrationPositions {
        &self.calibration
    }

    pub fn phase(&self) -> BreathPhase {
        self.cycle.phase()
    }

    pub fn is_running(&self) -> bool {
        self.cycle.is_running()
    }

    /// Controller target (command units).
    pub fn target(&self) -> f64 {
        self.cycle.target()
    }

    /// Drive signal position (command units).
    pub fn position(&self) -> f64 {
        self.driver.position()
    }

    /// Drive signal as whole command units for the hardware boundary.
    pub fn pulse_width(&self) -> u16 {
        self.driver.pulse_width()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Run the machine at a fixed period, returning the final time.
    fn run_ticks(machine: &mut VentilatorMachine, from: f64, ticks: usize, dt: f64) -> f64 {
        let mut t = from;
        for _ in 0..ticks {
            machine.tick(t);
            t += dt;
        }
        t
    }

    #[test]
    fn power_on_state_is_stopped_at_home() {
        let mut machine = VentilatorMachine::new();
        assert_eq!(machine.phase(), BreathPhase::Stopped);
        assert!(!machine.is_running());
        let drive = machine.tick(0.0);
        assert_eq!(drive, machine.calibration().home());
    }

    #[test]
    fn run_toggle_produces_breathing_motion() {
        let mut machine = VentilatorMachine::new();
        machine.handle_event(0.0, ControlEvent::RunToggled { on: true });
        assert_eq!(machine.phase(), BreathPhase::Inhale);

        let home = machine.calibration().home();
        run_ticks(&mut machine, 0.0, 50, 0.02); // 1.0 s = full inhale
        assert!(machine.position() < home);
    }

    #[test]
    fn stop_returns_home_rate_limited() {
        let mut machine = VentilatorMachine::new();
        machine.handle_event(0.0, ControlEvent::RunToggled { on: true });
        let t = run_ticks(&mut machine, 0.0, 40, 0.02);
        let mid_stroke = machine.position();

        machine.handle_event(t, ControlEvent::RunToggled { on: false });
        assert_eq!(machine.phase(), BreathPhase::Stopped);
        let drive = machine.tick(t);
        // One bounded step back toward home, not a jump.
        assert!((drive - mid_stroke).abs() <= crate::actuator::DEFAULT_MAX_STEP + 1e-12);

        run_ticks(&mut machine, t, 200, 0.02);
        assert_eq!(machine.position(), machine.calibration().home());
    }

    #[test]
    fn parameter_events_land_in_the_store() {
        let mut machine = VentilatorMachine::new();
        machine.handle_event(0.0, ControlEvent::RateChanged { value: 20.0 });
        machine.handle_event(0.0, ControlEvent::VolumeChanged { value: 900.0 });
        let p = machine.parameters();
        assert_eq!(p.rate, 20.0);
        assert_eq!(p.volume, 800.0); // clamped

        let changes = machine.take_parameter_changes();
        assert_eq!(changes.len(), 2);
    }

    #[test]
    fn calibration_events_update_the_registry() {
        let mut machine = VentilatorMachine::new();
        machine.handle_event(
            0.0,
            ControlEvent::Calibrated {
                point: CalibrationPoint::Home,
                value: 1900.0,
            },
        );
        assert_eq!(machine.calibration().home(), 1900.0);
    }

    #[test]
    fn pulse_width_override_preempts_automatic_control() {
        let mut machine = VentilatorMachine::new();
        machine.handle_event(0.0, ControlEvent::RunToggled { on: true });
        run_ticks(&mut machine, 0.0, 10, 0.02);

        machine.handle_event(0.2, ControlEvent::PulseWidth { value: 1100.0 });
        let drive = machine.tick(0.2);
        assert_eq!(drive, 1100.0);

        // Re-starting therapy releases the override.
        machine.handle_event(0.22, ControlEvent::RunToggled { on: false });
        machine.handle_event(0.24, ControlEvent::RunToggled { on: true });
        let drive = machine.tick(0.24);
        assert!((drive - 1100.0).abs() <= crate::actuator::DEFAULT_MAX_STEP + 1e-12);
        assert_ne!(drive, 1100.0);
    }
}
