//! Rate-limited actuator driver.
//!
//! The driver owns the physical drive signal. Each tick the current
//! command moves toward the target by at most `max_step` command units,
//! so an abrupt target change (a stop, a calibration jump) never
//! produces an instantaneous jump at the motor.
//!
//! A manual override path exists for bench testing: while engaged the
//! drive output follows the raw pulse width immediately and automatic
//! targets are ignored.

use serde::{Deserialize, Serialize};
use vf_core::numeric::Span;

use crate::error::{ControlError, ControlResult};

/// Absolute drive-signal envelope (hardware pulse-width limits).
pub const COMMAND_SPAN: Span = Span::new(500.0, 2500.0);

/// Default per-tick step limit (command units per tick).
pub const DEFAULT_MAX_STEP: f64 = 25.0;

/// Rate-limited interpolator between controller target and drive output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActuatorDriver {
    current: f64,
    target: f64,
    max_step: f64,
    override_active: bool,
}

impl ActuatorDriver {
    /// Create a driver resting at `initial` (clamped to the command
    /// envelope).
    ///
    /// # Errors
    ///
    /// Returns an error if `max_step` is not positive.
    pub fn new(initial: f64, max_step: f64) -> ControlResult<Self> {
        if max_step <= 0.0 {
            return Err(ControlError::InvalidArg {
                what: "max_step must be positive",
            });
        }
        let initial = COMMAND_SPAN.clamp(initial);
        Ok(Self {
            current: initial,
            target: initial,
            max_step,
            override_active: false,
        })
    }

    /// Create a driver with the default step limit.
    pub fn with_default_step(initial: f64) -> Self {
        let initial = COMMAND_SPAN.clamp(initial);
        Self {
            current: initial,
            target: initial,
            max_step: DEFAULT_MAX_STEP,
            override_active: false,
        }
    }

    /// Set the automatic-control target. Ignored while the manual
    /// override is engaged.
    pub fn set_target(&mut self, cmd: f64) {
        if self.override_active {
            return;
        }
        self.target = COMMAND_SPAN.clamp(cmd);
    }

    /// Engage the manual override: the drive output follows `raw`
    /// immediately and automatic targets are ignored until released.
    pub fn set_pulse_width(&mut self, raw: f64) {
        let raw = COMMAND_SPAN.clamp(raw);
        self.override_active = true;
        self.current = raw;
        self.target = raw;
    }

    /// Release the manual override; automatic control resumes from the
    /// current position.
    pub fn release_override(&mut self) {
        self.override_active = false;
        self.target = self.current;
    }

    pub fn override_active(&self) -> bool {
        self.override_active
    }

    /// Advance one tick: move current toward target by a bounded step.
    /// Returns the new drive signal.
    pub fn tick(&mut self) -> f64 {
        let step = (self.target - self.current).clamp(-self.max_step, self.max_step);
        self.current += step;
        self.current
    }

    /// Current drive signal (command units).
    pub fn position(&self) -> f64 {
        self.current
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// Drive signal rounded to whole command units for the hardware.
    pub fn pulse_width(&self) -> u16 {
        self.current.round() as u16
    }
}
