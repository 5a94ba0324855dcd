//! Timed breath-cycle state machine.
//!
//! Three states: Stopped, Inhale, Exhale. While running, transitions
//! are driven only by elapsed time against the phase duration that was
//! snapshotted when the phase was entered; a mid-phase parameter edit
//! therefore takes effect at the next phase boundary, never mid-stroke.
//!
//! Each tick the controller computes a target actuator position:
//!
//! - Inhale interpolates from home toward the calibrated inhale end,
//!   with the stroke scaled by the tidal-volume fraction.
//! - Exhale interpolates from the position where the phase started back
//!   to home, always returning fully regardless of volume (passive,
//!   complete exhalation).

use serde::{Deserialize, Serialize};
use tracing::debug;
use vf_core::numeric::Span;

use crate::calibration::CalibrationPositions;
use crate::params::{BreathParameters, VOLUME_SPAN};

/// Stroke fraction commanded at minimum tidal volume.
///
/// Minimum volume still produces visible, safe motion rather than a
/// zero stroke.
pub const MIN_STROKE_FRACTION: f64 = 0.25;

/// Map tidal volume (cc) onto the commanded stroke fraction.
pub fn volume_fraction(volume_cc: f64) -> f64 {
    VOLUME_SPAN.map_onto(volume_cc, Span::new(MIN_STROKE_FRACTION, 1.0))
}

/// Phase of the breath cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreathPhase {
    Stopped,
    Inhale,
    Exhale,
}

/// The breath-cycle controller.
///
/// Owns the cycle state exclusively; collaborators feed it a parameter
/// snapshot and the calibration registry each tick and read back the
/// target position.
#[derive(Debug, Clone)]
pub struct CycleController {
    phase: BreathPhase,
    running: bool,
    /// Tick-clock time at which the current phase was entered (s).
    phase_start: f64,
    /// Duration snapshotted at phase entry (s).
    phase_duration: f64,
    /// Commanded position at phase entry; exhale returns home from here.
    phase_start_pos: f64,
    target: f64,
}

impl Default for CycleController {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleController {
    pub fn new() -> Self {
        let cal = CalibrationPositions::default();
        Self {
            phase: BreathPhase::Stopped,
            running: false,
            phase_start: 0.0,
            phase_duration: 0.0,
            phase_start_pos: cal.home(),
            target: cal.home(),
        }
    }

    pub fn phase(&self) -> BreathPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Last computed target position (command units).
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Elapsed fraction of the current phase, clamped to [0, 1].
    pub fn phase_fraction(&self, now: f64) -> f64 {
        if self.phase_duration <= 0.0 {
            return 1.0;
        }
        ((now - self.phase_start) / self.phase_duration).clamp(0.0, 1.0)
    }

    /// Start or stop the cycle. Starting enters Inhale with a fresh
    /// phase clock; stopping forces the target straight to home (the
    /// driver still rate-limits the physical motion).
    pub fn set_running(
        &mut self,
        on: bool,
        now: f64,
        params: &BreathParameters,
        cal: &CalibrationPositions,
    ) {
        if on == self.running {
            return;
        }
        self.running = on;
        if on {
            self.enter(BreathPhase::Inhale, now, params.ti);
        } else {
            self.enter(BreathPhase::Stopped, now, 0.0);
            self.target = cal.home();
        }
    }

    /// Advance the state machine and compute the tick's target position.
    ///
    /// `params` is the tick-start snapshot; durations only refresh from
    /// it at phase boundaries.
    pub fn tick(
        &mut self,
        now: f64,
        params: &BreathParameters,
        cal: &CalibrationPositions,
    ) -> f64 {
        match self.phase {
            BreathPhase::Inhale if now - self.phase_start >= self.phase_duration => {
                self.enter(BreathPhase::Exhale, now, params.te);
            }
            BreathPhase::Exhale if now - self.phase_start >= self.phase_duration => {
                self.enter(BreathPhase::Inhale, now, params.ti);
            }
            _ => {}
        }

        let f = self.phase_fraction(now);
        self.target = match self.phase {
            BreathPhase::Stopped => cal.home(),
            BreathPhase::Inhale => {
                let stroke = (cal.inhale_end() - cal.home()) * volume_fraction(params.volume);
                cal.home() + f * stroke
            }
            BreathPhase::Exhale => {
                self.phase_start_pos + f * (cal.home() - self.phase_start_pos)
            }
        };
        self.target
    }

    fn enter(&mut self, phase: BreathPhase, now: f64, duration: f64) {
        debug!(from = ?self.phase, to = ?phase, duration_s = duration, "phase transition");
        self.phase = phase;
        self.phase_start = now;
        self.phase_duration = duration;
        self.phase_start_pos = self.target;
    }
}
