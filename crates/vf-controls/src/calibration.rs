//! Calibration registry for the three actuator endpoints.
//!
//! Values are raw command units set by the operator from a calibration
//! screen and held for the session only. No cross-validation: a
//! degenerate calibration (inhale end not beyond home) is deliberate
//! operator action and yields flat or reversed motion downstream, not
//! an error. Re-entering a calibration screen seeds from the stored
//! value, not the actuator's physical position.

use serde::{Deserialize, Serialize};

/// Calibrated actuator-command endpoints (raw command units).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationPositions {
    home: f64,
    inhale_end: f64,
    exhale_end: f64,
}

impl Default for CalibrationPositions {
    fn default() -> Self {
        Self {
            home: 2000.0,
            inhale_end: 1000.0,
            exhale_end: 2000.0,
        }
    }
}

impl CalibrationPositions {
    pub fn calibrate_home(&mut self, v: f64) {
        self.home = v;
    }

    pub fn calibrate_inhale_end(&mut self, v: f64) {
        self.inhale_end = v;
    }

    pub fn calibrate_exhale_end(&mut self, v: f64) {
        self.exhale_end = v;
    }

    /// Rest position; the breath cycle starts and ends here.
    pub fn home(&self) -> f64 {
        self.home
    }

    /// Full-stroke inhale endpoint.
    pub fn inhale_end(&self) -> f64 {
        self.inhale_end
    }

    /// Exhale endpoint; calibration-screen seed only, the exhale phase
    /// itself returns to home.
    pub fn exhale_end(&self) -> f64 {
        self.exhale_end
    }
}
