//! Control events consumed by the machine's single update entry point.
//!
//! Collaborators (menu widgets, encoder handlers, the serial protocol)
//! translate their inputs into these events; the core never sees a
//! widget. Events serialize with a `type` tag so bench scenarios can
//! script them from YAML.

use serde::{Deserialize, Serialize};

/// Which calibration endpoint an event addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalibrationPoint {
    Home,
    InhaleEnd,
    ExhaleEnd,
}

/// A debounced, already-validated input event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ControlEvent {
    /// Breath rate changed (breaths/min).
    RateChanged { value: f64 },
    /// Tidal volume changed (cc).
    VolumeChanged { value: f64 },
    /// Inspiratory period changed (s).
    TiChanged { value: f64 },
    /// Expiratory period changed (s).
    TeChanged { value: f64 },
    /// Run state toggled.
    RunToggled { on: bool },
    /// A calibration endpoint was set (raw command units).
    Calibrated { point: CalibrationPoint, value: f64 },
    /// Bench override: drive the pulse width directly.
    PulseWidth { value: f64 },
}
