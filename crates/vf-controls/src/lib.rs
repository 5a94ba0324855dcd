//! Breath-cycle control core for the ventiflow actuator.
//!
//! A single motor drives a bellows between calibrated positions to
//! deliver volume-controlled breaths. This crate is the control core
//! that sits between debounced operator input and the raw drive signal:
//!
//! - Clinical parameters (rate, Ti, Te, tidal volume) are range-clamped
//!   and kept mutually consistent by a deterministic reconciliation
//!   policy (`Ti + Te <= 60/rate`).
//! - A timed state machine (Stopped/Inhale/Exhale) computes a target
//!   actuator position every tick by interpolating between calibrated
//!   endpoints.
//! - A rate-limited driver converges the physical drive signal toward
//!   that target with a bounded step per tick.
//!
//! # Design Principles
//!
//! - **Never refuse, always clamp**: out-of-range clinical input is
//!   limited, not rejected; a refused setting is a worse failure mode
//!   than a limited one on a life-support device.
//! - **Single-writer ticks**: parameter edits land between ticks; the
//!   controller reads a snapshot at tick start, so no value changes
//!   mid-tick.
//! - **Open loop**: targets derive from calibration and elapsed time
//!   only; there is no feedback from a measured signal.

pub mod actuator;
pub mod calibration;
pub mod cycle;
pub mod error;
pub mod event;
pub mod machine;
pub mod params;
pub mod reconcile;

pub use actuator::{ActuatorDriver, COMMAND_SPAN, DEFAULT_MAX_STEP};
pub use calibration::CalibrationPositions;
pub use cycle::{BreathPhase, CycleController, MIN_STROKE_FRACTION, volume_fraction};
pub use error::{ControlError, ControlResult};
pub use event::{CalibrationPoint, ControlEvent};
pub use machine::VentilatorMachine;
pub use params::{
    BreathParameters, Param, ParameterStore, RATE_SPAN, TE_SPAN, TI_SPAN, VOLUME_SPAN,
};
pub use reconcile::{Rewrite, cycle_budget, reconcile};
