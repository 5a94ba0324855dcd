//! Bench scenario schema (YAML).
//!
//! A scenario describes one bench run: optional initial parameter and
//! calibration overrides, the run window, and a scripted event
//! sequence. Validation flags structural mistakes as errors and
//! clinically out-of-span values as warnings only; out-of-span values
//! clamp at run time exactly as they would on the device.

use std::path::Path;

use serde::{Deserialize, Serialize};
use vf_controls::{ControlEvent, Param};

use crate::error::{AppError, AppResult};

/// Initial clinical-parameter overrides applied before the run starts.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ParameterOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ti: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub te: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

/// Calibration endpoints applied before the run starts (command units).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CalibrationBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inhale_end: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exhale_end: Option<f64>,
}

/// Run window and tick configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RunBlock {
    /// Tick period in seconds.
    #[serde(default = "default_dt")]
    pub dt_s: f64,
    /// Run length in seconds.
    pub t_end_s: f64,
    /// Record every N-th tick.
    #[serde(default = "default_record_every")]
    pub record_every: usize,
    /// Driver step limit override (command units per tick).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_step: Option<f64>,
}

fn default_dt() -> f64 {
    0.02
}

fn default_record_every() -> usize {
    1
}

/// One scripted event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScenarioEvent {
    /// Bench time the event lands, seconds from run start.
    pub at_s: f64,
    #[serde(flatten)]
    pub event: ControlEvent,
}

/// A complete bench scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<ParameterOverrides>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calibration: Option<CalibrationBlock>,
    pub run: RunBlock,
    #[serde(default)]
    pub events: Vec<ScenarioEvent>,
}

/// Parse a scenario from YAML text.
pub fn parse_scenario(text: &str) -> AppResult<Scenario> {
    Ok(serde_yaml::from_str(text)?)
}

/// Load a scenario from a YAML file.
pub fn load_scenario(path: &Path) -> AppResult<Scenario> {
    let text = std::fs::read_to_string(path).map_err(|source| AppError::ScenarioFileRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_scenario(&text)
}

/// Validate scenario structure; returns clinical warnings.
///
/// Structural mistakes (bad tick period, events outside the run
/// window) are errors. Out-of-span clinical values are warnings only;
/// the device clamps them.
pub fn validate_scenario(scenario: &Scenario) -> AppResult<Vec<String>> {
    if scenario.run.dt_s <= 0.0 {
        return Err(AppError::Validation("run.dt_s must be positive".into()));
    }
    if scenario.run.t_end_s <= 0.0 {
        return Err(AppError::Validation("run.t_end_s must be positive".into()));
    }
    if scenario.run.record_every == 0 {
        return Err(AppError::Validation(
            "run.record_every must be positive".into(),
        ));
    }
    for (i, event) in scenario.events.iter().enumerate() {
        if !event.at_s.is_finite() || event.at_s < 0.0 {
            return Err(AppError::Validation(format!(
                "event {i}: at_s must be non-negative"
            )));
        }
        if event.at_s >= scenario.run.t_end_s {
            return Err(AppError::Validation(format!(
                "event {i}: at_s {} is outside the run window ({} s)",
                event.at_s, scenario.run.t_end_s
            )));
        }
    }

    let mut warnings = Vec::new();
    if let Some(p) = &scenario.parameters {
        let mut check = |name: &str, value: Option<f64>, param: Param| {
            if let Some(v) = value {
                if !param.span().contains(v) {
                    warnings.push(format!("{name} {v} is out of span and will clamp"));
                }
            }
        };
        check("parameters.rate", p.rate, Param::Rate);
        check("parameters.ti", p.ti, Param::InspiratoryTime);
        check("parameters.te", p.te, Param::ExpiratoryTime);
        check("parameters.volume", p.volume, Param::Volume);
    }
    for (i, event) in scenario.events.iter().enumerate() {
        let span = match event.event {
            ControlEvent::RateChanged { value } => Some((value, Param::Rate.span())),
            ControlEvent::TiChanged { value } => Some((value, Param::InspiratoryTime.span())),
            ControlEvent::TeChanged { value } => Some((value, Param::ExpiratoryTime.span())),
            ControlEvent::VolumeChanged { value } => Some((value, Param::Volume.span())),
            _ => None,
        };
        if let Some((value, span)) = span {
            if !span.contains(value) {
                warnings.push(format!("event {i}: value {value} is out of span and will clamp"));
            }
        }
    }
    Ok(warnings)
}
