//! Shared application service layer for ventiflow.
//!
//! This crate provides a unified interface for bench frontends,
//! centralizing scenario loading, validation, run execution, and trace
//! export.

pub mod error;
pub mod export;
pub mod scenario;
pub mod service;

// Re-export key types for convenience
pub use error::{AppError, AppResult};
pub use export::{TraceReport, trace_csv, trace_report, write_trace_csv, write_trace_json};
pub use scenario::{
    CalibrationBlock, ParameterOverrides, RunBlock, Scenario, ScenarioEvent, load_scenario,
    parse_scenario, validate_scenario,
};
pub use service::{BenchReport, build_machine, run_scenario, run_scenario_with_progress};
