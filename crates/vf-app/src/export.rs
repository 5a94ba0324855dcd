//! Trace export: CSV for plotting, JSON for archival.

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use vf_sim::BenchTrace;

use crate::error::AppResult;
use crate::service::BenchReport;

/// Render a trace as CSV text (`t_s,drive,target,phase`).
pub fn trace_csv(trace: &BenchTrace) -> String {
    let mut out = String::from("t_s,drive,target,phase\n");
    for s in &trace.samples {
        out.push_str(&format!(
            "{:.4},{:.2},{:.2},{:?}\n",
            s.t, s.drive, s.target, s.phase
        ));
    }
    out
}

/// Write a trace as CSV to `path`.
pub fn write_trace_csv(trace: &BenchTrace, path: &Path) -> AppResult<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(trace_csv(trace).as_bytes())?;
    Ok(())
}

/// Archival JSON record of a bench run.
#[derive(Debug, Clone, Serialize)]
pub struct TraceReport {
    pub scenario_name: Option<String>,
    /// RFC 3339 wall-clock time the report was generated.
    pub generated_at: String,
    pub ticks: usize,
    pub breaths: usize,
    pub final_position: f64,
    /// Final tidal volume in litres, for dashboard-style display.
    pub final_volume_l: f64,
    pub warnings: Vec<String>,
    pub trace: BenchTrace,
}

/// Build the archival report for a completed run.
pub fn trace_report(report: &BenchReport) -> TraceReport {
    TraceReport {
        scenario_name: report.scenario_name.clone(),
        generated_at: chrono::Utc::now().to_rfc3339(),
        ticks: report.trace.ticks,
        breaths: report.trace.breaths,
        final_position: report.final_position,
        final_volume_l: vf_core::units::liters(vf_core::units::cc(
            report.final_parameters.volume,
        )),
        warnings: report.warnings.clone(),
        trace: report.trace.clone(),
    }
}

/// Write the archival JSON record to `path`.
pub fn write_trace_json(report: &BenchReport, path: &Path) -> AppResult<()> {
    let record = trace_report(report);
    let text = serde_json::to_string_pretty(&record)?;
    std::fs::write(path, text)?;
    Ok(())
}
