//! Error types for the vf-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates
/// and provides a unified error interface for frontends.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to read scenario file: {path}")]
    ScenarioFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Scenario parse error: {0}")]
    ScenarioParse(#[from] serde_yaml::Error),

    #[error("Scenario validation failed: {0}")]
    Validation(String),

    #[error("Bench error: {0}")]
    Bench(String),

    #[error("Export error: {0}")]
    Export(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for vf-app operations.
pub type AppResult<T> = Result<T, AppError>;

// Conversions from backend error types
impl From<vf_sim::SimError> for AppError {
    fn from(err: vf_sim::SimError) -> Self {
        AppError::Bench(err.to_string())
    }
}

impl From<vf_controls::ControlError> for AppError {
    fn from(err: vf_controls::ControlError) -> Self {
        AppError::Bench(err.to_string())
    }
}
