//! Error types for control core configuration.
//!
//! Clinical-parameter paths never fail (values clamp); errors exist
//! only for bench/configuration mistakes such as a non-positive step
//! limit.

use thiserror::Error;

/// Result type for control core operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur configuring the control core.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid argument provided to a constructor.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}
