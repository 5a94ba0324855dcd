//! Error types for bench runs.

use thiserror::Error;

/// Errors encountered configuring or running a bench loop.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<vf_controls::ControlError> for SimError {
    fn from(e: vf_controls::ControlError) -> Self {
        match e {
            vf_controls::ControlError::InvalidArg { what } => SimError::InvalidArg { what },
        }
    }
}
