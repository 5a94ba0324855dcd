//! vf-core: stable foundation for ventiflow.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - numeric (Real + spans + tolerances + float helpers)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{VfError, VfResult};
pub use numeric::*;
pub use units::*;
