//! Tick-driven bench runner for the ventiflow control core.
//!
//! Provides:
//! - Fixed-period tick loop advancing a [`vf_controls::VentilatorMachine`]
//! - Scripted event sequences applied strictly between ticks
//! - Decimated trace recording of drive signal, target, and phase

pub mod bench;
pub mod error;

// Re-exports for public API
pub use bench::{
    BenchOptions, BenchProgress, BenchTrace, ScheduledEvent, TickSample, run_bench,
    run_bench_with_progress,
};
pub use error::{SimError, SimResult};
