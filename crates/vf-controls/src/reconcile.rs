//! Deterministic resolution of the rate/Ti/Te schedule conflict.
//!
//! One breath period is `60/rate` seconds, so the phase times must
//! satisfy `Ti + Te <= 60/rate`. Which side yields depends on which
//! field the operator edited:
//!
//! - **Rate edited**: a rate change is a global schedule change, so
//!   both phase times shrink by the same ratio, preserving the entered
//!   I:E proportion.
//! - **Ti edited**: a phase-time edit is a local override; the entered
//!   value stays exactly as typed and Te absorbs the difference.
//! - **Te edited**: symmetric, Ti absorbs the difference.
//!
//! The asymmetry between the two policies is deliberate.
//!
//! Rewrites are clamped on write by the store, so when `60/rate` leaves
//! less than a phase-time floor for the yielding side, that side stops
//! at its floor and the sum may exceed the budget slightly. Accepted,
//! never failed.

use crate::params::{BreathParameters, Param};

/// Seconds available for one full breath cycle at `rate` breaths/min.
pub fn cycle_budget(rate: f64) -> f64 {
    60.0 / rate
}

/// Sibling rewrite demanded by an edit, if any.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rewrite {
    /// Rescale both phase times (rate was edited).
    Both { ti: f64, te: f64 },
    /// Rewrite Ti only (Te was edited).
    Ti(f64),
    /// Rewrite Te only (Ti was edited).
    Te(f64),
}

/// Decide the rewrite for an edit of `edited` given the already-written
/// parameter state. Returns `None` when the schedule already fits.
pub fn reconcile(edited: Param, p: &BreathParameters) -> Option<Rewrite> {
    let budget = cycle_budget(p.rate);
    let sum = p.ti + p.te;
    if sum <= budget {
        return None;
    }
    match edited {
        Param::Rate => {
            let excess = sum - budget;
            let ratio = excess / sum;
            Some(Rewrite::Both {
                ti: p.ti * (1.0 - ratio),
                te: p.te * (1.0 - ratio),
            })
        }
        Param::InspiratoryTime => Some(Rewrite::Te(budget - p.ti)),
        Param::ExpiratoryTime => Some(Rewrite::Ti(budget - p.te)),
        Param::Volume => None,
    }
}
