//! Clinical breath parameters and the clamping store that owns them.
//!
//! The store is the only writer of [`BreathParameters`]. Every write is
//! limited to the parameter's span, never rejected, and every settled
//! write is queued as a change notification for the dashboard. Edits to
//! rate, Ti, or Te trigger the reconciliation policy in
//! [`crate::reconcile`]; the resulting sibling rewrites go through the
//! same clamping path with reconciliation suppressed, so a rewrite can
//! never recurse.

use serde::{Deserialize, Serialize};
use tracing::debug;
use vf_core::numeric::Span;

use crate::reconcile::{Rewrite, reconcile};

/// Breath rate span (breaths per minute).
pub const RATE_SPAN: Span = Span::new(2.0, 40.0);
/// Inspiratory period span (seconds).
pub const TI_SPAN: Span = Span::new(0.5, 5.0);
/// Expiratory period span (seconds).
pub const TE_SPAN: Span = Span::new(0.5, 5.0);
/// Tidal volume span (cubic centimetres).
pub const VOLUME_SPAN: Span = Span::new(200.0, 800.0);

/// Identifies one clinical parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Param {
    /// Breath rate, breaths per minute.
    Rate,
    /// Inspiratory period Ti, seconds.
    InspiratoryTime,
    /// Expiratory period Te, seconds.
    ExpiratoryTime,
    /// Tidal volume, cubic centimetres.
    Volume,
}

impl Param {
    /// Span the parameter's values are limited to.
    pub fn span(&self) -> Span {
        match self {
            Param::Rate => RATE_SPAN,
            Param::InspiratoryTime => TI_SPAN,
            Param::ExpiratoryTime => TE_SPAN,
            Param::Volume => VOLUME_SPAN,
        }
    }

    /// Whether an edit to this parameter can violate the cycle budget.
    fn affects_schedule(&self) -> bool {
        !matches!(self, Param::Volume)
    }
}

/// Snapshot of the four clinical parameters.
///
/// Invariant once a mutation settles: `ti + te <= 60/rate`, except when
/// a floor clamp leaves the sum slightly over budget (accepted, see
/// [`crate::reconcile`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreathParameters {
    /// Breath rate, breaths per minute.
    pub rate: f64,
    /// Inspiratory period, seconds.
    pub ti: f64,
    /// Expiratory period, seconds.
    pub te: f64,
    /// Tidal volume, cubic centimetres.
    pub volume: f64,
}

impl Default for BreathParameters {
    fn default() -> Self {
        Self {
            rate: 30.0,
            ti: 1.0,
            te: 2.0,
            volume: 600.0,
        }
    }
}

/// Owns the parameters; all mutation goes through [`ParameterStore::set`].
#[derive(Debug, Clone, Default)]
pub struct ParameterStore {
    params: BreathParameters,
    /// Set while reconciliation rewrites siblings; suppresses recursion.
    reconciling: bool,
    pending: Vec<(Param, f64)>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last clamped value of `param`.
    pub fn get(&self, param: Param) -> f64 {
        match param {
            Param::Rate => self.params.rate,
            Param::InspiratoryTime => self.params.ti,
            Param::ExpiratoryTime => self.params.te,
            Param::Volume => self.params.volume,
        }
    }

    /// Full parameter snapshot, for tick-start reads and display.
    pub fn snapshot(&self) -> BreathParameters {
        self.params
    }

    /// Clamp `value` into `param`'s span, write it, and reconcile the
    /// schedule. The value is never rejected, only limited.
    pub fn set(&mut self, param: Param, value: f64) {
        self.write(param, value);
        if self.reconciling || !param.affects_schedule() {
            return;
        }
        if let Some(rewrite) = reconcile(param, &self.params) {
            self.reconciling = true;
            match rewrite {
                Rewrite::Both { ti, te } => {
                    debug!(ti, te, "rate edit rescaled phase times");
                    self.set(Param::InspiratoryTime, ti);
                    self.set(Param::ExpiratoryTime, te);
                }
                Rewrite::Ti(ti) => {
                    debug!(ti, "expiratory edit rewrote inspiratory time");
                    self.set(Param::InspiratoryTime, ti);
                }
                Rewrite::Te(te) => {
                    debug!(te, "inspiratory edit rewrote expiratory time");
                    self.set(Param::ExpiratoryTime, te);
                }
            }
            self.reconciling = false;
        }
    }

    fn write(&mut self, param: Param, value: f64) {
        let clamped = param.span().clamp(value);
        match param {
            Param::Rate => self.params.rate = clamped,
            Param::InspiratoryTime => self.params.ti = clamped,
            Param::ExpiratoryTime => self.params.te = clamped,
            Param::Volume => self.params.volume = clamped,
        }
        self.pending.push((param, clamped));
    }

    /// Drain queued change notifications (dashboard refresh).
    pub fn take_changes(&mut self) -> Vec<(Param, f64)> {
        std::mem::take(&mut self.pending)
    }
}
