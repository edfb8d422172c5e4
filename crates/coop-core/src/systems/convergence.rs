//! Convergence Detection
//!
//! Tracks the cooperator fraction per iteration and decides when the
//! population has stabilized.

use coop_events::{ConvergenceReason, IterationRecord, RunOutcome};

use crate::error::SimError;

/// Default tolerance on the change in cooperator fraction (0.05%).
pub const DEFAULT_TOLERANCE: f64 = 0.0005;

/// Watches the cooperation curve of a single run.
#[derive(Debug, Clone)]
pub struct ConvergenceMonitor {
    tolerance: f64,
    history: Vec<IterationRecord>,
    converged: Option<(u32, ConvergenceReason)>,
}

impl ConvergenceMonitor {
    pub fn new(tolerance: f64) -> Result<Self, SimError> {
        if !(tolerance.is_finite() && tolerance >= 0.0) {
            return Err(SimError::InvalidTolerance(tolerance));
        }
        Ok(Self {
            tolerance,
            history: Vec::new(),
            converged: None,
        })
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Records `record` and reports whether the run has converged.
    ///
    /// `absorbing` is set by the caller when the population sits in a state
    /// the current dynamics cannot leave. The first observation never
    /// converges; neither does an undefined fraction.
    pub fn observe(
        &mut self,
        record: &IterationRecord,
        absorbing: bool,
    ) -> Option<ConvergenceReason> {
        let previous = self.history.last().and_then(|r| r.cooperator_fraction);
        self.history.push(record.clone());

        if self.history.len() < 2 {
            return None;
        }
        let current = record.cooperator_fraction?;

        let reason = match previous {
            Some(previous) if (current - previous).abs() < self.tolerance => {
                Some(ConvergenceReason::Stable)
            }
            _ if absorbing => Some(ConvergenceReason::Absorbing),
            _ => None,
        };

        if let Some(reason) = reason {
            if self.converged.is_none() {
                self.converged = Some((record.iteration, reason));
            }
        }
        reason
    }

    /// Every record observed so far, in order.
    pub fn history(&self) -> &[IterationRecord] {
        &self.history
    }

    /// Cooperator fractions observed so far.
    pub fn fractions(&self) -> Vec<Option<f64>> {
        self.history.iter().map(|r| r.cooperator_fraction).collect()
    }

    pub fn is_converged(&self) -> bool {
        self.converged.is_some()
    }

    /// Terminal outcome given the run's iteration cap.
    pub fn outcome(&self, cap: u32) -> RunOutcome {
        match self.converged {
            Some((iteration, reason)) => RunOutcome::Converged { iteration, reason },
            None => RunOutcome::CapReached { cap },
        }
    }

    pub fn into_history(self) -> Vec<IterationRecord> {
        self.history
    }
}

impl Default for ConvergenceMonitor {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            history: Vec::new(),
            converged: None,
        }
    }
}
