//! Iteration Records
//!
//! Per-iteration cooperation measurements and the terminal outcome of a run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Cooperation measurement for one iteration.
///
/// Iteration 0 is the initial assignment. `cooperator_fraction` is `None`
/// when the graph has no nodes, where the fraction is undefined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    pub iteration: u32,
    pub cooperators: usize,
    pub defectors: usize,
    pub cooperator_fraction: Option<f64>,
}

impl IterationRecord {
    /// Builds a record from strategy counts.
    pub fn from_counts(iteration: u32, cooperators: usize, defectors: usize) -> Self {
        let total = cooperators + defectors;
        let cooperator_fraction = if total == 0 {
            None
        } else {
            Some(cooperators as f64 / total as f64)
        };
        Self {
            iteration,
            cooperators,
            defectors,
            cooperator_fraction,
        }
    }

    pub fn total(&self) -> usize {
        self.cooperators + self.defectors
    }

    /// Fraction of defectors, undefined for an empty population.
    pub fn defector_fraction(&self) -> Option<f64> {
        self.cooperator_fraction.map(|f| 1.0 - f)
    }

    /// Cooperators as a percentage (0-100).
    pub fn cooperator_percent(&self) -> Option<f64> {
        self.cooperator_fraction.map(|f| f * 100.0)
    }

    /// Defectors as a percentage (0-100).
    pub fn defector_percent(&self) -> Option<f64> {
        self.defector_fraction().map(|f| f * 100.0)
    }

    /// True when every node holds the same strategy.
    pub fn is_homogeneous(&self) -> bool {
        self.total() > 0 && (self.cooperators == 0 || self.defectors == 0)
    }
}

/// Why a run was declared converged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvergenceReason {
    /// Cooperator fraction moved less than the tolerance.
    Stable,
    /// The population reached a state the dynamics cannot leave.
    Absorbing,
}

impl fmt::Display for ConvergenceReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvergenceReason::Stable => write!(f, "stable"),
            ConvergenceReason::Absorbing => write!(f, "absorbing"),
        }
    }
}

/// Terminal state of a simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Dynamics stabilized at `iteration`.
    Converged {
        iteration: u32,
        reason: ConvergenceReason,
    },
    /// The iteration cap was reached without convergence.
    CapReached { cap: u32 },
}

impl RunOutcome {
    pub fn is_converged(&self) -> bool {
        matches!(self, RunOutcome::Converged { .. })
    }

    /// Iteration at which convergence was declared, if it was.
    pub fn convergence_iteration(&self) -> Option<u32> {
        match self {
            RunOutcome::Converged { iteration, .. } => Some(*iteration),
            RunOutcome::CapReached { .. } => None,
        }
    }

    /// Number of iterations actually simulated.
    pub fn iterations_run(&self) -> u32 {
        match self {
            RunOutcome::Converged { iteration, .. } => *iteration,
            RunOutcome::CapReached { cap } => *cap,
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Converged { iteration, reason } => {
                write!(f, "converged at iteration {} ({})", iteration, reason)
            }
            RunOutcome::CapReached { cap } => {
                write!(f, "did not converge within cap of {} iterations", cap)
            }
        }
    }
}
