//! Error Types
//!
//! Engine errors are usage/configuration errors: the simulation itself has no
//! failure modes once its inputs are consistent.

use thiserror::Error;

use crate::config::ConfigError;
use crate::output::OutputError;
use crate::setup::LoadError;

/// Errors raised by the simulation engine.
#[derive(Debug, Error)]
pub enum SimError {
    /// A trust-aware game or rule was used on a graph without trust signs.
    #[error("{operation} requires a signed graph, but the graph carries no trust signs")]
    MissingTrust { operation: &'static str },

    /// A strategy assignment does not cover the graph's nodes.
    #[error("strategy assignment has {actual} entries but the graph has {expected} nodes")]
    AssignmentLength { expected: usize, actual: usize },

    /// A payoff vector does not cover the graph's nodes.
    #[error("payoff vector has {actual} entries but the graph has {expected} nodes")]
    PayoffLength { expected: usize, actual: usize },

    /// A probability parameter is outside [0, 1].
    #[error("{name} must be within [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },

    /// The Fermi temperature must be strictly positive and finite.
    #[error("fermi temperature must be positive and finite, got {0}")]
    InvalidTemperature(f64),

    /// The convergence tolerance must be non-negative and finite.
    #[error("convergence tolerance must be non-negative and finite, got {0}")]
    InvalidTolerance(f64),
}

/// Top-level error for the sweep binary.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Sim(#[from] SimError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Validates a probability parameter.
pub(crate) fn check_probability(name: &'static str, value: f64) -> Result<f64, SimError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(SimError::InvalidProbability { name, value })
    }
}
