//! Simulation Systems
//!
//! The per-iteration pipeline: payoff round, strategy update, convergence.

pub mod convergence;
pub mod payoff;
pub mod update;

pub use convergence::{ConvergenceMonitor, DEFAULT_TOLERANCE};
pub use payoff::{
    GameVariant, PayoffEngine, PayoffMatrix, Round, DEFAULT_TRUST_FLIP_PROBABILITY,
};
pub use update::{
    fermi_probability, graph_trust_score, UpdateEngine, UpdateRule, DEFAULT_FERMI_TEMPERATURE,
};
