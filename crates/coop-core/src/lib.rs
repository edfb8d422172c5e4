//! Evolution of cooperation on networks.
//!
//! A Prisoner's Dilemma is played across every edge of a fixed graph; nodes
//! then revise their strategies synchronously under one of four update rules,
//! two of which read signed trust edges. The driver repeats this until the
//! cooperator fraction stabilizes or an iteration cap is reached.
//!
//! # Modules
//!
//! - [`components`]: graph topology and per-iteration state
//! - [`systems`]: payoff round, update rules, convergence detection
//! - [`setup`]: edge-list loading and initial strategies
//! - [`driver`]: the iteration loop and its observer hook
//! - [`output`]: snapshot, curve and final-splits writers
//! - [`config`]: TOML sweep configuration
//! - [`sweep`]: scenario enumeration and concurrent execution

pub mod components;
pub mod config;
pub mod driver;
pub mod error;
pub mod output;
pub mod setup;
pub mod sweep;
pub mod systems;

pub use components::{Graph, GraphBuilder, NodeId, PayoffVector, StrategyAssignment};
pub use config::{ConfigError, DatasetConfig, SweepConfig};
pub use driver::{
    iteration_rng, IterationObserver, NullObserver, RunConfig, RunReport, SimulationDriver,
    SnapshotView,
};
pub use error::{Error, SimError};
pub use output::{CurveWriter, FinalSplits, OutputError, SnapshotWriter};
pub use setup::{coin_flip, load_path, load_signed, load_unsigned, LoadError};
pub use sweep::{run_sweep, Dataset, Scenario, SweepReport};
pub use systems::{
    ConvergenceMonitor, GameVariant, PayoffEngine, Round, UpdateEngine, UpdateRule,
};

pub use coop_events::{
    ConvergenceReason, IterationRecord, RunOutcome, RunSummary, ScenarioId, Strategy, TrustSign,
};
