//! Shared data types for the cooperation simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! It is a dependency for all other crates in the workspace.

pub mod record;
pub mod snapshot;
pub mod strategy;
pub mod summary;

#[cfg(feature = "test-fixtures")]
pub mod fixtures;

// Re-export strategy types
pub use strategy::{Strategy, TrustSign};

// Re-export record types
pub use record::{ConvergenceReason, IterationRecord, RunOutcome};

// Re-export snapshot types
pub use snapshot::{generate_snapshot_id, NodeStrategy, SnapshotTrigger, StrategySnapshot};

// Re-export summary types
pub use summary::{FinalSplit, RunSummary, ScenarioId};
