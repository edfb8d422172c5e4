//! Sample data fixtures for testing.
//!
//! Enable the `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // coop-events = { path = "../coop-events", features = ["test-fixtures"] }
//!
//! use coop_events::fixtures;
//!
//! let summaries = fixtures::sample_summaries();
//! let snapshot = fixtures::sample_snapshot();
//! ```

use crate::{RunSummary, StrategySnapshot};

/// Returns sample run summaries from the fixtures file.
///
/// Contains 3 runs on the `facebook` dataset:
/// - standard / imitate_best_neighbor / p=0.25, converged (stable) at iteration 3
/// - standard / fermi / p=0.50, converged (absorbing) at iteration 2
/// - standard / fermi / p=0.75, cap reached at 4 iterations
pub fn sample_summaries() -> Vec<RunSummary> {
    let jsonl = include_str!("../tests/fixtures/sample_summaries.jsonl");
    jsonl
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| {
            serde_json::from_str(l).unwrap_or_else(|e| {
                panic!("Failed to parse summary line: {}\nError: {}", l, e)
            })
        })
        .collect()
}

/// Returns a sample strategy snapshot from the fixtures file.
///
/// Contains 4 nodes (labels 0-3) at iteration 10, two cooperating.
pub fn sample_snapshot() -> StrategySnapshot {
    let json = include_str!("../tests/fixtures/sample_snapshot.json");
    StrategySnapshot::from_json(json).expect("Failed to parse sample_snapshot.json")
}
