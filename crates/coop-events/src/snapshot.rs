//! Snapshot Types
//!
//! Serialization structs for strategy snapshots.
//!
//! A snapshot captures every node's strategy at one iteration, tagged with the
//! scenario it belongs to. Snapshots are written for iteration 0, every save
//! interval, and the final iteration, and are consumed by graph exporters.

use serde::{Deserialize, Serialize};

use crate::{IterationRecord, Strategy};

/// Generates a snapshot ID for the given iteration.
pub fn generate_snapshot_id(iteration: u32) -> String {
    format!("iter_{:04}", iteration)
}

/// Why a snapshot was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotTrigger {
    Initial,
    Periodic,
    Final,
}

/// Strategy of a single node, keyed by its dataset label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStrategy {
    pub node: u64,
    pub strategy: Strategy,
}

/// Complete strategy snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySnapshot {
    pub snapshot_id: String,
    pub scenario: String,
    pub iteration: u32,
    pub triggered_by: SnapshotTrigger,
    pub record: IterationRecord,
    pub nodes: Vec<NodeStrategy>,
}

impl StrategySnapshot {
    /// Creates a snapshot with no nodes.
    pub fn new(
        scenario: impl Into<String>,
        record: IterationRecord,
        triggered_by: SnapshotTrigger,
    ) -> Self {
        Self {
            snapshot_id: generate_snapshot_id(record.iteration),
            scenario: scenario.into(),
            iteration: record.iteration,
            triggered_by,
            record,
            nodes: Vec::new(),
        }
    }

    /// Finds a node's strategy by label.
    pub fn find_node(&self, node: u64) -> Option<Strategy> {
        self.nodes
            .iter()
            .find(|n| n.node == node)
            .map(|n| n.strategy)
    }

    /// Labels of all cooperating nodes.
    pub fn cooperators(&self) -> impl Iterator<Item = u64> + '_ {
        self.nodes
            .iter()
            .filter(|n| n.strategy.is_cooperator())
            .map(|n| n.node)
    }

    /// Serializes the snapshot to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
