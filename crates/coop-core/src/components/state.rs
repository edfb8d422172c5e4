//! Strategy State
//!
//! Immutable per-iteration values: the strategy assignment and the payoff
//! vector. Neither type exposes mutation; each iteration builds new values
//! from the previous snapshot.

use coop_events::{IterationRecord, Strategy};
use std::ops::Index;
use std::sync::Arc;

use crate::components::graph::NodeId;

/// One iteration's strategies, exactly one per node.
///
/// Cloning is cheap; clones share the same storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyAssignment {
    strategies: Arc<[Strategy]>,
}

impl StrategyAssignment {
    /// Every node holding the same strategy.
    pub fn uniform(len: usize, strategy: Strategy) -> Self {
        Self::from(vec![strategy; len])
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn get(&self, node: NodeId) -> Option<Strategy> {
        self.strategies.get(node.0).copied()
    }

    pub fn as_slice(&self) -> &[Strategy] {
        &self.strategies
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, Strategy)> + '_ {
        self.strategies
            .iter()
            .enumerate()
            .map(|(i, &s)| (NodeId(i), s))
    }

    pub fn to_vec(&self) -> Vec<Strategy> {
        self.strategies.to_vec()
    }

    pub fn cooperator_count(&self) -> usize {
        self.strategies.iter().filter(|s| s.is_cooperator()).count()
    }

    /// Fraction of cooperators, `None` for an empty assignment.
    pub fn cooperator_fraction(&self) -> Option<f64> {
        if self.is_empty() {
            None
        } else {
            Some(self.cooperator_count() as f64 / self.len() as f64)
        }
    }

    /// Measurement for this assignment at `iteration`.
    pub fn record(&self, iteration: u32) -> IterationRecord {
        let cooperators = self.cooperator_count();
        IterationRecord::from_counts(iteration, cooperators, self.len() - cooperators)
    }

    /// Number of nodes whose strategy differs from `other`.
    pub fn changes_from(&self, other: &StrategyAssignment) -> usize {
        self.strategies
            .iter()
            .zip(other.strategies.iter())
            .filter(|(a, b)| a != b)
            .count()
    }
}

impl From<Vec<Strategy>> for StrategyAssignment {
    fn from(strategies: Vec<Strategy>) -> Self {
        Self {
            strategies: strategies.into(),
        }
    }
}

impl FromIterator<Strategy> for StrategyAssignment {
    fn from_iter<I: IntoIterator<Item = Strategy>>(iter: I) -> Self {
        Self {
            strategies: iter.into_iter().collect(),
        }
    }
}

impl Index<NodeId> for StrategyAssignment {
    type Output = Strategy;

    fn index(&self, node: NodeId) -> &Strategy {
        &self.strategies[node.0]
    }
}

/// Per-node payoff for one round.
#[derive(Debug, Clone, PartialEq)]
pub struct PayoffVector {
    payoffs: Vec<f64>,
}

impl PayoffVector {
    pub fn len(&self) -> usize {
        self.payoffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payoffs.is_empty()
    }

    pub fn get(&self, node: NodeId) -> Option<f64> {
        self.payoffs.get(node.0).copied()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.payoffs
    }

    pub fn total(&self) -> f64 {
        self.payoffs.iter().sum()
    }
}

impl From<Vec<f64>> for PayoffVector {
    fn from(payoffs: Vec<f64>) -> Self {
        Self { payoffs }
    }
}

impl Index<NodeId> for PayoffVector {
    type Output = f64;

    fn index(&self, node: NodeId) -> &f64 {
        &self.payoffs[node.0]
    }
}
