//! Payoff System
//!
//! Plays one round of the Prisoner's Dilemma across every edge.
//!
//! Two variants:
//! - **Standard**: each edge is played once with the fixed matrix.
//! - **Trust**: each trust edge first pushes its source node toward
//!   cooperation (trusted) or defection (distrusted) with a fixed probability,
//!   then the standard game is played on the perturbed strategies. The round
//!   reports the perturbed assignment so the update rule reads the same
//!   strategies the payoffs were earned with.

use coop_events::{Strategy, TrustSign};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::components::{Graph, NodeId, PayoffVector, StrategyAssignment};
use crate::error::{check_probability, SimError};

/// Default probability that a trust edge perturbs its source node.
pub const DEFAULT_TRUST_FLIP_PROBABILITY: f64 = 0.7;

/// Game played on each iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum GameVariant {
    /// Plain matrix game.
    #[value(name = "standard")]
    Standard,
    /// Trust-perturbed matrix game (signed graphs only).
    #[value(name = "trust")]
    Trust,
}

impl GameVariant {
    pub const ALL: [GameVariant; 2] = [GameVariant::Standard, GameVariant::Trust];

    /// Stable name used in configuration and reports.
    pub fn name(self) -> &'static str {
        match self {
            GameVariant::Standard => "standard",
            GameVariant::Trust => "trust",
        }
    }

    pub fn requires_trust(self) -> bool {
        matches!(self, GameVariant::Trust)
    }
}

impl fmt::Display for GameVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Prisoner's Dilemma payoff matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayoffMatrix {
    /// Mutual cooperation.
    pub reward: f64,
    /// Cooperator against a defector.
    pub sucker: f64,
    /// Defector against a cooperator.
    pub temptation: f64,
    /// Mutual defection.
    pub punishment: f64,
}

impl PayoffMatrix {
    pub const STANDARD: PayoffMatrix = PayoffMatrix {
        reward: 3.0,
        sucker: 0.0,
        temptation: 5.0,
        punishment: 1.0,
    };

    /// Payoffs for (row, column) players.
    pub fn play(&self, a: Strategy, b: Strategy) -> (f64, f64) {
        match (a, b) {
            (Strategy::Cooperate, Strategy::Cooperate) => (self.reward, self.reward),
            (Strategy::Cooperate, Strategy::Defect) => (self.sucker, self.temptation),
            (Strategy::Defect, Strategy::Cooperate) => (self.temptation, self.sucker),
            (Strategy::Defect, Strategy::Defect) => (self.punishment, self.punishment),
        }
    }
}

impl Default for PayoffMatrix {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Result of one round of play.
#[derive(Debug, Clone)]
pub struct Round {
    /// Strategies the round was played with.
    pub strategies: StrategyAssignment,
    pub payoffs: PayoffVector,
}

/// Computes per-node payoffs for a round.
#[derive(Debug, Clone)]
pub struct PayoffEngine {
    matrix: PayoffMatrix,
    trust_flip_probability: f64,
}

impl PayoffEngine {
    pub fn new(trust_flip_probability: f64) -> Result<Self, SimError> {
        Ok(Self {
            matrix: PayoffMatrix::STANDARD,
            trust_flip_probability: check_probability(
                "trust flip probability",
                trust_flip_probability,
            )?,
        })
    }

    pub fn matrix(&self) -> &PayoffMatrix {
        &self.matrix
    }

    pub fn trust_flip_probability(&self) -> f64 {
        self.trust_flip_probability
    }

    /// Plays one round of `variant` on `graph`.
    ///
    /// Never modifies `strategies`; the trust variant returns a new
    /// assignment in [`Round::strategies`].
    pub fn compute_round<R: Rng>(
        &self,
        variant: GameVariant,
        graph: &Graph,
        strategies: &StrategyAssignment,
        rng: &mut R,
    ) -> Result<Round, SimError> {
        if strategies.len() != graph.node_count() {
            return Err(SimError::AssignmentLength {
                expected: graph.node_count(),
                actual: strategies.len(),
            });
        }

        match variant {
            GameVariant::Standard => Ok(Round {
                payoffs: self.play(graph, strategies),
                strategies: strategies.clone(),
            }),
            GameVariant::Trust => {
                if !graph.is_signed() {
                    return Err(SimError::MissingTrust {
                        operation: "trust game",
                    });
                }
                let perturbed = self.perturb(graph, strategies, rng);
                Ok(Round {
                    payoffs: self.play(graph, &perturbed),
                    strategies: perturbed,
                })
            }
        }
    }

    /// Standard matrix game over every stored edge.
    pub fn play(&self, graph: &Graph, strategies: &StrategyAssignment) -> PayoffVector {
        let mut payoffs = vec![0.0; graph.node_count()];
        for edge in graph.edges() {
            let (pu, pv) = self
                .matrix
                .play(strategies[edge.source], strategies[edge.target]);
            payoffs[edge.source.0] += pu;
            payoffs[edge.target.0] += pv;
        }
        PayoffVector::from(payoffs)
    }

    /// Applies trust pressure edge by edge. Undirected signed edges act in
    /// both directions. A later perturbation of the same node overwrites an
    /// earlier one.
    fn perturb<R: Rng>(
        &self,
        graph: &Graph,
        strategies: &StrategyAssignment,
        rng: &mut R,
    ) -> StrategyAssignment {
        let mut next = strategies.to_vec();
        let mut push = |node: NodeId, sign: TrustSign, rng: &mut R| {
            if rng.gen::<f64>() < self.trust_flip_probability {
                next[node.0] = sign.preferred_strategy();
            }
        };

        for edge in graph.edges() {
            let Some(sign) = edge.trust else { continue };
            push(edge.source, sign, rng);
            if !graph.is_directed() {
                push(edge.target, sign, rng);
            }
        }
        StrategyAssignment::from(next)
    }
}

impl Default for PayoffEngine {
    fn default() -> Self {
        Self {
            matrix: PayoffMatrix::STANDARD,
            trust_flip_probability: DEFAULT_TRUST_FLIP_PROBABILITY,
        }
    }
}
