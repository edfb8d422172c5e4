//! Strategy Update System
//!
//! Produces the next strategy assignment from one round's payoffs. Every rule
//! reads a single snapshot (the round's strategies and payoffs) and writes a
//! fresh assignment, so no node observes a neighbor's updated strategy.
//!
//! Rules:
//! 1. **Imitate best neighbor**: copy the best performer of the closed
//!    neighborhood, uniform tie-break.
//! 2. **Fermi**: sample one neighbor, copy it with probability
//!    `1 / (1 + exp((π_u − π_v) / K))`.
//! 3. **Trust aware**: maximize `sign(u,v) × π_v` over the closed
//!    neighborhood; copy a trusted winner, oppose a distrusted one.
//! 4. **All-neighbors trust**: sign of `π_u + Σ sign(u,v) × π_v` decides;
//!    a fair coin flips or keeps on exactly zero.

use coop_events::{Strategy, TrustSign};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::components::{Graph, NodeId, PayoffVector, StrategyAssignment};
use crate::error::SimError;

/// Default Fermi temperature K.
pub const DEFAULT_FERMI_TEMPERATURE: f64 = 0.1;

/// Strategy update rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum UpdateRule {
    #[value(name = "imitate_best_neighbor")]
    ImitateBestNeighbor,
    #[value(name = "fermi")]
    Fermi,
    #[value(name = "trust_aware")]
    TrustAware,
    #[value(name = "all_neighbors_trust")]
    AllNeighborsTrust,
}

impl UpdateRule {
    pub const ALL: [UpdateRule; 4] = [
        UpdateRule::ImitateBestNeighbor,
        UpdateRule::Fermi,
        UpdateRule::TrustAware,
        UpdateRule::AllNeighborsTrust,
    ];

    /// Stable name used in configuration and reports.
    pub fn name(self) -> &'static str {
        match self {
            UpdateRule::ImitateBestNeighbor => "imitate_best_neighbor",
            UpdateRule::Fermi => "fermi",
            UpdateRule::TrustAware => "trust_aware",
            UpdateRule::AllNeighborsTrust => "all_neighbors_trust",
        }
    }

    pub fn requires_trust(self) -> bool {
        matches!(self, UpdateRule::TrustAware | UpdateRule::AllNeighborsTrust)
    }

    /// Rules that can only copy strategies already present. Under these a
    /// homogeneous population never changes again.
    pub fn is_imitative(self) -> bool {
        matches!(self, UpdateRule::ImitateBestNeighbor | UpdateRule::Fermi)
    }
}

impl fmt::Display for UpdateRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fermi adoption probability `1 / (1 + exp((own − neighbor) / K))`.
///
/// Exactly 0.5 for equal payoffs. Evaluated so that large payoff gaps
/// saturate to 0 or 1 instead of overflowing.
pub fn fermi_probability(own: f64, neighbor: f64, temperature: f64) -> f64 {
    let x = (neighbor - own) / temperature;
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}

/// Applies update rules.
#[derive(Debug, Clone)]
pub struct UpdateEngine {
    fermi_temperature: f64,
}

impl UpdateEngine {
    pub fn new(fermi_temperature: f64) -> Result<Self, SimError> {
        if !(fermi_temperature.is_finite() && fermi_temperature > 0.0) {
            return Err(SimError::InvalidTemperature(fermi_temperature));
        }
        Ok(Self { fermi_temperature })
    }

    pub fn fermi_temperature(&self) -> f64 {
        self.fermi_temperature
    }

    /// Computes the next assignment under `rule`.
    ///
    /// `strategies` and `payoffs` are the snapshot of the round just played.
    pub fn apply<R: Rng>(
        &self,
        rule: UpdateRule,
        graph: &Graph,
        payoffs: &PayoffVector,
        strategies: &StrategyAssignment,
        rng: &mut R,
    ) -> Result<StrategyAssignment, SimError> {
        let n = graph.node_count();
        if strategies.len() != n {
            return Err(SimError::AssignmentLength {
                expected: n,
                actual: strategies.len(),
            });
        }
        if payoffs.len() != n {
            return Err(SimError::PayoffLength {
                expected: n,
                actual: payoffs.len(),
            });
        }
        if rule.requires_trust() && !graph.is_signed() {
            return Err(SimError::MissingTrust {
                operation: match rule {
                    UpdateRule::TrustAware => "trust_aware update",
                    _ => "all_neighbors_trust update",
                },
            });
        }

        let next = match rule {
            UpdateRule::ImitateBestNeighbor => {
                imitate_best_neighbor(graph, payoffs, strategies, rng)
            }
            UpdateRule::Fermi => fermi(graph, payoffs, strategies, self.fermi_temperature, rng),
            UpdateRule::TrustAware => trust_aware(graph, payoffs, strategies, rng),
            UpdateRule::AllNeighborsTrust => all_neighbors_trust(graph, payoffs, strategies, rng),
        };
        Ok(StrategyAssignment::from(next))
    }
}

impl Default for UpdateEngine {
    fn default() -> Self {
        Self {
            fermi_temperature: DEFAULT_FERMI_TEMPERATURE,
        }
    }
}

/// Picks uniformly among tied candidates; draws only when there is a tie.
fn pick<T: Copy, R: Rng>(candidates: &[T], rng: &mut R) -> T {
    if candidates.len() == 1 {
        candidates[0]
    } else {
        candidates[rng.gen_range(0..candidates.len())]
    }
}

fn imitate_best_neighbor<R: Rng>(
    graph: &Graph,
    payoffs: &PayoffVector,
    strategies: &StrategyAssignment,
    rng: &mut R,
) -> Vec<Strategy> {
    let mut best: Vec<NodeId> = Vec::new();

    graph
        .nodes()
        .map(|u| {
            best.clear();
            best.push(u);
            let mut best_payoff = payoffs[u];

            for neighbor in graph.neighbors(u) {
                let p = payoffs[neighbor.node];
                if p > best_payoff {
                    best_payoff = p;
                    best.clear();
                    best.push(neighbor.node);
                } else if p == best_payoff {
                    best.push(neighbor.node);
                }
            }

            strategies[pick(&best, rng)]
        })
        .collect()
}

fn fermi<R: Rng>(
    graph: &Graph,
    payoffs: &PayoffVector,
    strategies: &StrategyAssignment,
    temperature: f64,
    rng: &mut R,
) -> Vec<Strategy> {
    graph
        .nodes()
        .map(|u| {
            let neighbors = graph.neighbors(u);
            if neighbors.is_empty() {
                return strategies[u];
            }

            let v = neighbors[rng.gen_range(0..neighbors.len())].node;
            let adopt = fermi_probability(payoffs[u], payoffs[v], temperature);
            if rng.gen::<f64>() < adopt {
                strategies[v]
            } else {
                strategies[u]
            }
        })
        .collect()
}

fn trust_aware<R: Rng>(
    graph: &Graph,
    payoffs: &PayoffVector,
    strategies: &StrategyAssignment,
    rng: &mut R,
) -> Vec<Strategy> {
    let mut best: Vec<(NodeId, TrustSign)> = Vec::new();

    graph
        .nodes()
        .map(|u| {
            best.clear();
            best.push((u, TrustSign::Trusted));
            let mut best_effective = payoffs[u];

            for neighbor in graph.neighbors(u) {
                // Signedness was checked up front.
                let sign = neighbor.trust.unwrap_or(TrustSign::Trusted);
                let effective = sign.value() * payoffs[neighbor.node];
                if effective > best_effective {
                    best_effective = effective;
                    best.clear();
                    best.push((neighbor.node, sign));
                } else if effective == best_effective {
                    best.push((neighbor.node, sign));
                }
            }

            let (winner, sign) = pick(&best, rng);
            if winner == u {
                strategies[u]
            } else {
                match sign {
                    TrustSign::Trusted => strategies[winner],
                    TrustSign::Distrusted => strategies[winner].flipped(),
                }
            }
        })
        .collect()
}

fn all_neighbors_trust<R: Rng>(
    graph: &Graph,
    payoffs: &PayoffVector,
    strategies: &StrategyAssignment,
    rng: &mut R,
) -> Vec<Strategy> {
    graph
        .nodes()
        .map(|u| {
            let score = graph_trust_score(graph, payoffs, u);
            if score > 0.0 {
                Strategy::Cooperate
            } else if score < 0.0 {
                Strategy::Defect
            } else if rng.gen::<f64>() < 0.5 {
                strategies[u]
            } else {
                strategies[u].flipped()
            }
        })
        .collect()
}

/// `S_u = π_u + Σ_{v ∈ N(u)} sign(u,v) × π_v`.
pub fn graph_trust_score(graph: &Graph, payoffs: &PayoffVector, u: NodeId) -> f64 {
    graph
        .neighbors(u)
        .iter()
        .map(|n| n.trust.map_or(1.0, TrustSign::value) * payoffs[n.node])
        .fold(payoffs[u], |acc, x| acc + x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::GraphBuilder;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use Strategy::{Cooperate as C, Defect as D};

    fn rng(seed: u64) -> SmallRng {
        SmallRng::seed_from_u64(seed)
    }

    fn path(n: u64) -> Graph {
        let mut builder = GraphBuilder::undirected();
        for i in 1..n {
            builder.add_edge(i - 1, i);
        }
        builder.build()
    }

    #[test]
    fn test_rule_names_roundtrip() {
        for rule in UpdateRule::ALL {
            let json = serde_json::to_string(&rule).unwrap();
            assert_eq!(json, format!("\"{}\"", rule.name()));
        }
        assert!(UpdateRule::TrustAware.requires_trust());
        assert!(!UpdateRule::Fermi.requires_trust());
        assert!(UpdateRule::Fermi.is_imitative());
        assert!(!UpdateRule::AllNeighborsTrust.is_imitative());
    }

    #[test]
    fn test_imitate_unique_best_keeps_strategy() {
        let graph = path(3);
        let payoffs = PayoffVector::from(vec![1.0, 9.0, 2.0]);
        let strategies = StrategyAssignment::from(vec![C, D, C]);

        let next = UpdateEngine::default()
            .apply(UpdateRule::ImitateBestNeighbor, &graph, &payoffs, &strategies, &mut rng(1))
            .unwrap();
        assert_eq!(next.as_slice(), &[D, D, D]);
    }

    #[test]
    fn test_imitate_tie_break_uses_both_sides() {
        // Node 1 ties with both ends, which hold different strategies.
        let graph = path(3);
        let payoffs = PayoffVector::from(vec![4.0, 4.0, 4.0]);
        let strategies = StrategyAssignment::from(vec![C, C, D]);

        let mut seen_c = false;
        let mut seen_d = false;
        let engine = UpdateEngine::default();
        for seed in 0..200 {
            let next = engine
                .apply(
                    UpdateRule::ImitateBestNeighbor,
                    &graph,
                    &payoffs,
                    &strategies,
                    &mut rng(seed),
                )
                .unwrap();
            match next[NodeId(1)] {
                C => seen_c = true,
                D => seen_d = true,
            }
        }
        assert!(seen_c && seen_d);
    }

    #[test]
    fn test_imitate_isolated_node_retains() {
        let mut builder = GraphBuilder::undirected();
        builder.add_node(0);
        let graph = builder.build();
        let payoffs = PayoffVector::from(vec![0.0]);
        let strategies = StrategyAssignment::from(vec![D]);

        let next = UpdateEngine::default()
            .apply(UpdateRule::ImitateBestNeighbor, &graph, &payoffs, &strategies, &mut rng(1))
            .unwrap();
        assert_eq!(next.as_slice(), &[D]);
    }

    #[test]
    fn test_fermi_probability_midpoint() {
        assert_eq!(fermi_probability(2.0, 2.0, 0.1), 0.5);
        assert_eq!(fermi_probability(-7.5, -7.5, 3.0), 0.5);
    }

    #[test]
    fn test_fermi_probability_monotonic() {
        let mut previous = 0.0;
        for step in -40..=40 {
            let neighbor = step as f64 * 0.05;
            let p = fermi_probability(0.0, neighbor, 1.0);
            assert!(p > previous, "not increasing at {}", neighbor);
            previous = p;
        }
    }

    #[test]
    fn test_fermi_probability_saturates() {
        assert!(fermi_probability(0.0, 1e6, 0.1) > 0.999_999);
        assert!(fermi_probability(1e6, 0.0, 0.1) < 1e-6);
        assert!(fermi_probability(1e6, 0.0, 0.1).is_finite());
    }

    #[test]
    fn test_fermi_isolated_node_retains() {
        let mut builder = GraphBuilder::undirected();
        builder.add_edge(0, 1);
        builder.add_node(2);
        let graph = builder.build();
        let payoffs = PayoffVector::from(vec![0.0, 5.0, 0.0]);
        let strategies = StrategyAssignment::from(vec![C, D, C]);

        for seed in 0..20 {
            let next = UpdateEngine::default()
                .apply(UpdateRule::Fermi, &graph, &payoffs, &strategies, &mut rng(seed))
                .unwrap();
            assert_eq!(next[NodeId(2)], C);
        }
    }

    #[test]
    fn test_fermi_strong_neighbor_is_copied() {
        let graph = path(2);
        let payoffs = PayoffVector::from(vec![0.0, 5.0]);
        let strategies = StrategyAssignment::from(vec![C, D]);

        let next = UpdateEngine::default()
            .apply(UpdateRule::Fermi, &graph, &payoffs, &strategies, &mut rng(11))
            .unwrap();
        // 1 / (1 + e^-50) rounds to 1; e^-50 / (1 + e^-50) is effectively 0.
        assert_eq!(next.as_slice(), &[D, D]);
    }

    #[test]
    fn test_invalid_temperature() {
        assert!(UpdateEngine::new(0.0).is_err());
        assert!(UpdateEngine::new(-1.0).is_err());
        assert!(UpdateEngine::new(f64::INFINITY).is_err());
        assert!(UpdateEngine::new(0.5).is_ok());
    }

    fn signed_star(signs: &[TrustSign]) -> Graph {
        let mut builder = GraphBuilder::directed();
        for (i, &sign) in signs.iter().enumerate() {
            builder.add_signed_edge(0, i as u64 + 1, sign);
        }
        builder.build()
    }

    #[test]
    fn test_trust_aware_copies_trusted_winner() {
        let graph = signed_star(&[TrustSign::Trusted, TrustSign::Distrusted]);
        let payoffs = PayoffVector::from(vec![1.0, 4.0, 2.0]);
        let strategies = StrategyAssignment::from(vec![D, C, D]);

        let next = UpdateEngine::default()
            .apply(UpdateRule::TrustAware, &graph, &payoffs, &strategies, &mut rng(1))
            .unwrap();
        assert_eq!(next[NodeId(0)], C);
    }

    #[test]
    fn test_trust_aware_opposes_distrusted_winner() {
        // Distrusted neighbor with a negative payoff scores +3.
        let graph = signed_star(&[TrustSign::Distrusted]);
        let payoffs = PayoffVector::from(vec![1.0, -3.0]);
        let strategies = StrategyAssignment::from(vec![C, D]);

        let next = UpdateEngine::default()
            .apply(UpdateRule::TrustAware, &graph, &payoffs, &strategies, &mut rng(1))
            .unwrap();
        assert_eq!(next[NodeId(0)], C);

        let strategies = StrategyAssignment::from(vec![D, C]);
        let next = UpdateEngine::default()
            .apply(UpdateRule::TrustAware, &graph, &payoffs, &strategies, &mut rng(1))
            .unwrap();
        assert_eq!(next[NodeId(0)], D);
    }

    #[test]
    fn test_trust_aware_self_winner_keeps() {
        let graph = signed_star(&[TrustSign::Distrusted, TrustSign::Trusted]);
        let payoffs = PayoffVector::from(vec![6.0, 10.0, 5.0]);
        let strategies = StrategyAssignment::from(vec![D, C, C]);

        let next = UpdateEngine::default()
            .apply(UpdateRule::TrustAware, &graph, &payoffs, &strategies, &mut rng(1))
            .unwrap();
        assert_eq!(next[NodeId(0)], D);
        // Leaves have no out-edges and keep their strategies.
        assert_eq!(next[NodeId(1)], C);
        assert_eq!(next[NodeId(2)], C);
    }

    /// Share of `trials` runs in which node 0 ends up cooperating.
    fn trust_aware_cooperate_share(
        graph: &Graph,
        payoffs: &PayoffVector,
        strategies: &StrategyAssignment,
        trials: u32,
    ) -> f64 {
        let engine = UpdateEngine::default();
        let mut rng = rng(7);
        let mut cooperate = 0;
        for _ in 0..trials {
            let next = engine
                .apply(UpdateRule::TrustAware, graph, payoffs, strategies, &mut rng)
                .unwrap();
            if next[NodeId(0)] == C {
                cooperate += 1;
            }
        }
        f64::from(cooperate) / f64::from(trials)
    }

    #[test]
    fn test_trust_aware_tie_between_neighbors_is_fair() {
        // Two trusted neighbors share the best payoff but disagree.
        let graph = signed_star(&[TrustSign::Trusted, TrustSign::Trusted]);
        let payoffs = PayoffVector::from(vec![1.0, 4.0, 4.0]);
        let strategies = StrategyAssignment::from(vec![D, C, D]);

        let share = trust_aware_cooperate_share(&graph, &payoffs, &strategies, 4000);
        assert!((share - 0.5).abs() < 0.05, "cooperate share {}", share);
    }

    #[test]
    fn test_trust_aware_tie_with_self_can_retain() {
        // The neighbor only matches node 0, so keeping C is one of two outcomes.
        let graph = signed_star(&[TrustSign::Trusted]);
        let payoffs = PayoffVector::from(vec![4.0, 4.0]);
        let strategies = StrategyAssignment::from(vec![C, D]);

        let share = trust_aware_cooperate_share(&graph, &payoffs, &strategies, 4000);
        assert!(share > 0.0 && share < 1.0, "cooperate share {}", share);
        assert!((share - 0.5).abs() < 0.05, "cooperate share {}", share);
    }

    #[test]
    fn test_trust_rules_reject_unsigned_graph() {
        let graph = path(2);
        let payoffs = PayoffVector::from(vec![0.0, 0.0]);
        let strategies = StrategyAssignment::from(vec![C, D]);
        let engine = UpdateEngine::default();

        for rule in [UpdateRule::TrustAware, UpdateRule::AllNeighborsTrust] {
            let err = engine
                .apply(rule, &graph, &payoffs, &strategies, &mut rng(1))
                .unwrap_err();
            assert!(matches!(err, SimError::MissingTrust { .. }));
        }
    }

    #[test]
    fn test_all_neighbors_trust_sign_decides() {
        let graph = signed_star(&[TrustSign::Distrusted, TrustSign::Trusted]);
        let strategies = StrategyAssignment::from(vec![D, D, D]);
        let engine = UpdateEngine::default();

        // 1 - 5 + 2 < 0
        let payoffs = PayoffVector::from(vec![1.0, 5.0, 2.0]);
        let next = engine
            .apply(UpdateRule::AllNeighborsTrust, &graph, &payoffs, &strategies, &mut rng(1))
            .unwrap();
        assert_eq!(next[NodeId(0)], D);

        // 4 - 1 - 1 > 0
        let payoffs = PayoffVector::from(vec![4.0, 1.0, -1.0]);
        let next = engine
            .apply(UpdateRule::AllNeighborsTrust, &graph, &payoffs, &strategies, &mut rng(1))
            .unwrap();
        assert_eq!(next[NodeId(0)], C);
        // Isolated leaves: S_u = π_u alone
        assert_eq!(next[NodeId(1)], C);
        assert_eq!(next[NodeId(2)], D);
    }

    #[test]
    fn test_all_neighbors_trust_deterministic_when_nonzero() {
        let graph = signed_star(&[TrustSign::Trusted]);
        let payoffs = PayoffVector::from(vec![2.0, 3.0]);
        let strategies = StrategyAssignment::from(vec![D, C]);
        let engine = UpdateEngine::default();

        let first = engine
            .apply(UpdateRule::AllNeighborsTrust, &graph, &payoffs, &strategies, &mut rng(1))
            .unwrap();
        for seed in 2..50 {
            let next = engine
                .apply(UpdateRule::AllNeighborsTrust, &graph, &payoffs, &strategies, &mut rng(seed))
                .unwrap();
            assert_eq!(next, first);
        }
    }

    #[test]
    fn test_all_neighbors_trust_zero_is_fair_coin() {
        // 3 - 3 = 0 for node 0
        let graph = signed_star(&[TrustSign::Distrusted]);
        let payoffs = PayoffVector::from(vec![3.0, 3.0]);
        let strategies = StrategyAssignment::from(vec![C, C]);
        let engine = UpdateEngine::default();

        let trials = 4000;
        let mut flips = 0;
        let mut rng = rng(2024);
        for _ in 0..trials {
            let next = engine
                .apply(UpdateRule::AllNeighborsTrust, &graph, &payoffs, &strategies, &mut rng)
                .unwrap();
            if next[NodeId(0)] == D {
                flips += 1;
            }
        }
        let share = flips as f64 / trials as f64;
        assert!((share - 0.5).abs() < 0.05, "flip share {}", share);
    }

    #[test]
    fn test_payoff_length_checked() {
        let graph = path(2);
        let payoffs = PayoffVector::from(vec![0.0]);
        let strategies = StrategyAssignment::from(vec![C, D]);

        let err = UpdateEngine::default()
            .apply(UpdateRule::Fermi, &graph, &payoffs, &strategies, &mut rng(1))
            .unwrap_err();
        assert!(matches!(err, SimError::PayoffLength { .. }));
    }
}
