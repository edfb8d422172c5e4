//! Simulation Driver
//!
//! Runs one scenario: payoff round, strategy update, convergence check, once
//! per iteration until convergence or the iteration cap.
//!
//! Each iteration draws from its own generator seeded with
//! `seed + iteration` (wrapping); iteration 0, the initial assignment, uses
//! the base seed. Observers see the cooperation curve and periodic snapshots
//! but cannot influence the run.

use coop_events::{IterationRecord, RunOutcome, RunSummary, ScenarioId, SnapshotTrigger};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::sync::Arc;

use crate::components::{Graph, StrategyAssignment};
use crate::error::SimError;
use crate::setup::coin_flip;
use crate::systems::{
    ConvergenceMonitor, GameVariant, PayoffEngine, UpdateEngine, UpdateRule, DEFAULT_TOLERANCE,
};

/// Default iteration cap.
pub const DEFAULT_ITERATIONS: u32 = 20;
/// Default snapshot interval.
pub const DEFAULT_SAVE_INTERVAL: u32 = 10;
/// Default base seed.
pub const DEFAULT_SEED: u64 = 42;

/// Generator for `iteration` of a run seeded with `seed`.
pub fn iteration_rng(seed: u64, iteration: u32) -> SmallRng {
    SmallRng::seed_from_u64(seed.wrapping_add(u64::from(iteration)))
}

/// Per-run parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunConfig {
    /// Iteration cap.
    pub iterations: u32,
    /// Snapshot every this many iterations; 0 keeps only initial and final.
    pub save_interval: u32,
    pub seed: u64,
    pub tolerance: f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            save_interval: DEFAULT_SAVE_INTERVAL,
            seed: DEFAULT_SEED,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

/// Decides which iterations are exported.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotSchedule {
    interval: u32,
}

impl SnapshotSchedule {
    pub fn new(interval: u32) -> Self {
        Self { interval }
    }

    pub fn should_snapshot(&self, iteration: u32) -> bool {
        iteration == 0 || (self.interval > 0 && iteration % self.interval == 0)
    }
}

/// Read-only view handed to observers at snapshot points.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotView<'a> {
    pub iteration: u32,
    pub trigger: SnapshotTrigger,
    pub record: &'a IterationRecord,
    pub graph: &'a Graph,
    pub strategies: &'a StrategyAssignment,
}

/// Hook for exporters. Both methods default to doing nothing.
///
/// Implementations must not fail the run: I/O problems are theirs to log.
pub trait IterationObserver {
    /// Called once per iteration, starting with iteration 0.
    fn on_record(&mut self, _record: &IterationRecord) {}

    /// Called at iteration 0, every save interval, and the final iteration.
    fn on_snapshot(&mut self, _view: &SnapshotView<'_>) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl IterationObserver for NullObserver {}

impl<T: IterationObserver + ?Sized> IterationObserver for &mut T {
    fn on_record(&mut self, record: &IterationRecord) {
        (**self).on_record(record);
    }

    fn on_snapshot(&mut self, view: &SnapshotView<'_>) {
        (**self).on_snapshot(view);
    }
}

impl<A: IterationObserver, B: IterationObserver> IterationObserver for (A, B) {
    fn on_record(&mut self, record: &IterationRecord) {
        self.0.on_record(record);
        self.1.on_record(record);
    }

    fn on_snapshot(&mut self, view: &SnapshotView<'_>) {
        self.0.on_snapshot(view);
        self.1.on_snapshot(view);
    }
}

/// Result of a finished run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Records for iteration 0 through the last simulated iteration.
    pub records: Vec<IterationRecord>,
    pub outcome: RunOutcome,
    pub final_strategies: StrategyAssignment,
}

impl RunReport {
    pub fn final_record(&self) -> Option<&IterationRecord> {
        self.records.last()
    }

    pub fn into_summary(self, scenario: ScenarioId, seed: u64) -> RunSummary {
        RunSummary {
            scenario,
            seed,
            outcome: self.outcome,
            curve: self.records,
        }
    }
}

/// Wires a graph to a game variant and an update rule.
#[derive(Debug, Clone)]
pub struct SimulationDriver {
    graph: Arc<Graph>,
    game: GameVariant,
    rule: UpdateRule,
    payoff: PayoffEngine,
    update: UpdateEngine,
}

impl SimulationDriver {
    /// Fails when the game or rule needs trust signs the graph lacks.
    pub fn new(graph: Arc<Graph>, game: GameVariant, rule: UpdateRule) -> Result<Self, SimError> {
        if !graph.is_signed() {
            if game.requires_trust() {
                return Err(SimError::MissingTrust {
                    operation: "trust game",
                });
            }
            if rule.requires_trust() {
                return Err(SimError::MissingTrust {
                    operation: match rule {
                        UpdateRule::TrustAware => "trust_aware update",
                        _ => "all_neighbors_trust update",
                    },
                });
            }
        }

        Ok(Self {
            graph,
            game,
            rule,
            payoff: PayoffEngine::default(),
            update: UpdateEngine::default(),
        })
    }

    pub fn with_payoff_engine(mut self, payoff: PayoffEngine) -> Self {
        self.payoff = payoff;
        self
    }

    pub fn with_update_engine(mut self, update: UpdateEngine) -> Self {
        self.update = update;
        self
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn game(&self) -> GameVariant {
        self.game
    }

    pub fn rule(&self) -> UpdateRule {
        self.rule
    }

    pub fn payoff_engine(&self) -> &PayoffEngine {
        &self.payoff
    }

    pub fn update_engine(&self) -> &UpdateEngine {
        &self.update
    }

    /// Bernoulli(p) initial assignment drawn from the iteration-0 generator.
    pub fn initialize(&self, p: f64, seed: u64) -> Result<StrategyAssignment, SimError> {
        coin_flip(&self.graph, p, &mut iteration_rng(seed, 0))
    }

    /// True when the population can no longer change under this game and rule.
    fn is_absorbing(&self, record: &IterationRecord) -> bool {
        self.game == GameVariant::Standard && self.rule.is_imitative() && record.is_homogeneous()
    }

    /// Runs from `initial` until convergence or `config.iterations`.
    pub fn run<O: IterationObserver>(
        &self,
        initial: StrategyAssignment,
        config: &RunConfig,
        mut observer: O,
    ) -> Result<RunReport, SimError> {
        if initial.len() != self.graph.node_count() {
            return Err(SimError::AssignmentLength {
                expected: self.graph.node_count(),
                actual: initial.len(),
            });
        }

        let graph: &Graph = &self.graph;
        let schedule = SnapshotSchedule::new(config.save_interval);
        let mut monitor = ConvergenceMonitor::new(config.tolerance)?;

        let record = initial.record(0);
        observer.on_record(&record);
        observer.on_snapshot(&SnapshotView {
            iteration: 0,
            trigger: SnapshotTrigger::Initial,
            record: &record,
            graph,
            strategies: &initial,
        });
        monitor.observe(&record, false);

        let mut current = initial;
        let mut last = 0;

        for iteration in 1..=config.iterations {
            let mut rng = iteration_rng(config.seed, iteration);
            let round = self
                .payoff
                .compute_round(self.game, graph, &current, &mut rng)?;
            let next = self
                .update
                .apply(self.rule, graph, &round.payoffs, &round.strategies, &mut rng)?;

            let record = next.record(iteration);
            tracing::debug!(
                "Iteration {:>3}: {} cooperators, {} defectors, {} changed",
                iteration,
                record.cooperators,
                record.defectors,
                next.changes_from(&current),
            );
            observer.on_record(&record);

            let converged = monitor.observe(&record, self.is_absorbing(&record));
            current = next;
            last = iteration;

            if converged.is_some() {
                break;
            }
            if iteration < config.iterations && schedule.should_snapshot(iteration) {
                observer.on_snapshot(&SnapshotView {
                    iteration,
                    trigger: SnapshotTrigger::Periodic,
                    record: &record,
                    graph,
                    strategies: &current,
                });
            }
        }

        let outcome = monitor.outcome(config.iterations);
        let records = monitor.into_history();

        if last > 0 {
            if let Some(record) = records.last() {
                observer.on_snapshot(&SnapshotView {
                    iteration: last,
                    trigger: SnapshotTrigger::Final,
                    record,
                    graph,
                    strategies: &current,
                });
            }
        }

        Ok(RunReport {
            records,
            outcome,
            final_strategies: current,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::GraphBuilder;
    use coop_events::{ConvergenceReason, Strategy, TrustSign};
    use Strategy::{Cooperate as C, Defect as D};

    #[derive(Default)]
    struct Recorder {
        records: Vec<u32>,
        snapshots: Vec<(u32, SnapshotTrigger)>,
    }

    impl IterationObserver for Recorder {
        fn on_record(&mut self, record: &IterationRecord) {
            self.records.push(record.iteration);
        }

        fn on_snapshot(&mut self, view: &SnapshotView<'_>) {
            self.snapshots.push((view.iteration, view.trigger));
        }
    }

    fn ring(n: u64) -> Arc<Graph> {
        let mut builder = GraphBuilder::undirected();
        for i in 0..n {
            builder.add_edge(i, (i + 1) % n);
        }
        Arc::new(builder.build())
    }

    #[test]
    fn test_schedule() {
        let schedule = SnapshotSchedule::new(10);
        assert!(schedule.should_snapshot(0));
        assert!(!schedule.should_snapshot(5));
        assert!(schedule.should_snapshot(10));
        assert!(schedule.should_snapshot(20));

        let sparse = SnapshotSchedule::new(0);
        assert!(sparse.should_snapshot(0));
        assert!(!sparse.should_snapshot(10));
    }

    #[test]
    fn test_iteration_rng_wraps() {
        use rand::Rng;
        let mut a = iteration_rng(u64::MAX, 1);
        let mut b = iteration_rng(0, 0);
        assert_eq!(a.gen::<u64>(), b.gen::<u64>());
    }

    #[test]
    fn test_rejects_trust_on_unsigned_graph() {
        let graph = ring(4);
        assert!(matches!(
            SimulationDriver::new(graph.clone(), GameVariant::Trust, UpdateRule::Fermi),
            Err(SimError::MissingTrust { .. })
        ));
        assert!(matches!(
            SimulationDriver::new(graph, GameVariant::Standard, UpdateRule::TrustAware),
            Err(SimError::MissingTrust { .. })
        ));
    }

    #[test]
    fn test_rejects_wrong_initial_length() {
        let driver =
            SimulationDriver::new(ring(4), GameVariant::Standard, UpdateRule::Fermi).unwrap();
        let err = driver
            .run(StrategyAssignment::uniform(3, C), &RunConfig::default(), NullObserver)
            .unwrap_err();
        assert!(matches!(err, SimError::AssignmentLength { .. }));
    }

    #[test]
    fn test_snapshot_points_at_cap() {
        // Zero tolerance never triggers, and the all-neighbors rule is not
        // imitative, so the run goes to the cap.
        let mut builder = GraphBuilder::undirected();
        builder
            .add_signed_edge(0, 1, TrustSign::Distrusted)
            .add_signed_edge(1, 2, TrustSign::Trusted);
        let graph = Arc::new(builder.build());
        let driver =
            SimulationDriver::new(graph, GameVariant::Standard, UpdateRule::AllNeighborsTrust)
                .unwrap();
        let config = RunConfig {
            iterations: 25,
            save_interval: 10,
            seed: 1,
            tolerance: 0.0,
        };

        let mut recorder = Recorder::default();
        let report = driver
            .run(StrategyAssignment::from(vec![C, D, C]), &config, &mut recorder)
            .unwrap();

        assert_eq!(report.outcome, RunOutcome::CapReached { cap: 25 });
        assert_eq!(recorder.records, (0..=25).collect::<Vec<_>>());
        assert_eq!(
            recorder.snapshots,
            vec![
                (0, SnapshotTrigger::Initial),
                (10, SnapshotTrigger::Periodic),
                (20, SnapshotTrigger::Periodic),
                (25, SnapshotTrigger::Final),
            ]
        );
    }

    #[test]
    fn test_cap_reached_on_empty_graph() {
        let graph = Arc::new(GraphBuilder::undirected().build());
        let driver =
            SimulationDriver::new(graph, GameVariant::Standard, UpdateRule::ImitateBestNeighbor)
                .unwrap();
        let config = RunConfig {
            iterations: 5,
            ..RunConfig::default()
        };

        let report = driver
            .run(StrategyAssignment::from(Vec::new()), &config, NullObserver)
            .unwrap();
        assert_eq!(report.outcome, RunOutcome::CapReached { cap: 5 });
        assert_eq!(report.records.len(), 6);
        assert!(report.records.iter().all(|r| r.cooperator_fraction.is_none()));
    }

    #[test]
    fn test_homogeneous_start_is_stable_at_one() {
        let driver =
            SimulationDriver::new(ring(6), GameVariant::Standard, UpdateRule::Fermi).unwrap();
        let mut recorder = Recorder::default();
        let report = driver
            .run(StrategyAssignment::uniform(6, D), &RunConfig::default(), &mut recorder)
            .unwrap();

        assert_eq!(
            report.outcome,
            RunOutcome::Converged {
                iteration: 1,
                reason: ConvergenceReason::Stable
            }
        );
        assert_eq!(
            recorder.snapshots,
            vec![(0, SnapshotTrigger::Initial), (1, SnapshotTrigger::Final)]
        );
    }

    #[test]
    fn test_initialize_uses_base_seed() {
        let driver =
            SimulationDriver::new(ring(100), GameVariant::Standard, UpdateRule::Fermi).unwrap();
        let a = driver.initialize(0.5, 42).unwrap();
        let b = coin_flip(driver.graph(), 0.5, &mut iteration_rng(42, 0)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_report_into_summary() {
        let driver =
            SimulationDriver::new(ring(4), GameVariant::Standard, UpdateRule::ImitateBestNeighbor)
                .unwrap();
        let report = driver
            .run(StrategyAssignment::uniform(4, C), &RunConfig::default(), NullObserver)
            .unwrap();
        let summary = report.into_summary(
            ScenarioId::new("ring", "standard", "imitate_best_neighbor", 1.0),
            42,
        );
        assert_eq!(summary.curve.len(), 2);
        assert_eq!(summary.fractions(), vec![Some(1.0), Some(1.0)]);
    }
}
