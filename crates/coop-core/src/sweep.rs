//! Scenario Sweep
//!
//! Expands a [`SweepConfig`] into (dataset × game × rule × p) scenarios and
//! runs them. Scenarios share nothing but their read-only graph, so they run
//! on the rayon pool unless sequential execution is requested.

use coop_events::{RunSummary, ScenarioId};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::components::Graph;
use crate::config::SweepConfig;
use crate::driver::SimulationDriver;
use crate::error::Error;
use crate::output::{CurveWriter, FinalSplits, SnapshotWriter};
use crate::setup::{load_path, LoadError};
use crate::systems::{GameVariant, PayoffEngine, UpdateEngine, UpdateRule};

/// A loaded network.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub name: String,
    pub graph: Arc<Graph>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, graph: Graph) -> Self {
        Self {
            name: name.into(),
            graph: Arc::new(graph),
        }
    }
}

/// Loads every dataset named in `config`.
pub fn load_datasets(config: &SweepConfig) -> Result<Vec<Dataset>, LoadError> {
    config
        .datasets
        .iter()
        .map(|d| load_path(&d.path, d.signed, d.directed).map(|graph| Dataset::new(&d.name, graph)))
        .collect()
}

/// One point of the sweep.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub dataset: Dataset,
    pub game: GameVariant,
    pub rule: UpdateRule,
    pub p: f64,
}

impl Scenario {
    pub fn id(&self) -> ScenarioId {
        ScenarioId::new(&self.dataset.name, self.game.name(), self.rule.name(), self.p)
    }

    /// True when the game and rule can run on this dataset.
    pub fn is_compatible(&self) -> bool {
        self.dataset.graph.is_signed()
            || !(self.game.requires_trust() || self.rule.requires_trust())
    }
}

/// Enumerates compatible scenarios in dataset, game, rule, p order.
///
/// Combinations that need trust signs on an unsigned dataset are skipped.
pub fn plan(config: &SweepConfig, datasets: &[Dataset]) -> Vec<Scenario> {
    let mut scenarios = Vec::new();
    for dataset in datasets {
        for &game in &config.game.variants {
            for &rule in &config.rules.update_rules {
                for &p in &config.simulation.initial_probabilities {
                    let scenario = Scenario {
                        dataset: dataset.clone(),
                        game,
                        rule,
                        p,
                    };
                    if scenario.is_compatible() {
                        scenarios.push(scenario);
                    } else {
                        tracing::warn!(
                            "Skipping {}: {} / {} needs a signed dataset",
                            scenario.id().slug(),
                            game,
                            rule
                        );
                    }
                }
            }
        }
    }
    scenarios
}

/// Runs one scenario and writes its curve and snapshots under `output`.
pub fn run_scenario(
    scenario: &Scenario,
    config: &SweepConfig,
    output: Option<&Path>,
) -> Result<RunSummary, Error> {
    let id = scenario.id();
    let slug = id.slug();
    let run_config = config.run_config();

    let driver = build_driver(scenario, config)?;
    let initial = driver.initialize(scenario.p, run_config.seed)?;

    tracing::info!(
        "Running {} ({} nodes, {:.2}% cooperators at start)",
        slug,
        driver.graph().node_count(),
        initial.cooperator_fraction().unwrap_or(0.0) * 100.0
    );
    tracing::debug!(
        "{}: K = {}, trust flip probability {}, payoffs {:?}",
        slug,
        driver.update_engine().fermi_temperature(),
        driver.payoff_engine().trust_flip_probability(),
        driver.payoff_engine().matrix()
    );

    let directory = output.map(|dir| scenario_dir(dir, &id));
    let report = match &directory {
        Some(dir) => {
            let mut writer = SnapshotWriter::new(dir, &slug)
                .with_json(config.output.snapshots)
                .with_gexf(config.output.gexf);
            driver.run(initial, &run_config, &mut writer)?
        }
        None => driver.run(initial, &run_config, crate::driver::NullObserver)?,
    };

    let summary = report.into_summary(id, run_config.seed);
    tracing::info!(
        "Finished {} after {} iterations: {}",
        slug,
        summary.outcome.iterations_run(),
        summary.outcome
    );

    if let Some(dir) = &directory {
        if let Err(e) = CurveWriter::new(dir).write(&summary) {
            tracing::warn!("Could not write curve for {}: {}", slug, e);
        }
    }
    Ok(summary)
}

/// Driver for `scenario` with the engines configured in `config`.
fn build_driver(scenario: &Scenario, config: &SweepConfig) -> Result<SimulationDriver, Error> {
    let driver =
        SimulationDriver::new(scenario.dataset.graph.clone(), scenario.game, scenario.rule)?
            .with_payoff_engine(PayoffEngine::new(config.game.trust_flip_probability)?)
            .with_update_engine(UpdateEngine::new(config.rules.fermi_temperature)?);
    Ok(driver)
}

fn scenario_dir(output: &Path, id: &ScenarioId) -> PathBuf {
    output.join(&id.dataset).join(id.slug())
}

/// Results of a full sweep.
#[derive(Debug, Clone)]
pub struct SweepReport {
    pub summaries: Vec<RunSummary>,
    pub splits: FinalSplits,
}

/// Runs every planned scenario and writes the final-splits report.
///
/// With `output` unset nothing is written to disk.
pub fn run_sweep(
    config: &SweepConfig,
    datasets: &[Dataset],
    output: Option<&Path>,
    sequential: bool,
) -> Result<SweepReport, Error> {
    let scenarios = plan(config, datasets);
    tracing::info!(
        "Planned {} scenarios across {} datasets ({})",
        scenarios.len(),
        datasets.len(),
        if sequential { "sequential" } else { "parallel" }
    );

    let summaries = if sequential {
        scenarios
            .iter()
            .map(|s| run_scenario(s, config, output))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        scenarios
            .par_iter()
            .map(|s| run_scenario(s, config, output))
            .collect::<Result<Vec<_>, _>>()?
    };

    let splits = FinalSplits::from_summaries(&summaries);
    if let Some(dir) = output {
        splits.write(dir)?;
        tracing::info!("Wrote final splits for {} scenarios to {}", splits.len(), dir.display());
    }

    Ok(SweepReport { summaries, splits })
}
