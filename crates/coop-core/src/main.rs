//! Cooperation Sweep Runner
//!
//! Loads the configured datasets, runs every (dataset × game × rule × p)
//! scenario, and writes snapshots, curves and the final-splits report.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coop_core::config::{DatasetConfig, SweepConfig};
use coop_core::sweep::{load_datasets, run_sweep};
use coop_core::systems::{GameVariant, UpdateRule};
use coop_core::Error;

/// Command line arguments for the sweep
#[derive(Parser, Debug)]
#[command(name = "coop_sim")]
#[command(about = "Evolution of cooperation on networks")]
struct Args {
    /// TOML sweep configuration (defaults when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Dataset as name=path[:signed][:directed]; replaces configured datasets
    #[arg(long = "dataset", value_parser = parse_dataset)]
    datasets: Vec<DatasetConfig>,

    /// Iteration cap per run
    #[arg(long)]
    iterations: Option<u32>,

    /// Snapshot interval in iterations
    #[arg(long)]
    save_interval: Option<u32>,

    /// Base random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Output directory
    #[arg(long)]
    output: Option<PathBuf>,

    /// Initial cooperation probability (repeatable)
    #[arg(long = "p")]
    probabilities: Vec<f64>,

    /// Game variant (repeatable)
    #[arg(long = "game", value_enum)]
    games: Vec<GameVariant>,

    /// Update rule (repeatable)
    #[arg(long = "rule", value_enum)]
    rules: Vec<UpdateRule>,

    /// Run scenarios one at a time
    #[arg(long)]
    sequential: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn parse_dataset(arg: &str) -> Result<DatasetConfig, String> {
    DatasetConfig::parse_arg(arg).map_err(|e| e.to_string())
}

impl Args {
    /// Command-line values override the file.
    fn apply(self, config: &mut SweepConfig) {
        if !self.datasets.is_empty() {
            config.datasets = self.datasets;
        }
        if let Some(iterations) = self.iterations {
            config.simulation.iterations = iterations;
        }
        if let Some(save_interval) = self.save_interval {
            config.simulation.save_interval = save_interval;
        }
        if let Some(seed) = self.seed {
            config.simulation.seed = seed;
        }
        if let Some(output) = self.output {
            config.output.directory = output;
        }
        if !self.probabilities.is_empty() {
            config.simulation.initial_probabilities = self.probabilities;
        }
        if !self.games.is_empty() {
            config.game.variants = self.games;
        }
        if !self.rules.is_empty() {
            config.rules.update_rules = self.rules;
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Error> {
    let mut config = match &args.config {
        Some(path) => SweepConfig::from_file(path)?,
        None => SweepConfig::default(),
    };
    let sequential = args.sequential;
    let print_config = args.print_config;
    args.apply(&mut config);
    config.validate()?;

    if print_config {
        println!("{}", config.to_toml()?);
        return Ok(());
    }

    tracing::info!(
        "Sweep: seed {}, {} iterations, snapshots every {}",
        config.simulation.seed,
        config.simulation.iterations,
        config.simulation.save_interval
    );

    let datasets = load_datasets(&config)?;
    let output = config.output.directory.clone();
    let report = run_sweep(&config, &datasets, Some(output.as_path()), sequential)?;

    let converged = report.summaries.iter().filter(|s| s.outcome.is_converged()).count();
    tracing::info!(
        "Sweep complete: {} scenarios, {} converged, {} reached the cap",
        report.summaries.len(),
        converged,
        report.summaries.len() - converged
    );
    Ok(())
}
