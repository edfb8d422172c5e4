//! Sweep Configuration
//!
//! All sweep settings load from a TOML file. Every section is optional and
//! falls back to its defaults.

use coop_events::ScenarioId;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::driver::{RunConfig, DEFAULT_ITERATIONS, DEFAULT_SAVE_INTERVAL, DEFAULT_SEED};
use crate::systems::{
    GameVariant, UpdateRule, DEFAULT_FERMI_TEMPERATURE, DEFAULT_TOLERANCE,
    DEFAULT_TRUST_FLIP_PROBABILITY,
};

/// Default output directory.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Complete sweep configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default = "default_datasets")]
    pub datasets: Vec<DatasetConfig>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            game: GameConfig::default(),
            rules: RulesConfig::default(),
            output: OutputConfig::default(),
            datasets: default_datasets(),
        }
    }
}

impl SweepConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation;
        if sim.iterations == 0 {
            return Err(invalid("simulation.iterations must be at least 1"));
        }
        if !(sim.tolerance.is_finite() && sim.tolerance >= 0.0) {
            return Err(invalid(format!(
                "simulation.tolerance must be non-negative, got {}",
                sim.tolerance
            )));
        }
        if sim.initial_probabilities.is_empty() {
            return Err(invalid("simulation.initial_probabilities is empty"));
        }
        if let Some(p) = sim
            .initial_probabilities
            .iter()
            .find(|p| !(0.0..=1.0).contains(*p))
        {
            return Err(invalid(format!(
                "initial probability {} is outside [0, 1]",
                p
            )));
        }
        for (i, &p) in sim.initial_probabilities.iter().enumerate() {
            let label = ScenarioId::p_label(p);
            if let Some(other) = sim.initial_probabilities[..i]
                .iter()
                .find(|&&q| ScenarioId::p_label(q) == label)
            {
                return Err(invalid(format!(
                    "initial probabilities {} and {} both map to {}",
                    other, p, label
                )));
            }
        }

        if self.game.variants.is_empty() {
            return Err(invalid("game.variants is empty"));
        }
        if let Some(game) = first_duplicate(&self.game.variants) {
            return Err(invalid(format!("duplicate game variant '{}'", game)));
        }
        if !(0.0..=1.0).contains(&self.game.trust_flip_probability) {
            return Err(invalid(format!(
                "game.trust_flip_probability {} is outside [0, 1]",
                self.game.trust_flip_probability
            )));
        }

        if self.rules.update_rules.is_empty() {
            return Err(invalid("rules.update_rules is empty"));
        }
        if let Some(rule) = first_duplicate(&self.rules.update_rules) {
            return Err(invalid(format!("duplicate update rule '{}'", rule)));
        }
        let k = self.rules.fermi_temperature;
        if !(k.is_finite() && k > 0.0) {
            return Err(invalid(format!(
                "rules.fermi_temperature must be positive, got {}",
                k
            )));
        }

        if self.datasets.is_empty() {
            return Err(invalid("no datasets configured"));
        }
        for (i, dataset) in self.datasets.iter().enumerate() {
            if dataset.name.trim().is_empty() {
                return Err(invalid(format!("dataset #{} has an empty name", i + 1)));
            }
            if self.datasets[..i].iter().any(|d| d.name == dataset.name) {
                return Err(invalid(format!("duplicate dataset name '{}'", dataset.name)));
            }
        }
        Ok(())
    }

    /// Per-run parameters shared by every scenario.
    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            iterations: self.simulation.iterations,
            save_interval: self.simulation.save_interval,
            seed: self.simulation.seed,
            tolerance: self.simulation.tolerance,
        }
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(message.into())
}

fn first_duplicate<T: PartialEq + Copy>(items: &[T]) -> Option<T> {
    items
        .iter()
        .enumerate()
        .find(|(i, item)| items[..*i].contains(*item))
        .map(|(_, &item)| item)
}

/// Iteration and seeding parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Iteration cap per run
    pub iterations: u32,
    /// Snapshot interval in iterations (0 = initial and final only)
    pub save_interval: u32,
    /// Base random seed
    pub seed: u64,
    /// Convergence tolerance on the cooperator fraction
    pub tolerance: f64,
    /// Initial cooperation probabilities to sweep
    pub initial_probabilities: Vec<f64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            save_interval: DEFAULT_SAVE_INTERVAL,
            seed: DEFAULT_SEED,
            tolerance: DEFAULT_TOLERANCE,
            initial_probabilities: vec![0.25, 0.5, 0.75],
        }
    }
}

/// Game variants and their parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub variants: Vec<GameVariant>,
    /// Probability that a trust edge perturbs its source node
    pub trust_flip_probability: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            variants: GameVariant::ALL.to_vec(),
            trust_flip_probability: DEFAULT_TRUST_FLIP_PROBABILITY,
        }
    }
}

/// Update rules and their parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub update_rules: Vec<UpdateRule>,
    /// Fermi temperature K
    pub fermi_temperature: f64,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            update_rules: UpdateRule::ALL.to_vec(),
            fermi_temperature: DEFAULT_FERMI_TEMPERATURE,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    /// Write `iter_N.json` snapshots
    pub snapshots: bool,
    /// Write `iter_N.gexf` graph files alongside snapshots
    pub gexf: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_OUTPUT_DIR),
            snapshots: true,
            gexf: true,
        }
    }
}

/// One edge-list dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub name: String,
    pub path: PathBuf,
    #[serde(default)]
    pub signed: bool,
    #[serde(default)]
    pub directed: bool,
}

impl DatasetConfig {
    /// Parses `name=path[:signed][:directed]`.
    pub fn parse_arg(arg: &str) -> Result<Self, ConfigError> {
        let (name, rest) = arg
            .split_once('=')
            .ok_or_else(|| invalid(format!("dataset '{}' must be name=path", arg)))?;

        let mut parts = rest.split(':');
        let path = parts.next().unwrap_or_default();
        if name.is_empty() || path.is_empty() {
            return Err(invalid(format!("dataset '{}' must be name=path", arg)));
        }

        let mut dataset = DatasetConfig {
            name: name.to_string(),
            path: PathBuf::from(path),
            signed: false,
            directed: false,
        };
        for flag in parts {
            match flag {
                "signed" => dataset.signed = true,
                "directed" => dataset.directed = true,
                other => {
                    return Err(invalid(format!(
                        "unknown dataset flag '{}' (expected signed or directed)",
                        other
                    )))
                }
            }
        }
        Ok(dataset)
    }
}

fn default_datasets() -> Vec<DatasetConfig> {
    vec![
        DatasetConfig {
            name: "facebook".to_string(),
            path: PathBuf::from("data/facebook_combined.txt"),
            signed: false,
            directed: false,
        },
        DatasetConfig {
            name: "epinion".to_string(),
            path: PathBuf::from("data/epinion/soc-sign-epinions.txt"),
            signed: true,
            directed: true,
        },
    ]
}
