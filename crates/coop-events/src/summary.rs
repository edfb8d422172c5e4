//! Run Summaries
//!
//! Scenario identity, the per-run summary, and the final-splits row that the
//! sweep report aggregates across scenarios.

use serde::{Deserialize, Serialize};

use crate::{IterationRecord, RunOutcome};

/// One point in the (dataset × game × rule × p) sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioId {
    pub dataset: String,
    pub game: String,
    pub update_rule: String,
    pub p: f64,
}

impl ScenarioId {
    pub fn new(
        dataset: impl Into<String>,
        game: impl Into<String>,
        update_rule: impl Into<String>,
        p: f64,
    ) -> Self {
        Self {
            dataset: dataset.into(),
            game: game.into(),
            update_rule: update_rule.into(),
            p,
        }
    }

    /// Filesystem-safe name, e.g. `facebook_standard_fermi_p0.25`.
    pub fn slug(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            self.dataset,
            self.game,
            self.update_rule,
            Self::p_label(self.p)
        )
        .replace(|c: char| c.is_whitespace() || c == '/', "_")
    }

    /// The `p` part of a slug. Probabilities with the same label share
    /// an output directory.
    pub fn p_label(p: f64) -> String {
        format!("p{:.2}", p)
    }
}

/// Everything a finished run reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub scenario: ScenarioId,
    pub seed: u64,
    pub outcome: RunOutcome,
    pub curve: Vec<IterationRecord>,
}

impl RunSummary {
    /// The last recorded iteration.
    pub fn final_record(&self) -> Option<&IterationRecord> {
        self.curve.last()
    }

    /// Cooperator fraction per iteration, in order.
    pub fn fractions(&self) -> Vec<Option<f64>> {
        self.curve.iter().map(|r| r.cooperator_fraction).collect()
    }
}

/// Final-splits row for one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalSplit {
    pub dataset: String,
    pub game: String,
    pub update_rule: String,
    pub p: f64,
    pub final_cooperators_pct: Option<f64>,
    pub final_defectors_pct: Option<f64>,
    pub convergence_iteration: Option<u32>,
    pub converged: bool,
}

impl From<&RunSummary> for FinalSplit {
    fn from(summary: &RunSummary) -> Self {
        let last = summary.final_record();
        Self {
            dataset: summary.scenario.dataset.clone(),
            game: summary.scenario.game.clone(),
            update_rule: summary.scenario.update_rule.clone(),
            p: summary.scenario.p,
            final_cooperators_pct: last.and_then(|r| r.cooperator_percent()),
            final_defectors_pct: last.and_then(|r| r.defector_percent()),
            convergence_iteration: summary.outcome.convergence_iteration(),
            converged: summary.outcome.is_converged(),
        }
    }
}
