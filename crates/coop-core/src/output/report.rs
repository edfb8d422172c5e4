//! Run Reports
//!
//! Cooperation curves per scenario and the final-splits table across a sweep.

use coop_events::{FinalSplit, RunSummary};
use std::fs;
use std::path::{Path, PathBuf};

use crate::output::{write_json, OutputError};

/// Writes `curve.csv` and `summary.json` for one scenario.
#[derive(Debug, Clone)]
pub struct CurveWriter {
    directory: PathBuf,
}

impl CurveWriter {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn write(&self, summary: &RunSummary) -> Result<(), OutputError> {
        fs::create_dir_all(&self.directory)?;
        fs::write(self.directory.join("curve.csv"), curve_csv(summary))?;
        write_json(&self.directory.join("summary.json"), summary)?;
        Ok(())
    }
}

/// `iteration,cooperators,defectors` in percent; empty cells for an
/// undefined fraction.
pub fn curve_csv(summary: &RunSummary) -> String {
    let mut csv = String::from("iteration,cooperators,defectors\n");
    for record in &summary.curve {
        csv.push_str(&format!(
            "{},{},{}\n",
            record.iteration,
            percent(record.cooperator_percent()),
            percent(record.defector_percent()),
        ));
    }
    csv
}

fn percent(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_default()
}

/// Final cooperator/defector split of every scenario in a sweep.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinalSplits {
    rows: Vec<FinalSplit>,
}

impl FinalSplits {
    pub fn from_summaries<'a>(summaries: impl IntoIterator<Item = &'a RunSummary>) -> Self {
        Self {
            rows: summaries.into_iter().map(FinalSplit::from).collect(),
        }
    }

    pub fn rows(&self) -> &[FinalSplit] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn to_csv(&self) -> String {
        let mut csv = String::from(
            "dataset,game,update_rule,p,final_cooperators_pct,final_defectors_pct,convergence_iteration,converged\n",
        );
        for row in &self.rows {
            csv.push_str(&format!(
                "{},{},{},{:.2},{},{},{},{}\n",
                row.dataset,
                row.game,
                row.update_rule,
                row.p,
                percent(row.final_cooperators_pct),
                percent(row.final_defectors_pct),
                row.convergence_iteration
                    .map(|i| i.to_string())
                    .unwrap_or_default(),
                row.converged,
            ));
        }
        csv
    }

    /// Writes `final_splits.csv` and `final_splits.json` into `directory`.
    pub fn write(&self, directory: &Path) -> Result<(), OutputError> {
        fs::create_dir_all(directory)?;
        fs::write(directory.join("final_splits.csv"), self.to_csv())?;
        write_json(&directory.join("final_splits.json"), &self.rows)?;
        Ok(())
    }
}
